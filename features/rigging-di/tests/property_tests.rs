//! Property-based tests for registration lifecycles and resolution failures

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::executor::block_on;
use proptest::prelude::*;
use rigging_di::*;

#[derive(Debug, Clone, PartialEq)]
struct TestService {
    value: i32,
    data: Vec<u8>,
}

fn arb_test_service() -> impl Strategy<Value = TestService> {
    (any::<i32>(), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(value, data)| TestService { value, data })
}

fn arb_qualifier() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,15}"
}

fn arb_cached_type() -> impl Strategy<Value = RegistrationType> {
    prop_oneof![
        Just(RegistrationType::Container),
        Just(RegistrationType::ContainerEager)
    ]
}

proptest! {
    #[test]
    fn cached_registrations_resolve_identically(
        service in arb_test_service(),
        qualifier in arb_qualifier(),
        registration_type in arb_cached_type(),
    ) {
        let container = Container::new("Property");
        let expected = service.clone();
        container
            .register(
                qualifier.clone(),
                RegistrationEntry::new(registration_type, move |_| Ok(service.clone())),
            )
            .unwrap();
        block_on(container.finish_registration()).unwrap();

        let first = container.resolve::<TestService>(qualifier.clone(), "prop").unwrap();
        let second = container.resolve::<TestService>(qualifier.clone(), "prop").unwrap();
        let third = container.resolve::<TestService>(qualifier, "prop").unwrap();

        prop_assert!(Arc::ptr_eq(&first, &second));
        prop_assert!(Arc::ptr_eq(&second, &third));
        prop_assert_eq!(&*first, &expected);
    }

    #[test]
    fn transient_registrations_resolve_distinctly(
        service in arb_test_service(),
        qualifier in arb_qualifier(),
    ) {
        let container = Container::new("Property");
        let expected = service.clone();
        container
            .register(
                qualifier.clone(),
                RegistrationEntry::transient(move |_| Ok(service.clone())),
            )
            .unwrap();

        let first = container.resolve::<TestService>(qualifier.clone(), "prop").unwrap();
        let second = container.resolve::<TestService>(qualifier, "prop").unwrap();

        prop_assert!(!Arc::ptr_eq(&first, &second));
        prop_assert_eq!(&*first, &expected);
        prop_assert_eq!(&*second, &expected);
    }

    #[test]
    fn unregistered_qualifier_names_container_qualifier_and_requester(
        container_name in arb_qualifier(),
        qualifier in arb_qualifier(),
        requester in arb_qualifier(),
    ) {
        let container = Container::new(container_name.clone());

        let error = container.resolve::<TestService>(qualifier.clone(), &requester).unwrap_err();
        let message = error.to_string();

        prop_assert!(
            matches!(error, ResolveError::NotRegistered { .. }),
            "expected NotRegistered, got {:?}",
            error
        );
        prop_assert!(message.contains(&format!("'{container_name}'")), "message missing container_name: {}", message);
        prop_assert!(message.contains(&format!("'{qualifier}'")), "message missing qualifier: {}", message);
        prop_assert!(message.contains(&format!("'{requester}'")), "message missing requester: {}", message);
    }

    #[test]
    fn register_after_finish_always_fails(
        qualifiers in prop::collection::vec(arb_qualifier(), 0..8),
        late in arb_qualifier(),
    ) {
        let container = Container::new("Sealed");
        for qualifier in &qualifiers {
            container
                .register(qualifier.clone(), RegistrationEntry::instance(qualifier.clone()))
                .unwrap();
        }
        block_on(container.finish_registration()).unwrap();

        let error = container
            .register(late, RegistrationEntry::instance(0_u8))
            .unwrap_err();
        let is_closed = matches!(error, RegisterError::RegistrationClosed { .. });
        prop_assert!(is_closed);
    }

    #[test]
    fn clear_forgets_every_registration(
        qualifiers in prop::collection::hash_set(arb_qualifier(), 1..8),
    ) {
        let container = Container::new("Cleared");
        for qualifier in &qualifiers {
            container
                .register(qualifier.clone(), RegistrationEntry::instance(qualifier.clone()))
                .unwrap();
        }
        block_on(container.finish_registration()).unwrap();
        container.clear();

        for qualifier in &qualifiers {
            prop_assert!(container.resolve::<String>(qualifier.clone(), "prop").is_err());
        }
        prop_assert!(container.register("fresh", RegistrationEntry::instance(1_u8)).is_ok());
    }

    #[test]
    fn eager_factories_run_exactly_once(resolves in 0usize..16) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let container = Container::new("Eager");
        container
            .register(
                "eager",
                RegistrationEntry::eager(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(TestService { value: 1, data: Vec::new() })
                }),
            )
            .unwrap();
        block_on(container.finish_registration()).unwrap();
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);

        for _ in 0..resolves {
            container.resolve::<TestService>("eager", "prop").unwrap();
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
