//! Per-type injection metadata and the construction procedure that applies it.
//!
//! A type opts into container managed construction by implementing [Declare].
//! Its declaration lists, once per type, which qualifiers go into which constructor
//! argument, field or setter, and under which qualifiers the type registers itself.
//! [instantiate] is the one place where such types are built.

mod instantiate;
mod metadata;

pub use instantiate::{instantiate, registration_entries, ConstructorArgs, TypeRef};
pub use metadata::{
    ConstructorInjection, Declaration, InjectionMetadata, MethodInjection, PropertyInjection,
};

use crate::types::{DynError, Injectable};

/// A type whose dependencies and registrations are declared statically
pub trait Declare: Injectable {
    /// Builds the bare instance from the resolved constructor arguments
    fn construct(args: &ConstructorArgs) -> Result<Self, DynError>;

    /// Attaches injection records and registrations to the type
    fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
        declaration
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        container::Container,
        errors::{DeclareError, ResolveError},
        registration::{RegistrationEntry, RegistrationType},
        resolver::Resolver,
        types::{Instance, Qualifier, TargetKind},
    };

    type Log = Mutex<Vec<String>>;

    fn note(log: &Log, event: impl Into<String>) {
        log.lock().unwrap().push(event.into());
    }

    /// Resolver recording every resolution into the shared log
    struct SpyResolver {
        inner: Container,
        log: Arc<Log>,
    }

    impl Resolver for SpyResolver {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn resolve_instance(
            &self,
            qualifier: &Qualifier,
            requester: &str,
        ) -> Result<Instance, ResolveError> {
            note(&self.log, format!("resolve {qualifier} for {requester}"));
            self.inner.resolve_instance(qualifier, requester)
        }

        fn contains(&self, qualifier: &Qualifier) -> bool {
            self.inner.contains(qualifier)
        }
    }

    #[derive(Default, Debug)]
    struct Base {
        log: Option<Arc<Log>>,
        first: Option<Arc<u32>>,
        second: Option<Arc<u32>>,
    }

    impl Base {
        fn note(&self, event: &str) {
            if let Some(log) = &self.log {
                note(log, event);
            }
        }

        fn set_second(&mut self, value: Arc<u32>) {
            self.second = Some(value);
            self.note("Base.set_second");
        }
    }

    impl Injectable for Base {}
    impl Declare for Base {
        fn construct(args: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(Base {
                log: args.get(0)?,
                ..Default::default()
            })
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration
                .inject_constructor("log", 0)
                .inject_property("first", "first", |this: &mut Base, value: Arc<u32>| {
                    this.first = Some(value);
                    this.note("Base.first");
                })
                .inject_method("second", "set_second", Base::set_second)
                .registration("base", RegistrationType::Transient)
        }
    }

    #[derive(Debug)]
    struct Child {
        base: Base,
        log: Arc<Log>,
        label: Arc<String>,
        own: Option<Arc<u32>>,
        own_setter: Option<Arc<u32>>,
    }

    impl Child {
        fn set_own(&mut self, value: Arc<u32>) {
            self.own_setter = Some(value);
            note(&self.log, "Child.set_own");
        }
    }

    fn base_of(child: &mut Child) -> &mut Base {
        &mut child.base
    }

    impl Injectable for Child {
        fn post_constructor(&mut self) {
            assert!(self.base.first.is_none() && self.own.is_none());
            note(&self.log, "post_constructor");
        }

        fn awake_after_injection(&mut self) {
            assert!(self.base.second.is_some() && self.own_setter.is_some());
            note(&self.log, "awake_after_injection");
        }
    }

    impl Declare for Child {
        fn construct(args: &ConstructorArgs) -> Result<Self, DynError> {
            let log: Arc<Log> = args.require(0)?;
            note(&log, format!("construct with {} args", args.len()));
            Ok(Child {
                base: Base {
                    log: Some(log.clone()),
                    ..Default::default()
                },
                log,
                label: args.require(1)?,
                own: None,
                own_setter: None,
            })
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration
                .inject_constructor("label", 1)
                .inject_constructor("log", 0)
                .inject_property("own", "own", |this: &mut Child, value: Arc<u32>| {
                    this.own = Some(value);
                    note(&this.log, "Child.own");
                })
                .inject_method("own_setter", "set_own", Child::set_own)
                .extends(base_of)
                .registration("child", RegistrationType::Container)
        }
    }

    struct Widget;
    impl Injectable for Widget {
        const TARGET: TargetKind = TargetKind::ViewComponent;
    }
    impl Declare for Widget {
        fn construct(_: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(Widget)
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration.inject_property("first", "first", |_: &mut Widget, _: Arc<u32>| {})
        }
    }

    struct ConstructedWidget;
    impl Injectable for ConstructedWidget {
        const TARGET: TargetKind = TargetKind::ViewComponent;
    }
    impl Declare for ConstructedWidget {
        fn construct(_: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(ConstructedWidget)
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration.inject_constructor("log", 0)
        }
    }

    struct SetterWidget;
    impl SetterWidget {
        fn set_first(&mut self, _: Arc<u32>) {}
    }
    impl Injectable for SetterWidget {
        const TARGET: TargetKind = TargetKind::ViewComponent;
    }
    impl Declare for SetterWidget {
        fn construct(_: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(SetterWidget)
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration.inject_method("first", "set_first", SetterWidget::set_first)
        }
    }

    #[derive(Default)]
    struct ExtendingWidget {
        base: Base,
    }
    fn widget_base(widget: &mut ExtendingWidget) -> &mut Base {
        &mut widget.base
    }
    impl Injectable for ExtendingWidget {
        const TARGET: TargetKind = TargetKind::ViewComponent;
    }
    impl Declare for ExtendingWidget {
        fn construct(_: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(ExtendingWidget::default())
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration.extends(widget_base)
        }
    }

    struct GrandChild {
        child: Child,
        extra: Option<Arc<u32>>,
        extra_setter: Option<Arc<u32>>,
    }

    impl GrandChild {
        fn set_extra(&mut self, value: Arc<u32>) {
            self.extra_setter = Some(value);
            note(&self.child.log, "GrandChild.set_extra");
        }
    }

    fn child_of(grand_child: &mut GrandChild) -> &mut Child {
        &mut grand_child.child
    }

    impl Injectable for GrandChild {}
    impl Declare for GrandChild {
        fn construct(args: &ConstructorArgs) -> Result<Self, DynError> {
            Ok(GrandChild {
                child: Child::construct(args)?,
                extra: None,
                extra_setter: None,
            })
        }

        fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
            declaration
                .inject_constructor("log", 0)
                .inject_constructor("label", 1)
                .extends(child_of)
                .inject_property("extra", "extra", |this: &mut GrandChild, value: Arc<u32>| {
                    this.extra = Some(value);
                    note(&this.child.log, "GrandChild.extra");
                })
                .inject_method("extra_setter", "set_extra", GrandChild::set_extra)
                .registration_default("grand_child")
        }
    }

    fn populated_container(log: &Arc<Log>) -> Container {
        let container = Container::new("Injection Container");
        container
            .register("log", RegistrationEntry::shared(log.clone()))
            .unwrap();
        container
            .register("label", RegistrationEntry::instance("child".to_string()))
            .unwrap();
        for (qualifier, value) in [("first", 1_u32), ("second", 2), ("own", 3), ("own_setter", 4)] {
            container
                .register(qualifier, RegistrationEntry::instance(value))
                .unwrap();
        }
        container
    }

    #[test]
    fn metadata_lists_records_in_declaration_order() {
        let metadata = InjectionMetadata::<Base>::of().unwrap();

        assert_eq!(metadata.property_injections().len(), 1);
        assert_eq!(metadata.property_injections()[0].qualifier, Qualifier::from("first"));
        assert_eq!(metadata.property_injections()[0].field, "first");
        assert_eq!(metadata.method_injections()[0].setter, "set_second");
        assert_eq!(
            metadata.constructor_injections(),
            &[ConstructorInjection {
                qualifier: "log".into(),
                index: 0
            }]
        );
        assert_eq!(
            metadata.registrations(),
            &[(Qualifier::from("base"), RegistrationType::Transient)]
        );
    }

    #[test]
    fn subtype_records_follow_ancestor_records() {
        let metadata = InjectionMetadata::<Child>::of().unwrap();

        let properties: Vec<_> = metadata
            .property_injections()
            .iter()
            .map(|record| record.field)
            .collect();
        let methods: Vec<_> = metadata
            .method_injections()
            .iter()
            .map(|record| record.setter)
            .collect();
        let indices: Vec<_> = metadata
            .constructor_injections()
            .iter()
            .map(|record| record.index)
            .collect();

        assert_eq!(properties, vec!["first", "own"]);
        assert_eq!(methods, vec!["set_second", "set_own"]);
        // Only the own constructor records, sorted
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(metadata.registrations().len(), 1);
    }

    #[test]
    fn instantiation_follows_the_injection_order() {
        let log = Arc::new(Log::default());
        let spy = SpyResolver {
            inner: populated_container(&log),
            log: log.clone(),
        };

        let metadata = InjectionMetadata::<Child>::of().unwrap();
        let child = instantiate(&metadata, &spy).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "resolve log for Child",
                "resolve label for Child",
                "construct with 2 args",
                "post_constructor",
                "resolve first for Child",
                "Base.first",
                "resolve own for Child",
                "Child.own",
                "resolve second for Child",
                "Base.set_second",
                "resolve own_setter for Child",
                "Child.set_own",
                "awake_after_injection",
            ]
        );
        assert_eq!(child.label.as_str(), "child");
        assert_eq!(child.base.first.as_deref(), Some(&1));
        assert_eq!(child.own_setter.as_deref(), Some(&4));
    }

    #[test]
    fn declared_registrations_build_through_the_container() {
        let log = Arc::new(Log::default());
        let container = populated_container(&log);

        for (qualifier, entry) in registration_entries::<Child>().unwrap() {
            container.register(qualifier, entry).unwrap();
        }
        for (qualifier, entry) in registration_entries::<Base>().unwrap() {
            container.register(qualifier, entry).unwrap();
        }

        let first = container.resolve::<Child>("child", "test").unwrap();
        let second = container.resolve::<Child>("child", "test").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let base = container.resolve::<Base>("base", "test").unwrap();
        let other = container.resolve::<Base>("base", "test").unwrap();
        assert!(!Arc::ptr_eq(&base, &other));
        assert_eq!(base.second.as_deref(), Some(&2));
    }

    #[test]
    fn missing_dependency_fails_instantiation() {
        let log = Arc::new(Log::default());
        let container = Container::new("Injection Container");
        container
            .register("log", RegistrationEntry::shared(log))
            .unwrap();
        for (qualifier, entry) in registration_entries::<Child>().unwrap() {
            container.register(qualifier, entry).unwrap();
        }

        let err = container.resolve::<Child>("child", "test").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotRegistered { ref qualifier, ref requester, .. }
                if *qualifier == Qualifier::from("label") && requester == "Child"
        ));
    }

    #[test]
    fn ui_components_are_refused() {
        let err = InjectionMetadata::<Widget>::of().unwrap_err();
        assert!(matches!(
            err,
            DeclareError::UnsupportedTarget {
                primitive: "inject_property",
                ..
            }
        ));
        assert!(registration_entries::<Widget>().is_err());
        assert!(TypeRef::of::<Widget>().registration_entries().is_err());
    }

    #[test]
    fn every_primitive_refuses_ui_components() {
        let primitive_of = |result: Result<(), DeclareError>| match result {
            Err(DeclareError::UnsupportedTarget { primitive, .. }) => primitive,
            Ok(()) => "accepted",
        };

        assert_eq!(
            primitive_of(InjectionMetadata::<ConstructedWidget>::of().map(|_| ())),
            "inject_constructor"
        );
        assert_eq!(
            primitive_of(InjectionMetadata::<SetterWidget>::of().map(|_| ())),
            "inject_method"
        );
        assert_eq!(
            primitive_of(InjectionMetadata::<ExtendingWidget>::of().map(|_| ())),
            "extends"
        );
    }

    #[test]
    fn ancestor_records_come_first_across_several_levels() {
        let metadata = InjectionMetadata::<GrandChild>::of().unwrap();

        let properties: Vec<_> = metadata
            .property_injections()
            .iter()
            .map(|record| record.field)
            .collect();
        let methods: Vec<_> = metadata
            .method_injections()
            .iter()
            .map(|record| record.setter)
            .collect();

        assert_eq!(properties, vec!["first", "own", "extra"]);
        assert_eq!(methods, vec!["set_second", "set_own", "set_extra"]);
        assert_eq!(
            metadata.registrations(),
            &[(Qualifier::from("grand_child"), RegistrationType::Container)]
        );

        let log = Arc::new(Log::default());
        let container = populated_container(&log);
        container
            .register("extra", RegistrationEntry::instance(5_u32))
            .unwrap();
        container
            .register("extra_setter", RegistrationEntry::instance(6_u32))
            .unwrap();

        let grand_child = instantiate(&metadata, &container).unwrap();

        let injected: Vec<_> = log
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.contains('.'))
            .cloned()
            .collect();
        assert_eq!(
            injected,
            vec![
                "Base.first",
                "Child.own",
                "GrandChild.extra",
                "Base.set_second",
                "Child.set_own",
                "GrandChild.set_extra",
            ]
        );
        assert_eq!(grand_child.child.base.second.as_deref(), Some(&2));
        assert_eq!(grand_child.extra.as_deref(), Some(&5));
        assert_eq!(grand_child.extra_setter.as_deref(), Some(&6));
    }

    #[test]
    fn undeclared_types_have_no_registrations() {
        let type_ref = TypeRef::undeclared::<String>();
        assert!(type_ref.registration_entries().unwrap().is_empty());
        assert_eq!(type_ref.info().short_name(), "String");
    }
}
