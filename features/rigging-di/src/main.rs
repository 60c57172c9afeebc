use std::sync::{Arc, Mutex};

use rigging_di::{
    Assembler, ClassLoaderAssembly, ConstructorArgs, Container, Declaration, Declare, DynError,
    Injectable, ManualRegistrationAssembly, ModuleDescriptor, ModuleLoaderAssembly,
    ModuleRegistry, RegistrationEntry, RegistrationType, Resolver, TypeRef,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let container = Arc::new(Container::new("Demo"));
    let assembler = Assembler::with_container(container.clone())
        .add_assembly(
            ManualRegistrationAssembly::default()
                .with("greeting", RegistrationEntry::instance("Hello".to_string())),
        )
        .add_assembly(ClassLoaderAssembly::new(vec![TypeRef::of::<UserService>()]))
        .add_assembly(ModuleLoaderAssembly::new(
            ModuleRegistry::new().with(ModuleDescriptor {
                id: "posts",
                members: || vec![TypeRef::of::<PostService>()],
            }),
            ["posts"],
        ));

    let resolver = match futures::executor::block_on(assembler.assemble()) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    println!("{:?}", container);
    match resolver.resolve::<PostService>("PostService", "main") {
        Ok(posts) => println!("{}", posts.headline()),
        Err(e) => eprintln!("{e}"),
    }
    println!("resolved from '{}'", resolver.name());
}

#[derive(Debug)]
struct UserService {
    greeting: Arc<String>,
}

impl Injectable for UserService {}
impl Declare for UserService {
    fn construct(args: &ConstructorArgs) -> Result<Self, DynError> {
        Ok(UserService {
            greeting: args.require(0)?,
        })
    }

    fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
        declaration
            .inject_constructor("greeting", 0)
            .registration("UserService", RegistrationType::ContainerEager)
    }
}

#[derive(Debug, Default)]
struct PostService {
    users: Option<Arc<UserService>>,
    log: Mutex<Vec<&'static str>>,
}

impl PostService {
    fn set_users(&mut self, users: Arc<UserService>) {
        self.users = Some(users);
    }

    fn headline(&self) -> String {
        let greeting = self
            .users
            .as_ref()
            .map(|users| users.greeting.as_str())
            .unwrap_or("?");
        format!("{greeting} from PostService ({:?})", self.log.lock().map(|l| l.clone()))
    }
}

impl Injectable for PostService {
    fn post_constructor(&mut self) {
        if let Ok(log) = self.log.get_mut() {
            log.push("post_constructor");
        }
    }

    fn awake_after_injection(&mut self) {
        if let Ok(log) = self.log.get_mut() {
            log.push("awake_after_injection");
        }
    }
}

impl Declare for PostService {
    fn construct(_: &ConstructorArgs) -> Result<Self, DynError> {
        Ok(PostService::default())
    }

    fn declare(declaration: Declaration<Self>) -> Declaration<Self> {
        declaration
            .inject_method("UserService", "set_users", PostService::set_users)
            .registration("PostService", RegistrationType::Container)
    }
}
