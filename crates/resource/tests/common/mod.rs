#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use recordkeep_resource::{
    Adapter, AdapterError, AttributeDescriptor, AttributeMap, AttributeValue, EntityKind,
    InMemoryAdapter, Model, Primitive, PropertyRegistry, Record, RecordKey, RepositoryConfig,
    RepositoryName, RepositoryRegistry,
};

pub struct Fixture {
    pub properties: PropertyRegistry,
    pub repositories: Arc<RepositoryRegistry>,
    pub users: Model,
    pub statistics: Model,
    pub flaky: Arc<FlakyAdapter>,
}

pub fn int(v: i64) -> AttributeValue {
    AttributeValue::from(v)
}

pub fn text(v: &str) -> AttributeValue {
    AttributeValue::from(v)
}

pub fn map(pairs: &[(&str, AttributeValue)]) -> AttributeMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

pub fn name(s: &str) -> RepositoryName {
    RepositoryName::new(s)
}

pub fn fixture() -> Fixture {
    recordkeep_observability::init_for_tests();

    let properties = PropertyRegistry::new();
    properties
        .define(
            EntityKind::builder("User")
                .property(AttributeDescriptor::new("name", Primitive::String).key())
                .property(AttributeDescriptor::new("age", Primitive::Integer))
                .property(AttributeDescriptor::new("role", Primitive::String).default_value("member"))
                .build()
                .unwrap(),
        )
        .unwrap();
    properties
        .define(
            EntityKind::builder("Statistic")
                .property(AttributeDescriptor::serial("id"))
                .property(AttributeDescriptor::new("name", Primitive::String))
                .property(AttributeDescriptor::new("value", Primitive::Integer))
                .default_repository("alternate")
                .build()
                .unwrap(),
        )
        .unwrap();

    let config = RepositoryConfig::from_names(["alternate", "explicit"]).unwrap();
    let repositories = Arc::new(RepositoryRegistry::from_config(&config).unwrap());
    let flaky = Arc::new(FlakyAdapter::default());
    repositories
        .setup_shared(name("flaky"), Arc::clone(&flaky) as Arc<dyn Adapter>)
        .unwrap();

    let users = Model::from_registry(&properties, "User", Arc::clone(&repositories)).unwrap();
    let statistics = Model::from_registry(&properties, "Statistic", Arc::clone(&repositories)).unwrap();

    Fixture {
        properties,
        repositories,
        users,
        statistics,
        flaky,
    }
}

impl Fixture {
    /// Persisted user `carl`, age 25, stored in the resolved repository.
    pub fn saved_user(&self) -> Record {
        self.users
            .create([("name", text("carl")), ("age", int(25))])
            .unwrap()
    }
}

/// In-memory adapter whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyAdapter {
    inner: InMemoryAdapter,
    failing: AtomicBool,
}

impl FlakyAdapter {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Adapter for FlakyAdapter {
    fn load(&self, kind: &EntityKind, key: &RecordKey) -> Result<Option<AttributeMap>, AdapterError> {
        self.inner.load(kind, key)
    }

    fn persist(
        &self,
        kind: &EntityKind,
        key: Option<&RecordKey>,
        values: &AttributeMap,
    ) -> Result<RecordKey, AdapterError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AdapterError::backend("write refused"));
        }
        self.inner.persist(kind, key, values)
    }
}
