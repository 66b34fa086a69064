//! Service resolver tests
//!
//! Source precedence, build-version filtering and disposable tracking.

use std::sync::{Arc, Mutex, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use exhost_domain::ports::{AmbientServiceSource, LogConfigurator, LogConfiguratorContract};
use exhost_domain::{Contract, ContractId, Disposable, OwnerId, Result, ServiceInstance};
use exhost_infrastructure::config::CompositionConfig;
use exhost_infrastructure::di::{DisposalRegistry, OverrideStore, ServiceResolver};

use crate::test_utils::{
    greet_of, greeter, greeter_instance, CountingDisposable, FakeAmbient, FakeCatalog,
    GreeterContract, OwnGreeterContract, TEST_VERSION,
};

struct Fixture {
    catalog: Arc<FakeCatalog>,
    ambient: Arc<FakeAmbient>,
    overrides: Arc<OverrideStore>,
    disposables: Arc<DisposalRegistry>,
    resolver: ServiceResolver,
}

fn fixture() -> Fixture {
    let catalog = Arc::new(FakeCatalog::new());
    let ambient = Arc::new(FakeAmbient::new());
    let overrides = Arc::new(OverrideStore::new());
    let disposables = Arc::new(DisposalRegistry::new());
    let config = CompositionConfig {
        running_version: TEST_VERSION.to_string(),
        ..CompositionConfig::default()
    };
    let resolver = ServiceResolver::new(
        catalog.clone(),
        ambient.clone(),
        overrides.clone(),
        disposables.clone(),
        config,
    );
    Fixture {
        catalog,
        ambient,
        overrides,
        disposables,
        resolver,
    }
}

fn foreign() -> ContractId {
    ContractId::of::<GreeterContract>()
}

fn own() -> ContractId {
    ContractId::of::<OwnGreeterContract>()
}

#[test]
fn test_override_shadows_every_source() {
    let f = fixture();
    f.catalog.export(foreign(), greeter_instance("catalog"), "0.1.0");
    f.ambient.provide(foreign(), greeter_instance("ambient"));
    f.overrides
        .add(foreign(), OwnerId::new(), greeter_instance("override"));

    let service = f.resolver.resolve::<GreeterContract>().unwrap();
    assert_eq!(service.greet(), "override");
    assert_eq!(f.catalog.query_count(), 0);
    assert_eq!(f.ambient.query_count(), 0);
}

#[test]
fn test_catalog_precedes_ambient() {
    let f = fixture();
    f.catalog.export(foreign(), greeter_instance("catalog"), "0.1.0");
    f.ambient.provide(foreign(), greeter_instance("ambient"));

    assert_eq!(f.resolver.resolve::<GreeterContract>().unwrap().greet(), "catalog");
}

#[test]
fn test_foreign_contract_ignores_build_version() {
    let f = fixture();
    f.catalog.export(foreign(), greeter_instance("older"), "0.0.1");

    let instance = f.resolver.try_resolve_id(&foreign()).unwrap();
    assert_eq!(greet_of(&instance), "older");
}

#[test]
fn test_own_namespace_skips_mismatched_build() {
    let f = fixture();
    f.catalog.export(own(), greeter_instance("stale"), "0.9.0");
    f.catalog.export(own(), greeter_instance("current"), TEST_VERSION);

    let service = f.resolver.resolve::<OwnGreeterContract>().unwrap();
    assert_eq!(service.greet(), "current");
}

#[test]
fn test_own_namespace_without_matching_build_falls_through() {
    let f = fixture();
    f.catalog.export(own(), greeter_instance("stale"), "0.9.0");
    f.ambient.provide(own(), greeter_instance("ambient"));

    assert_eq!(f.resolver.resolve::<OwnGreeterContract>().unwrap().greet(), "ambient");
}

#[test]
fn test_own_namespace_version_is_trimmed() {
    let f = fixture();
    f.catalog
        .export(own(), greeter_instance("padded"), &format!(" {TEST_VERSION} "));

    assert!(f.resolver.try_resolve::<OwnGreeterContract>().is_some());
}

#[test]
fn test_secondary_source_consulted_last() {
    let f = fixture();
    let secondary = Arc::new(FakeAmbient::new());
    secondary.provide(foreign(), greeter_instance("secondary"));
    f.resolver
        .set_secondary_source(Some(secondary.clone() as Arc<dyn AmbientServiceSource>));
    assert!(f.resolver.has_secondary_source());

    assert_eq!(f.resolver.resolve::<GreeterContract>().unwrap().greet(), "secondary");

    f.ambient.provide(foreign(), greeter_instance("primary"));
    assert_eq!(f.resolver.resolve::<GreeterContract>().unwrap().greet(), "primary");
}

#[test]
fn test_cleared_secondary_source_is_not_consulted() {
    let f = fixture();
    let secondary = Arc::new(FakeAmbient::new());
    secondary.provide(foreign(), greeter_instance("secondary"));
    f.resolver
        .set_secondary_source(Some(secondary.clone() as Arc<dyn AmbientServiceSource>));
    f.resolver.set_secondary_source(None);

    assert!(f.resolver.try_resolve::<GreeterContract>().is_none());
    assert_eq!(secondary.query_count(), 0);
}

#[test]
fn test_missing_contract_is_resolution_error() {
    let f = fixture();

    assert!(f.resolver.try_resolve_id(&foreign()).is_none());
    let err = f.resolver.resolve::<GreeterContract>().err().expect("contract is absent");
    assert!(err.is_resolution());
    assert!(err.to_string().contains(GreeterContract::NAME));
}

#[test]
fn test_resolve_as_type_mismatch_is_none() {
    let f = fixture();
    f.catalog.export(foreign(), greeter_instance("typed"), "0.1.0");

    let wrong: Option<String> = f.resolver.resolve_as::<GreeterContract, String>().unwrap();
    assert!(wrong.is_none());
    let right = f
        .resolver
        .resolve_as::<GreeterContract, Arc<dyn crate::test_utils::Greeter>>()
        .unwrap();
    assert_eq!(right.unwrap().greet(), "typed");
}

#[test]
fn test_catalog_disposable_is_tracked_once() {
    let f = fixture();
    let resource = Arc::new(CountingDisposable::default());
    let instance = ServiceInstance::new(greeter("disposable"))
        .with_disposable(resource.clone() as Arc<dyn Disposable>);
    f.catalog.export(foreign(), instance, "0.1.0");

    f.resolver.resolve::<GreeterContract>().unwrap();
    f.resolver.resolve::<GreeterContract>().unwrap();
    assert_eq!(f.disposables.len(), 1);

    f.disposables.release_all();
    assert_eq!(resource.count(), 1);
}

#[test]
fn test_override_disposable_is_tracked() {
    let f = fixture();
    let resource = Arc::new(CountingDisposable::default());
    let instance = ServiceInstance::new(greeter("override"))
        .with_disposable(resource.clone() as Arc<dyn Disposable>);
    f.overrides.add(foreign(), OwnerId::new(), instance);

    f.resolver.resolve::<GreeterContract>().unwrap();
    assert_eq!(f.disposables.len(), 1);
}

#[test]
fn test_ambient_disposable_is_not_tracked() {
    let f = fixture();
    let resource = Arc::new(CountingDisposable::default());
    let instance = ServiceInstance::new(greeter("ambient"))
        .with_disposable(resource.clone() as Arc<dyn Disposable>);
    f.ambient.provide(foreign(), instance);

    f.resolver.resolve::<GreeterContract>().unwrap();
    assert!(f.disposables.is_empty());
}

#[derive(Default)]
struct CountingConfigurator {
    calls: AtomicUsize,
}

impl LogConfigurator for CountingConfigurator {
    fn configure(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_logging_configured_once_on_first_resolution() {
    let f = fixture();
    let configurator = Arc::new(CountingConfigurator::default());
    let service: Arc<dyn LogConfigurator> = configurator.clone();
    f.catalog.export(
        ContractId::of::<LogConfiguratorContract>(),
        ServiceInstance::of::<LogConfiguratorContract>(service),
        TEST_VERSION,
    );
    f.catalog.export(foreign(), greeter_instance("hello"), "0.1.0");

    assert!(f.resolver.try_resolve::<OwnGreeterContract>().is_none());
    assert_eq!(configurator.calls.load(Ordering::SeqCst), 0);

    f.resolver.resolve::<GreeterContract>().unwrap();
    f.resolver.resolve::<GreeterContract>().unwrap();
    assert_eq!(configurator.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fallback_logging_used_without_registered_configurator() {
    let f = fixture();
    let fallback = Arc::new(CountingConfigurator::default());
    let resolver = ServiceResolver::new(
        f.catalog.clone(),
        f.ambient.clone(),
        f.overrides.clone(),
        f.disposables.clone(),
        CompositionConfig::default(),
    )
    .with_fallback_logging(fallback.clone());
    f.ambient.provide(foreign(), greeter_instance("hello"));

    resolver.resolve::<GreeterContract>().unwrap();
    assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
}

struct FailingConfigurator {
    calls: AtomicUsize,
}

impl LogConfigurator for FailingConfigurator {
    fn configure(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(exhost_domain::Error::config("subscriber already installed"))
    }
}

#[test]
fn test_logging_failure_does_not_block_resolution() {
    let f = fixture();
    let failing = Arc::new(FailingConfigurator {
        calls: AtomicUsize::new(0),
    });
    let resolver = ServiceResolver::new(
        f.catalog.clone(),
        f.ambient.clone(),
        f.overrides.clone(),
        f.disposables.clone(),
        CompositionConfig::default(),
    )
    .with_fallback_logging(failing.clone());
    f.ambient.provide(foreign(), greeter_instance("hello"));

    assert_eq!(resolver.resolve::<GreeterContract>().unwrap().greet(), "hello");
    assert_eq!(resolver.resolve::<GreeterContract>().unwrap().greet(), "hello");
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
}

/// Resolves through the resolver that is configuring it
#[derive(Default)]
struct ReentrantConfigurator {
    resolver: Mutex<Weak<ServiceResolver>>,
    calls: AtomicUsize,
    inner_resolved: AtomicUsize,
}

impl LogConfigurator for ReentrantConfigurator {
    fn configure(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let resolver = self.resolver.lock().unwrap().upgrade();
        if let Some(resolver) = resolver {
            if resolver.try_resolve::<GreeterContract>().is_some() {
                self.inner_resolved.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

#[test]
fn test_reentrant_resolution_configures_logging_once() {
    let f = fixture();
    let configurator = Arc::new(ReentrantConfigurator::default());
    let resolver = Arc::new(
        ServiceResolver::new(
            f.catalog.clone(),
            f.ambient.clone(),
            f.overrides.clone(),
            f.disposables.clone(),
            CompositionConfig::default(),
        )
        .with_fallback_logging(configurator.clone()),
    );
    *configurator.resolver.lock().unwrap() = Arc::downgrade(&resolver);
    f.ambient.provide(foreign(), greeter_instance("hello"));

    assert_eq!(resolver.resolve::<GreeterContract>().unwrap().greet(), "hello");
    resolver.resolve::<GreeterContract>().unwrap();

    assert_eq!(configurator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(configurator.inner_resolved.load(Ordering::SeqCst), 1);
}
