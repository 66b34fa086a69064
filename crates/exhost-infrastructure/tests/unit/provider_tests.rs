//! Service provider tests
//!
//! Overrides through the provider, degraded (uninitialized) operation and
//! teardown.

use std::sync::Arc;

use exhost_domain::ports::{FlowKind, FlowState};
use exhost_domain::{ContractId, Disposable, OwnerId, ServiceInstance};
use exhost_infrastructure::ServiceProvider;
use futures::StreamExt;

use crate::test_utils::{
    greeter, test_config, uninitialized_provider, CountingDisposable, FakeCatalog,
    FakeFlowFactory, FakeWindowFactory, FlowBehavior, GreeterContract, Harness,
};

fn kind() -> FlowKind {
    FlowKind::new("connect")
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_override_wins_until_removed() {
    let h = Harness::new();
    h.ambient
        .provide(ContractId::of::<GreeterContract>(), ServiceInstance::new(greeter("ambient")));
    let owner = OwnerId::new();

    assert!(h.provider.add_override::<GreeterContract>(owner, greeter("override")).is_some());
    assert_eq!(h.provider.resolve::<GreeterContract>().unwrap().greet(), "override");

    assert!(h.provider.remove_override::<GreeterContract>(Some(&owner)));
    assert_eq!(h.provider.resolve::<GreeterContract>().unwrap().greet(), "ambient");
}

#[test]
fn test_removed_override_falls_through_to_catalog() {
    let h = Harness::new();
    h.catalog.export(
        ContractId::of::<GreeterContract>(),
        ServiceInstance::new(greeter("catalog")),
        "0.1.0",
    );
    let owner = OwnerId::new();
    h.provider
        .add_override::<GreeterContract>(owner, greeter("override"));

    assert!(h.provider.remove_override::<GreeterContract>(Some(&owner)));
    let service = h.provider.try_resolve::<GreeterContract>().unwrap();
    assert_eq!(service.greet(), "catalog");
}

#[test]
fn test_remove_override_checks_owner() {
    let h = Harness::new();
    let owner = OwnerId::new();
    h.provider
        .add_override::<GreeterContract>(owner, greeter("owned"));

    assert!(!h.provider.remove_override::<GreeterContract>(Some(&OwnerId::new())));
    assert!(h.provider.has_override(&ContractId::of::<GreeterContract>()));
    assert!(h.provider.remove_override::<GreeterContract>(None));
    assert!(!h.provider.has_override(&ContractId::of::<GreeterContract>()));
}

#[test]
fn test_scoped_override_removed_on_drop() {
    let h = Harness::new();
    let contract = ContractId::of::<GreeterContract>();

    {
        let guard = h
            .provider
            .scoped_override::<GreeterContract>(greeter("scoped"))
            .expect("provider is initialized");
        assert_eq!(guard.contract(), &contract);
        assert_eq!(h.provider.resolve::<GreeterContract>().unwrap().greet(), "scoped");
    }

    assert!(!h.provider.has_override(&contract));
    assert!(h.provider.try_resolve::<GreeterContract>().is_none());
}

#[test]
fn test_scoped_override_leaves_replacement_alone() {
    let h = Harness::new();
    let contract = ContractId::of::<GreeterContract>();

    let guard = h
        .provider
        .scoped_override::<GreeterContract>(greeter("scoped"))
        .expect("provider is initialized");
    h.provider
        .add_override::<GreeterContract>(OwnerId::new(), greeter("replacement"));
    drop(guard);

    assert!(h.provider.has_override(&contract));
    assert_eq!(h.provider.resolve::<GreeterContract>().unwrap().greet(), "replacement");
}

#[test]
fn test_resolve_missing_contract_fails() {
    let h = Harness::new();

    assert!(h.provider.try_resolve::<GreeterContract>().is_none());
    let err = h.provider.resolve_id(&ContractId::of::<GreeterContract>()).unwrap_err();
    assert!(err.is_resolution());
}

// ============================================================================
// Uninitialized provider
// ============================================================================

#[tokio::test]
async fn test_uninitialized_provider_degrades() {
    let windows = Arc::new(FakeWindowFactory::new());
    let provider = uninitialized_provider(windows.clone());

    assert!(!provider.is_initialized());
    assert!(provider
        .initialization_error()
        .is_some_and(|cause| cause.contains("host catalog unavailable")));

    assert!(provider.try_resolve::<GreeterContract>().is_none());
    assert!(provider.resolve::<GreeterContract>().is_err());
    assert!(provider
        .add_override::<GreeterContract>(OwnerId::new(), greeter("ignored"))
        .is_none());
    assert!(!provider.remove_override::<GreeterContract>(None));

    let events = provider.setup_ui(&kind(), None);
    assert!(events.collect::<Vec<_>>().await.is_empty());
    provider.run_ui();
    provider.show_ui();
    provider.run_ui_with(&kind(), None);
    assert!(!provider.stop_ui());
    let states: Vec<bool> = provider.listen_to_completion_state().collect().await;
    assert_eq!(states, vec![false]);

    assert_eq!(windows.created(), 0);
    assert_eq!(provider.flow_state(), FlowState::Idle);
}

#[test]
fn test_missing_composition_source_is_uninitialized() {
    let provider = ServiceProvider::builder(Arc::new(FakeWindowFactory::new()))
        .with_config(test_config())
        .build();

    assert!(!provider.is_initialized());
    assert!(provider.initialization_error().is_some());
}

#[test]
fn test_uninitialized_provider_disposes_cleanly() {
    let provider = uninitialized_provider(Arc::new(FakeWindowFactory::new()));
    let report = provider.dispose().expect("first dispose");
    assert!(report.is_clean());
    assert!(!report.flow_stopped);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_dispose_runs_full_teardown() {
    let h = Harness::new();
    let resource = Arc::new(CountingDisposable::default());
    h.catalog.export(
        ContractId::of::<GreeterContract>(),
        ServiceInstance::new(greeter("tracked"))
            .with_disposable(resource.clone() as Arc<dyn Disposable>),
        "0.1.0",
    );
    h.provider.resolve::<GreeterContract>().unwrap();
    h.provider
        .add_override::<GreeterContract>(OwnerId::new(), greeter("override"));
    let _events = h.provider.setup_ui(&kind(), None);

    let report = h.provider.dispose().expect("first dispose");

    assert!(report.is_clean());
    assert!(report.flow_stopped);
    assert_eq!(report.disposables.released, 1);
    assert_eq!(report.overrides_cleared, 1);
    assert_eq!(resource.count(), 1);
    assert_eq!(h.factory.flow(0).stop_count(), 1);
    assert_eq!(h.factory.lifetime(0).count(), 1);
    assert!(h.provider.is_disposed());
}

#[test]
fn test_dispose_is_idempotent() {
    let h = Harness::new();
    let _events = h.provider.setup_ui(&kind(), None);

    assert!(h.provider.dispose().is_some());
    assert!(h.provider.dispose().is_none());

    assert_eq!(h.factory.flow(0).stop_count(), 1);
    assert_eq!(h.factory.lifetime(0).count(), 1);
}

#[test]
fn test_dispose_continues_past_failing_disposable() {
    let h = Harness::new();
    let failing = Arc::new(CountingDisposable::failing());
    h.catalog.export(
        ContractId::of::<GreeterContract>(),
        ServiceInstance::new(greeter("failing"))
            .with_disposable(failing.clone() as Arc<dyn Disposable>),
        "0.1.0",
    );
    h.provider.resolve::<GreeterContract>().unwrap();
    h.provider
        .add_override::<GreeterContract>(OwnerId::new(), greeter("override"));

    let report = h.provider.dispose().expect("first dispose");

    assert!(!report.is_clean());
    assert_eq!(report.disposables.failures.len(), 1);
    assert_eq!(report.overrides_cleared, 1);
    assert_eq!(failing.count(), 1);
}

#[test]
fn test_dispose_reports_flow_stop_failure() {
    let h = Harness::with(
        FakeFlowFactory::with_behavior(|| FlowBehavior {
            fail_stop: true,
            ..FlowBehavior::default()
        }),
        FakeWindowFactory::new(),
    );
    let _events = h.provider.setup_ui(&kind(), None);

    let report = h.provider.dispose().expect("first dispose");

    assert!(report.flow_stopped);
    assert_eq!(report.flow_failures.len(), 1);
    assert!(!report.is_clean());
    assert_eq!(h.factory.lifetime(0).count(), 1);
}

#[test]
fn test_disposed_provider_resolves_nothing() {
    let h = Harness::new();
    h.ambient
        .provide(ContractId::of::<GreeterContract>(), ServiceInstance::new(greeter("ambient")));
    h.provider.dispose();

    assert!(h.provider.try_resolve::<GreeterContract>().is_none());
    assert!(h
        .provider
        .add_override::<GreeterContract>(OwnerId::new(), greeter("late"))
        .is_none());
}

#[test]
fn test_drop_disposes_tracked_resources() {
    let resource = Arc::new(CountingDisposable::default());
    let catalog = Arc::new(FakeCatalog::new());
    catalog.export(
        ContractId::of::<GreeterContract>(),
        ServiceInstance::new(greeter("tracked"))
            .with_disposable(resource.clone() as Arc<dyn Disposable>),
        "0.1.0",
    );
    let provider = ServiceProvider::builder(Arc::new(FakeWindowFactory::new()))
        .with_config(test_config())
        .with_composition(catalog)
        .build();
    provider.resolve::<GreeterContract>().unwrap();

    drop(provider);

    assert_eq!(resource.count(), 1);
}
