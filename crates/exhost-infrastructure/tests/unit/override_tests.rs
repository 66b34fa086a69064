//! Override store tests

use exhost_domain::{ContractId, OwnerId};
use exhost_infrastructure::di::OverrideStore;

use crate::test_utils::{greet_of, greeter_instance};

fn contract() -> ContractId {
    ContractId::new("acme.greeting.Greeter")
}

#[test]
fn test_add_then_get_returns_instance() {
    let store = OverrideStore::new();
    store.add(contract(), OwnerId::new(), greeter_instance("hello"));

    let instance = store.get(&contract()).expect("override installed");
    assert_eq!(greet_of(&instance), "hello");
    assert!(store.contains(&contract()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_add_evicts_previous_owner() {
    let store = OverrideStore::new();
    let first = OwnerId::new();
    let second = OwnerId::new();

    let r1 = store.add(contract(), first, greeter_instance("first"));
    let r2 = store.add(contract(), second, greeter_instance("second"));

    assert_ne!(r1, r2);
    let entry = store.entry(&contract()).expect("override installed");
    assert_eq!(entry.owner, second);
    assert_eq!(entry.registration, r2);
    assert_eq!(greet_of(&entry.instance), "second");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_remove_with_wrong_owner_keeps_entry() {
    let store = OverrideStore::new();
    let owner = OwnerId::new();
    store.add(contract(), owner, greeter_instance("kept"));

    assert!(!store.remove(&contract(), Some(&OwnerId::new())));
    assert!(store.contains(&contract()));

    assert!(store.remove(&contract(), Some(&owner)));
    assert!(!store.contains(&contract()));
}

#[test]
fn test_remove_without_owner_is_unconditional() {
    let store = OverrideStore::new();
    store.add(contract(), OwnerId::new(), greeter_instance("gone"));

    assert!(store.remove(&contract(), None));
    assert!(store.get(&contract()).is_none());
}

#[test]
fn test_remove_missing_contract_is_noop() {
    let store = OverrideStore::new();
    assert!(!store.remove(&contract(), None));
    assert!(store.is_empty());
}

#[test]
fn test_evicted_owner_cannot_remove_successor() {
    let store = OverrideStore::new();
    let first = OwnerId::new();
    let second = OwnerId::new();
    store.add(contract(), first, greeter_instance("first"));
    store.add(contract(), second, greeter_instance("second"));

    assert!(!store.remove(&contract(), Some(&first)));
    assert_eq!(greet_of(&store.get(&contract()).unwrap()), "second");
}

#[test]
fn test_clear_reports_count() {
    let store = OverrideStore::new();
    store.add(contract(), OwnerId::new(), greeter_instance("a"));
    store.add(ContractId::new("acme.Other"), OwnerId::new(), greeter_instance("b"));

    assert_eq!(store.clear(), 2);
    assert!(store.is_empty());
    assert_eq!(store.clear(), 0);
}
