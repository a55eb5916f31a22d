//! Hydration Integration Tests
//!
//! End-to-end behaviour of single and batch hydration through the public API.

mod common;

use chrono::{TimeZone, Utc};
use common::*;
use entity_hydrator::{
    same_provider, Conformity, Container, Context, HydrationError, Hydrator, Providable,
    ProviderType, Record, ServiceType,
};
use serde_json::{json, Value};
use std::cell::Cell;
use std::sync::Arc;

#[test]
fn test_case_insensitive_keys() {
    let provider = catalog();
    let person = Person::hydrate_one(record(json!({"Name": "Ann", "Age": 30})), &provider, None).unwrap();

    assert_eq!(person.name, "Ann");
    assert_eq!(person.age, Some(30));
}

#[test]
fn test_separator_styles_match() {
    let provider = catalog();
    let article = Article::hydrate_one(
        record(json!({"title": "x", "Published-At": "2024-05-01"})),
        &provider,
        None,
    )
    .unwrap();

    assert_eq!(
        article.published_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_extensible_type_collects_meta() {
    let provider = catalog();
    let contact =
        Contact::hydrate_one(record(json!({"name": "Ann", "nickname": "A"})), &provider, None).unwrap();

    assert_eq!(contact.name.as_deref(), Some("Ann"));
    assert_eq!(contact.meta.len(), 1);
    assert_eq!(contact.meta.get("nickname"), Some(&json!("A")));
}

#[test]
fn test_meta_keeps_raw_key_spelling() {
    let provider = catalog();
    let contact = Contact::hydrate_one(
        record(json!({"Name": "Ann", "FavouriteColour": "green"})),
        &provider,
        None,
    )
    .unwrap();

    assert!(contact.meta.contains("FavouriteColour"));
    assert!(!contact.meta.contains("favourite_colour"));
}

#[test]
fn test_non_extensible_type_rejects_unknown_key() {
    let provider = catalog();
    let err = Person::hydrate_one(record(json!({"name": "Ann", "nickname": "A"})), &provider, None)
        .unwrap_err();

    assert!(matches!(err, HydrationError::UnmappedKey { .. }));
    assert!(err.is_configuration_error());
}

#[test]
fn test_missing_required_parameter() {
    let provider = catalog();
    let err = Account::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap_err();

    match err {
        HydrationError::NotNullable { parameter, .. } => assert_eq!(parameter, "id"),
        other => panic!("expected NotNullable, got {other:?}"),
    }
}

#[test]
fn test_parameter_defaults_and_nullables() {
    let provider = catalog();
    let account = Account::hydrate_one(record(json!({"id": 7})), &provider, None).unwrap();
    assert_eq!(account.id, 7);
    assert_eq!(account.nickname, None);
    assert_eq!(account.status, "active");

    let account = Account::hydrate_one(
        record(json!({"ID": 8, "Nickname": null, "Status": "closed", "Name": "Bo"})),
        &provider,
        None,
    )
    .unwrap();
    assert_eq!(account.status, "closed");
    assert_eq!(account.name.as_deref(), Some("Bo"));
}

#[test]
fn test_null_for_defaulted_parameter_is_rejected() {
    let provider = catalog();
    let err = Account::hydrate_one(record(json!({"id": 1, "status": null})), &provider, None)
        .unwrap_err();
    assert!(matches!(err, HydrationError::NotNullable { .. }));
}

#[test]
fn test_duplicate_normalized_keys() {
    let provider = catalog();
    let err = Person::hydrate_one(record(json!({"name": "Ann", "Name": "Bo"})), &provider, None)
        .unwrap_err();
    assert!(matches!(err, HydrationError::DuplicateKey { .. }));
}

#[test]
fn test_magic_method_wins_over_property() {
    let provider = catalog();
    let article = Article::hydrate_one(record(json!({"Title": "  hello "})), &provider, None).unwrap();
    assert_eq!(article.title, "HELLO");
}

#[test]
fn test_magic_method_wins_over_parameter() {
    let provider = catalog();
    let badge = Badge::hydrate_one(record(json!({"Label": "x"})), &provider, None).unwrap();
    assert_eq!(badge.label, "method:x");
}

#[test]
fn test_invalid_date() {
    let provider = catalog();
    let err = Article::hydrate_one(
        record(json!({"title": "x", "published_at": "soon"})),
        &provider,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, HydrationError::InvalidDate { .. }));
}

#[test]
fn test_invalid_value_names_the_key() {
    let provider = catalog();
    let err = Person::hydrate_one(record(json!({"name": "Ann", "age": "old"})), &provider, None)
        .unwrap_err();
    match err {
        HydrationError::InvalidValue { key, .. } => assert_eq!(key, "age"),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn test_by_ref_parameter_writes_back() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let mut row = record(json!({"number": null, "subject": "printer on fire"}));

    let ticket: Ticket = hydrator.hydrate_one_mut(&mut row, &provider, None).unwrap();

    assert!(ticket.number >= 1000);
    assert_eq!(row["number"], json!(ticket.number));
    // consumed by value
    assert_eq!(row["subject"], Value::Null);
}

#[test]
fn test_by_ref_parameter_keeps_supplied_value() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let mut row = record(json!({"number": 42, "subject": "hello"}));

    let ticket: Ticket = hydrator.hydrate_one_mut(&mut row, &provider, None).unwrap();
    assert_eq!(ticket.number, 42);
    assert_eq!(row["number"], json!(42));
}

#[test]
fn test_failed_hydration_restores_caller_record() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let mut row = record(json!({"number": 42, "subject": null}));
    let before = row.clone();

    let err = hydrator
        .hydrate_one_mut::<Ticket>(&mut row, &provider, None)
        .unwrap_err();

    match err {
        HydrationError::NotNullable { parameter, .. } => assert_eq!(parameter, "subject"),
        other => panic!("expected NotNullable, got {other:?}"),
    }
    assert_eq!(row, before);
    assert_eq!(row["number"], json!(42));
}

#[test]
fn test_by_ref_parameter_absent_from_record() {
    let provider = catalog();
    let ticket = Ticket::hydrate_one(record(json!({"subject": "no number"})), &provider, None).unwrap();
    assert!(ticket.number >= 1000);
}

#[test]
fn test_entity_is_bound_to_provider_and_narrowed_context() {
    let provider = catalog();
    let person = Person::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap();

    assert!(same_provider(person.provider().unwrap(), &provider));
    let context = person.context().unwrap();
    assert_eq!(context.container().scope(), Some(ProviderType::of::<Catalog>()));
    assert_eq!(
        *context.container().resolve::<Endpoint>().unwrap(),
        Endpoint("catalog")
    );
    assert_eq!(person.service_type(), ServiceType::of::<Person>());
}

#[test]
fn test_supplied_context_container_is_replaced() {
    let provider = catalog();
    let foreign = Container::new();
    foreign.bind(Endpoint("foreign"));
    let supplied = Context::new(foreign).with_conformity(Conformity::Partial);

    let person =
        Person::hydrate_one(record(json!({"name": "Ann"})), &provider, Some(&supplied)).unwrap();
    let context = person.context().unwrap();

    assert_eq!(context.conformity(), Conformity::Partial);
    assert_eq!(
        *context.container().resolve::<Endpoint>().unwrap(),
        Endpoint("catalog")
    );
    // the caller's context is untouched
    assert!(supplied.container().scope().is_none());
}

#[test]
fn test_rebinding_to_another_provider_fails() {
    let provider = catalog();
    let mut person = Person::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap();

    let other = archive();
    let err = person
        .set_provider(Arc::clone(&other), other.default_context())
        .unwrap_err();
    assert!(err.is_rebinding_error());
    assert!(same_provider(person.provider().unwrap(), &provider));
}

#[test]
fn test_rebinding_same_provider_is_idempotent() {
    let provider = catalog();
    let mut person = Person::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap();

    let replacement = provider.default_context().with_conformity(Conformity::Complete);
    person
        .set_provider(Arc::clone(&provider), replacement)
        .unwrap();
    assert_eq!(person.context().unwrap().conformity(), Conformity::Complete);
}

#[test]
fn test_explicit_service_type_is_write_once() {
    let provider = catalog();
    let mut person = Person::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap();

    person.set_service(ServiceType::of::<Contact>()).unwrap();
    assert_eq!(person.service_type(), ServiceType::of::<Contact>());
    person.set_service(ServiceType::of::<Contact>()).unwrap();

    let err = person.set_service(ServiceType::of::<Account>()).unwrap_err();
    assert!(err.is_rebinding_error());
}

#[test]
fn test_hydrate_many_preserves_order() {
    let provider = catalog();
    let records = vec![
        record(json!({"name": "Ann", "age": 30})),
        record(json!({"name": "Bo", "age": 41})),
        record(json!({"name": "Cy", "age": 52})),
    ];

    let names: Vec<String> = Person::hydrate_many(records, &provider, Conformity::Complete, None)
        .map(|person| person.unwrap().name)
        .collect();
    assert_eq!(names, ["Ann", "Bo", "Cy"]);
}

#[test]
fn test_hydrate_many_is_lazy_over_infinite_input() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let pulled = Cell::new(0usize);

    let records = (0u32..).map(|n| {
        pulled.set(pulled.get() + 1);
        record(json!({"name": format!("p{n}"), "age": n}))
    });

    let batch = hydrator.hydrate_many::<Person, _>(records, &provider, Conformity::Complete, None);
    assert_eq!(pulled.get(), 0);

    let first: Vec<Person> = batch.take(5).collect::<Result<_, _>>().unwrap();
    assert_eq!(first.len(), 5);
    assert_eq!(first[4].age, Some(4));
    assert_eq!(pulled.get(), 5);
}

#[test]
fn test_hydrate_many_errors_surface_when_pulled() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let records = vec![
        record(json!({"id": 1})),
        record(json!({"name": "no id"})),
        record(json!({"id": 3})),
    ];

    let mut batch = hydrator.hydrate_many::<Account, _>(records, &provider, Conformity::None, None);
    assert_eq!(batch.next().unwrap().unwrap().id, 1);
    assert!(batch.next().unwrap().is_err());
    assert!(batch.next().is_none());
    assert!(batch.next().is_none());
}

#[test]
fn test_partial_conformity_tolerates_key_order() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let records = vec![
        record(json!({"name": "Ann", "age": 30})),
        record(json!({"age": 41, "name": "Bo"})),
    ];

    let people: Vec<Person> = hydrator
        .hydrate_many(records, &provider, Conformity::Partial, None)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(people[1].name, "Bo");
    assert_eq!(people[1].age, Some(41));
}

#[test]
fn test_complete_conformity_falls_back_on_length_mismatch() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let records = vec![
        record(json!({"id": 1, "nickname": "a"})),
        record(json!({"id": 2})),
    ];

    let accounts: Vec<Account> = hydrator
        .hydrate_many(records, &provider, Conformity::Complete, None)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(accounts[1].id, 2);
    assert_eq!(accounts[1].nickname, None);
}

#[test]
fn test_context_conformity_raises_requested_level() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let context = provider.default_context().with_conformity(Conformity::Complete);

    let batch = hydrator.hydrate_many::<Person, Vec<Record>>(
        Vec::new(),
        &provider,
        Conformity::None,
        Some(&context),
    );
    assert_eq!(batch.conformity(), Conformity::Complete);
}

#[test]
fn test_binder_reuse_is_visible_in_cache_stats() {
    let hydrator = Hydrator::default();
    let provider = catalog();
    let records: Vec<Record> = (0..10)
        .map(|n| record(json!({"name": format!("p{n}"), "age": n})))
        .collect();

    let people: Vec<Person> = hydrator
        .hydrate_many(records.clone(), &provider, Conformity::Complete, None)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(people.len(), 10);
    let stats = hydrator.cache_stats();
    assert_eq!(stats.cached_binders, 1);
    assert_eq!(stats.misses, 1);

    let _: Vec<Person> = hydrator
        .hydrate_many(records, &provider, Conformity::None, None)
        .collect::<Result<_, _>>()
        .unwrap();
    let stats = hydrator.cache_stats();
    // the named binder for {name, age} is compiled once then hit nine times
    assert_eq!(stats.cached_binders, 2);
    assert_eq!(stats.hits, 9);
}

#[test]
fn test_binders_are_per_provider_type() {
    let hydrator = Hydrator::default();
    let _: Person = hydrator
        .hydrate_one(record(json!({"name": "Ann"})), &catalog(), None)
        .unwrap();
    let _: Person = hydrator
        .hydrate_one(record(json!({"name": "Ann"})), &archive(), None)
        .unwrap();

    assert_eq!(hydrator.cache_stats().cached_binders, 2);
    assert_eq!(hydrator.cache_stats().cached_models, 1);
}

#[test]
fn test_archive_context_resolves_shared_services() {
    let shared = Container::new();
    shared.bind(Endpoint("shared"));
    let provider = archive_with(shared);

    let person = Person::hydrate_one(record(json!({"name": "Ann"})), &provider, None).unwrap();
    let container = person.context().unwrap().container();
    assert_eq!(container.scope(), Some(ProviderType::of::<Archive>()));
    assert_eq!(*container.resolve::<Endpoint>().unwrap(), Endpoint("shared"));
}
