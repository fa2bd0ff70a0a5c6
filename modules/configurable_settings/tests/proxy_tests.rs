//! Integration tests for per-key setting proxies

use configurable_settings::contract::{Entry, NewSetting, Replacement, SettingValue, SettingsError};
use configurable_settings::domain::{Limits, ProxyState, SettingStore};
use configurable_settings::infra::storage::InMemorySettingStore;
use std::sync::Arc;

mod common;
use common::{category_manager, print_test_header, registry, FailingStore};

fn same_entries(left: &[Entry], right: &[Entry]) -> bool {
    left.len() == right.len()
        && left.iter().all(|l| right.iter().any(|r| l.same_as(r)))
        && right.iter().all(|r| left.iter().any(|l| l.same_as(r)))
}

#[tokio::test]
async fn test_default_value_then_write() {
    print_test_header(
        "test_default_value_then_write",
        &[
            "A restricted option reads its default before any write",
            "and the written value after it",
        ],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    println!("\n📝 Stage 1: Read before any write");
    let sort = manager.get("sort").await.unwrap().unwrap();
    assert_eq!(sort.value().unwrap(), Some(&SettingValue::from("alphabetical")));
    assert_eq!(sort.modifier().unwrap(), None);
    assert_eq!(store.count(), 0, "Reading must not write");

    println!("\n📝 Stage 2: Write `manual`");
    sort.update([Entry::value("manual")]).await.unwrap();
    assert_eq!(sort.state(), ProxyState::Loaded);

    println!("\n📝 Stage 3: Read back after reload");
    manager.reload().await.unwrap();
    let sort = manager.get("sort").await.unwrap().unwrap();
    assert_eq!(sort.single().unwrap(), &Entry::value("manual"));
    assert_eq!(store.rows(&owner, "sort").len(), 1);

    println!("✅ Default and written values read back as expected");
}

#[tokio::test]
async fn test_wrong_type_is_not_persisted() {
    print_test_header(
        "test_wrong_type_is_not_persisted",
        &["Writing text into an integer option fails and leaves no rows"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let limit = manager.get("limit").await.unwrap().unwrap();
    let err = limit.update([Entry::value("Ten")]).await.unwrap_err();

    assert_eq!(
        err,
        SettingsError::Validation {
            key: "limit".to_string(),
            errors: vec!["The value 'Ten' for the 'limit' setting is not an Integer.".to_string()],
        }
    );
    assert!(store.rows(&owner, "limit").is_empty());
    assert_eq!(limit.value().unwrap(), None, "Pending value is restored");
    assert_eq!(limit.state(), ProxyState::Loaded);

    println!("✅ Invalid value rejected without touching the store");
}

#[tokio::test]
async fn test_multiple_values_with_modifiers() {
    print_test_header(
        "test_multiple_values_with_modifiers",
        &["A multiple option stores one row per modifier/value pair"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());
    let written = vec![Entry::modified("gt", 10.0), Entry::modified("lte", 25.0)];

    let price = manager.get("price_filter").await.unwrap().unwrap();
    assert!(price.entries().unwrap().is_empty());
    price.update(written.clone()).await.unwrap();

    manager.reload().await.unwrap();
    let price = manager.get("price_filter").await.unwrap().unwrap();
    let entries = price.entries().unwrap();
    println!("   Read back: {:?}", entries);

    assert!(same_entries(entries, &written));
    assert!(entries
        .iter()
        .all(|e| matches!(e.value, Some(SettingValue::Float(_)))));

    let stored: Vec<String> = store
        .rows(&owner, "price_filter")
        .into_iter()
        .map(|row| row.value)
        .collect();
    assert_eq!(stored, vec!["10.0", "25.0"]);

    println!("✅ Both pairs read back with their modifiers");
}

#[tokio::test]
async fn test_unknown_modifier_leaves_rows_untouched() {
    print_test_header(
        "test_unknown_modifier_leaves_rows_untouched",
        &["A modifier outside the allowed set fails and keeps the stored rows"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let price = manager.get("price_filter").await.unwrap().unwrap();
    price
        .update([Entry::modified("gt", 10.0), Entry::modified("lte", 25.0)])
        .await
        .unwrap();
    let before = store.rows(&owner, "price_filter");

    let err = price
        .update([Entry::modified("dne", 10.0)])
        .await
        .unwrap_err();

    match err {
        SettingsError::Validation { errors, .. } => assert_eq!(
            errors,
            vec![
                "The modifier 'dne' for the 'price_filter' setting isn't present in the list of allowed modifiers."
                    .to_string()
            ]
        ),
        other => panic!("Expected a validation error, got {:?}", other),
    }

    assert_eq!(store.rows(&owner, "price_filter"), before);
    assert_eq!(price.entries().unwrap().len(), 2);

    println!("✅ Rows unchanged after the rejected update");
}

#[tokio::test]
async fn test_round_trip_restores_types() {
    print_test_header(
        "test_round_trip_restores_types",
        &["Every format reads back with its in-memory type"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (_owner, mut manager) = category_manager(store);

    let cases = vec![
        ("limit", SettingValue::Integer(25)),
        ("deleted", SettingValue::Boolean(true)),
        ("contact", SettingValue::from("shop@example.com")),
        ("homepage", SettingValue::from("https://example.com/shop")),
        ("code", SettingValue::from("ABC")),
        ("title", SettingValue::from("Garden tools")),
        ("sort", SettingValue::from("manual")),
    ];

    for (key, value) in &cases {
        println!("\n📝 Writing {} = {:?}", key, value);
        let proxy = manager.get(key).await.unwrap().unwrap();
        proxy.update([Entry::value(value.clone())]).await.unwrap();
    }

    let price = manager.get("price_filter").await.unwrap().unwrap();
    price.update([Entry::modified("eq", 10.5)]).await.unwrap();

    manager.reload().await.unwrap();

    for (key, value) in &cases {
        let proxy = manager.get(key).await.unwrap().unwrap();
        assert_eq!(proxy.value().unwrap(), Some(value), "Round trip of {}", key);
    }

    let price = manager.get("price_filter").await.unwrap().unwrap();
    assert_eq!(price.entries().unwrap(), &[Entry::modified("eq", 10.5)]);

    println!("✅ All formats round-tripped");
}

#[tokio::test]
async fn test_invalid_formats_are_reported() {
    print_test_header(
        "test_invalid_formats_are_reported",
        &["Each format rejects values that don't conform"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (_owner, mut manager) = category_manager(store.clone());

    let cases = vec![
        ("deleted", SettingValue::from("yes"), "is not a Boolean."),
        ("contact", SettingValue::from("not an email"), "is not an Email Address."),
        ("homepage", SettingValue::from("example"), "is not a URL."),
        ("code", SettingValue::from("abcd"), "is not in the correct format."),
        ("title", SettingValue::Integer(3), "is not a String."),
        (
            "sort",
            SettingValue::from("random"),
            "isn't present in the list of allowed values.",
        ),
    ];

    for (key, value, expected) in cases {
        let proxy = manager.get(key).await.unwrap().unwrap();
        match proxy.update([Entry::value(value)]).await {
            Err(SettingsError::Validation { errors, .. }) => {
                println!("   {}: {:?}", key, errors);
                assert!(errors.iter().any(|e| e.ends_with(expected)), "{}", key);
            }
            other => panic!("Expected a validation error for {}, got {:?}", key, other),
        }
    }

    assert_eq!(store.count(), 0);
    println!("✅ Every non-conforming value rejected");
}

#[tokio::test]
async fn test_single_option_keeps_one_row() {
    print_test_header(
        "test_single_option_keeps_one_row",
        &["Repeated writes of a single-value option leave one row"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let limit = manager.get("limit").await.unwrap().unwrap();
    for n in [10, 20, 30] {
        limit.update([Entry::value(n)]).await.unwrap();
        assert_eq!(store.rows(&owner, "limit").len(), 1);
    }

    let err = limit
        .update([Entry::value(1), Entry::value(2)])
        .await
        .unwrap_err();
    assert!(matches!(err, SettingsError::ArgumentShape { .. }));
    assert_eq!(store.rows(&owner, "limit")[0].value, "30");

    println!("✅ One row after every write");
}

#[tokio::test]
async fn test_clearing_values() {
    print_test_header(
        "test_clearing_values",
        &[
            "Clearing a multiple option removes every row",
            "Clearing a single option falls back to its default",
        ],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let price = manager.get("price_filter").await.unwrap().unwrap();
    price
        .update([Entry::modified("gt", 1), Entry::modified("lt", 5)])
        .await
        .unwrap();
    price.update(Vec::new()).await.unwrap();
    assert!(store.rows(&owner, "price_filter").is_empty());
    assert!(price.entries().unwrap().is_empty());

    let deleted = manager.get("deleted").await.unwrap().unwrap();
    deleted.update([Entry::value(true)]).await.unwrap();
    deleted.replace(Replacement::Clear).unwrap();
    assert_eq!(deleted.value().unwrap(), Some(&SettingValue::Boolean(false)));
    deleted.save().await.unwrap();

    manager.reload().await.unwrap();
    let deleted = manager.get("deleted").await.unwrap().unwrap();
    assert_eq!(deleted.value().unwrap(), Some(&SettingValue::Boolean(false)));

    println!("✅ Cleared values behave as expected");
}

#[tokio::test]
async fn test_replace_does_not_persist() {
    print_test_header(
        "test_replace_does_not_persist",
        &["replace only changes the pending view until save"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (_owner, mut manager) = category_manager(store.clone());

    let title = manager.get("title").await.unwrap().unwrap();
    title.replace(Entry::value("Lamps")).unwrap();
    assert_eq!(title.state(), ProxyState::Modified);
    assert_eq!(store.count(), 0);

    let err = title
        .replace(vec![Entry::value("a"), Entry::value("b")])
        .unwrap_err();
    assert!(matches!(err, SettingsError::ArgumentShape { .. }));

    title.set_modifier(Some("eq".to_string())).unwrap();
    title.set_value(Some(SettingValue::from("Chairs"))).unwrap();
    assert_eq!(title.single().unwrap(), &Entry::modified("eq", "Chairs"));

    title.reload().await.unwrap();
    assert_eq!(title.state(), ProxyState::Loaded);
    assert_eq!(title.value().unwrap(), None);

    let price = manager.get("price_filter").await.unwrap().unwrap();
    assert!(matches!(
        price.single(),
        Err(SettingsError::ArgumentShape { .. })
    ));
    price.replace(Entry::modified("gt", 3)).unwrap();
    assert_eq!(price.entries().unwrap(), &[Entry::modified("gt", 3)]);

    println!("✅ Pending changes stay in memory");
}

#[tokio::test]
async fn test_failed_insert_restores_original_rows() {
    print_test_header(
        "test_failed_insert_restores_original_rows",
        &["When an insert fails, partial rows are removed and originals recreated"],
    );

    let store = Arc::new(FailingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let price = manager.get("price_filter").await.unwrap().unwrap();
    price
        .update([Entry::modified("gt", 10.0), Entry::modified("lte", 25.0)])
        .await
        .unwrap();

    println!("\n📝 Rejecting value 30.0 in the store");
    store.reject("30.0");

    let err = price
        .update([Entry::modified("eq", 20.0), Entry::modified("lt", 30.0)])
        .await
        .unwrap_err();
    println!("   Error: {}", err);
    assert!(matches!(err, SettingsError::Persistence { .. }));

    let rows = store.rows(&owner, "price_filter");
    let stored: Vec<(Option<String>, String)> = rows
        .into_iter()
        .map(|row| (row.modifier, row.value))
        .collect();
    assert_eq!(
        stored,
        vec![
            (Some("gt".to_string()), "10.0".to_string()),
            (Some("lte".to_string()), "25.0".to_string()),
        ]
    );
    assert_eq!(
        price.entries().unwrap(),
        &[Entry::modified("gt", 10.0), Entry::modified("lte", 25.0)]
    );

    println!("✅ Original rows restored");
}

#[tokio::test]
async fn test_try_update_collects_errors() {
    print_test_header(
        "test_try_update_collects_errors",
        &["The lenient update returns false and keeps the messages"],
    );

    let store = Arc::new(FailingStore::new());
    let (_owner, mut manager) = category_manager(store.clone());

    let limit = manager.get("limit").await.unwrap().unwrap();
    assert!(!limit.try_update([Entry::value("Ten")]).await.unwrap());
    assert_eq!(limit.last_errors().len(), 1);

    store.reject("7");
    assert!(!limit.try_update([Entry::value(7)]).await.unwrap());
    assert!(limit.last_errors()[0].contains("constraint violation"));

    assert!(limit.try_update([Entry::value(8)]).await.unwrap());
    assert!(limit.last_errors().is_empty());

    let err = limit
        .try_update([Entry::value(1), Entry::value(2)])
        .await
        .unwrap_err();
    assert!(matches!(err, SettingsError::ArgumentShape { .. }));

    println!("✅ Lenient path reports instead of failing");
}

#[tokio::test]
async fn test_unparseable_stored_text_fails_validation() {
    print_test_header(
        "test_unparseable_stored_text_fails_validation",
        &["Stored text that doesn't parse stays text and is caught by validation"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    store
        .create(
            &owner,
            NewSetting {
                key: "limit".to_string(),
                modifier: None,
                value: "abc".to_string(),
            },
        )
        .await
        .unwrap();

    let limit = manager.get("limit").await.unwrap().unwrap();
    assert_eq!(limit.value().unwrap(), Some(&SettingValue::from("abc")));
    assert!(limit.validate().is_err());
    assert_eq!(limit.validation_errors().len(), 1);

    println!("✅ Unparseable text surfaced as a validation error");
}

#[tokio::test]
async fn test_value_length_limit() {
    print_test_header(
        "test_value_length_limit",
        &["Values longer than the configured limit are rejected"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let registry = registry().with_limits(Limits {
        max_value_length: 5,
    });
    let owner = common::category_owner();
    let mut manager = registry.manager(owner.clone(), store.clone()).unwrap();

    let title = manager.get("title").await.unwrap().unwrap();
    let err = title.update([Entry::value("Garden tools")]).await.unwrap_err();
    assert_eq!(
        err,
        SettingsError::Validation {
            key: "title".to_string(),
            errors: vec!["The value for the 'title' setting is longer than 5 bytes.".to_string()],
        }
    );

    title.update([Entry::value("Lamps")]).await.unwrap();
    assert_eq!(store.rows(&owner, "title").len(), 1);

    println!("✅ Length limit applied");
}

#[tokio::test]
async fn test_save_leaves_coerced_values_pending() {
    print_test_header(
        "test_save_leaves_coerced_values_pending",
        &["A saved proxy shows values with the types a fresh read would give"],
    );

    let store = Arc::new(InMemorySettingStore::new());
    let (_owner, mut manager) = category_manager(store);

    let price = manager.get("price_filter").await.unwrap().unwrap();
    price
        .update([Entry::modified("gt", 5), Entry::modified("lt", 7.5)])
        .await
        .unwrap();

    assert_eq!(price.state(), ProxyState::Loaded);
    assert_eq!(
        price.entries().unwrap(),
        &[
            Entry::modified("gt", SettingValue::Float(5.0)),
            Entry::modified("lt", 7.5)
        ]
    );

    println!("✅ Pending view coerced after save");
}

#[tokio::test]
async fn test_blank_text_is_a_missing_value() {
    print_test_header(
        "test_blank_text_is_a_missing_value",
        &["Empty or whitespace-only text fails validation before reaching the store"],
    );

    let store = Arc::new(FailingStore::new());
    let (owner, mut manager) = category_manager(store.clone());

    let title = manager.get("title").await.unwrap().unwrap();
    for blank in ["", "  "] {
        let err = title.update([Entry::value(blank)]).await.unwrap_err();
        assert_eq!(
            err,
            SettingsError::Validation {
                key: "title".to_string(),
                errors: vec!["The value for the 'title' setting must be present.".to_string()],
            }
        );
    }

    assert_eq!(store.create_calls(), 0);
    assert!(store.rows(&owner, "title").is_empty());

    let err = store
        .create(
            &owner,
            NewSetting {
                key: "title".to_string(),
                modifier: None,
                value: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("can't be blank"));

    println!("✅ Blank text rejected as missing");
}
