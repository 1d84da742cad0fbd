use super::*;
use chrono::TimeZone;

fn entry(id: &str, name: &str) -> GuestbookEntry {
    GuestbookEntry {
        id: EntryId::new(id),
        address: "0x12345678...9abc".into(),
        name: name.into(),
        message: "hello".into(),
        timestamp: Utc::now(),
    }
}

#[test]
fn seeded_store_holds_three_demo_entries_newest_first() {
    let now = Utc
        .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid time");
    let store = EntryStore::seeded(now);

    let names: Vec<_> = store.list().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob", "Charlie"]);
    assert_eq!(store.list()[0].timestamp, now - Duration::hours(2));
    assert_eq!(store.list()[2].timestamp, now - Duration::hours(24));
    assert!(store
        .list()
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[test]
fn prepend_puts_new_entry_first() {
    let mut store = EntryStore::from_entries(vec![entry("1", "old")]);
    store.prepend(entry("2", "new")).expect("prepend");
    assert_eq!(store.len(), 2);
    assert_eq!(store.list()[0].name, "new");
    assert_eq!(store.get(&EntryId::new("1")).map(|e| e.name.as_str()), Some("old"));
}

#[test]
fn prepend_rejects_duplicate_ids() {
    let mut store = EntryStore::default();
    assert!(store.is_empty());
    store.prepend(entry("7", "first")).expect("prepend");

    let err = store.prepend(entry("7", "again")).expect_err("duplicate");
    assert!(matches!(err, GuestbookError::Submission(_)));
    assert_eq!(store.len(), 1);
    assert_eq!(store.list()[0].name, "first");
}
