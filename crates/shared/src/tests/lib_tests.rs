use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    domain::{
        format_age, truncate_chars, validate_entry_fields, AccountAddress, EntryId,
        GuestbookEntry, LedgerEntryId, SessionSnapshot, MESSAGE_MAX_CHARS, NAME_MAX_CHARS,
    },
    error::{ErrorCode, GuestbookError},
    protocol::{GuestbookEvent, Notification, NotificationVariant},
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).single().expect("valid time")
}

#[test]
fn format_age_buckets_by_whole_hours_and_days() {
    let now = t0();
    assert_eq!(format_age(now - Duration::minutes(30), now), "Just now");
    assert_eq!(format_age(now - Duration::hours(5), now), "5h ago");
    assert_eq!(format_age(now - Duration::hours(48), now), "2d ago");
}

#[test]
fn format_age_floors_at_bucket_edges() {
    let now = t0();
    assert_eq!(format_age(now, now), "Just now");
    assert_eq!(format_age(now - Duration::minutes(59), now), "Just now");
    assert_eq!(format_age(now - Duration::minutes(60), now), "1h ago");
    assert_eq!(
        format_age(now - Duration::hours(23) - Duration::minutes(59), now),
        "23h ago"
    );
    assert_eq!(format_age(now - Duration::hours(24), now), "1d ago");
    assert_eq!(format_age(now - Duration::hours(71), now), "2d ago");
}

#[test]
fn format_age_treats_future_timestamps_as_just_now() {
    let now = t0();
    assert_eq!(format_age(now + Duration::hours(3), now), "Just now");
}

#[test]
fn parses_and_normalizes_account_address() {
    let address =
        AccountAddress::parse("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266").expect("address");
    assert_eq!(address.as_str(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    assert_eq!(address.short(), "0xf39fd6e5...2266");
}

#[test]
fn rejects_malformed_account_addresses() {
    for raw in [
        "",
        "0x",
        "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "0x1234",
        "0xzz9fd6e51aad88f6f4ce6ab8827279cfffb92266",
    ] {
        let err = AccountAddress::parse(raw).expect_err("must reject");
        assert_eq!(err.code(), ErrorCode::Validation);
    }
}

#[test]
fn dev_accounts_resolve_by_index() {
    let deployer = AccountAddress::dev_account(0).expect("deployer");
    assert_eq!(deployer.short(), "0xf39fd6e5...2266");
    assert!(AccountAddress::dev_account(3).is_err());
}

#[test]
fn address_from_bytes_is_lowercase_hex() {
    let address = AccountAddress::from_bytes(&[0xab; 20]);
    assert_eq!(address.as_str(), format!("0x{}", "ab".repeat(20)));
    assert_eq!(AccountAddress::parse(address.as_str()).expect("parse"), address);
}

#[test]
fn validation_rejects_blank_fields() {
    assert!(validate_entry_fields("Dana", "hi").is_ok());
    assert!(matches!(
        validate_entry_fields("", "hi"),
        Err(GuestbookError::Validation(_))
    ));
    assert!(matches!(
        validate_entry_fields("Dana", "   \n\t"),
        Err(GuestbookError::Validation(_))
    ));
}

#[test]
fn validation_enforces_character_limits() {
    let name = "é".repeat(NAME_MAX_CHARS);
    let message = "m".repeat(MESSAGE_MAX_CHARS);
    assert!(validate_entry_fields(&name, &message).is_ok());

    let long_name = "n".repeat(NAME_MAX_CHARS + 1);
    assert!(validate_entry_fields(&long_name, "hi").is_err());
    let long_message = "m".repeat(MESSAGE_MAX_CHARS + 1);
    assert!(validate_entry_fields("Dana", &long_message).is_err());
}

#[test]
fn truncate_counts_characters_not_bytes() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("hi", 10), "hi");
}

#[test]
fn entry_initial_is_uppercased_first_char() {
    let entry = GuestbookEntry {
        id: EntryId::new("1"),
        address: "0x1234...5678".into(),
        name: "ßigrid".into(),
        message: "hello".into(),
        timestamp: t0(),
    };
    assert_eq!(entry.initial(), "SS");
}

#[test]
fn ledger_id_converts_to_decimal_entry_id() {
    assert_eq!(EntryId::from(LedgerEntryId(42)).as_str(), "42");
}

#[test]
fn guestbook_errors_map_to_error_codes() {
    let busy = GuestbookError::Busy("submit");
    assert_eq!(busy.code(), ErrorCode::Busy);
    assert_eq!(busy.to_string(), "submit already in progress");
    assert_eq!(
        GuestbookError::InvalidAddress("0x1".into()).code(),
        ErrorCode::Validation
    );
    assert_eq!(GuestbookError::NotConnected.code(), ErrorCode::NotConnected);
    assert_eq!(
        GuestbookError::Submission("reverted".into()).code(),
        ErrorCode::Submission
    );
}

#[test]
fn events_serialize_with_type_and_payload_tags() {
    let event = GuestbookEvent::Notification(Notification::message_added());
    let json = serde_json::to_value(&event).expect("json");
    assert_eq!(json["type"], "notification");
    assert_eq!(json["payload"]["title"], "Message Added!");
    assert_eq!(json["payload"]["variant"], "default");

    let session = GuestbookEvent::SessionChanged(SessionSnapshot::default());
    let json = serde_json::to_value(&session).expect("json");
    assert_eq!(json["type"], "session_changed");
    assert!(json["payload"].get("address").is_none());
}

#[test]
fn error_codes_serialize_as_snake_case() {
    let json = serde_json::to_value(GuestbookError::NotConnected.code()).expect("json");
    assert_eq!(json, "not_connected");
}

#[test]
fn address_deserialization_validates_input() {
    let ok: AccountAddress =
        serde_json::from_str("\"0x70997970C51812dc3A010C7d01b50e0d17dc79C8\"").expect("address");
    assert_eq!(ok.short(), "0x70997970...79c8");
    assert!(serde_json::from_str::<AccountAddress>("\"0x1234\"").is_err());
}

#[test]
fn failure_notifications_are_destructive() {
    assert!(Notification::connection_failed().is_destructive());
    assert!(Notification::transaction_failed().is_destructive());
    assert!(Notification::missing_information().is_destructive());
    assert_eq!(
        Notification::wallet_disconnected().variant,
        NotificationVariant::Default
    );
}
