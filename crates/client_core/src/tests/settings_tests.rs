use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_from(&dir.path().join("missing.toml"), env_from(&[]));
    assert_eq!(settings, GuestbookSettings::default());
    assert_eq!(settings.connect_delay(), Duration::from_millis(1500));
    assert_eq!(settings.submit_delay(), Duration::from_millis(2000));
    assert_eq!(settings.operation_timeout(), None);
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("guestbook.toml");
    fs::write(
        &path,
        r#"
database_url = "sqlite://./data/ledger.db"
connect_delay_ms = 10
seed_mock_entries = false
operation_timeout_ms = 5000
"#,
    )
    .expect("write settings");

    let settings = load_settings_from(&path, env_from(&[]));
    assert_eq!(
        settings.database_url.as_deref(),
        Some("sqlite://./data/ledger.db")
    );
    assert_eq!(settings.connect_delay_ms, 10);
    assert_eq!(settings.submit_delay_ms, 2000);
    assert!(!settings.seed_mock_entries);
    assert_eq!(settings.operation_timeout(), Some(Duration::from_secs(5)));
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("guestbook.toml");
    fs::write(&path, "submit_delay_ms = 300\n").expect("write settings");

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("GUESTBOOK_SUBMIT_DELAY_MS", "40"),
            ("APP__SUBMIT_DELAY_MS", "50"),
            ("GUESTBOOK_DEV_ACCOUNT", "2"),
            ("GUESTBOOK_SEED_MOCK_ENTRIES", "false"),
        ]),
    );
    assert_eq!(settings.submit_delay_ms, 50);
    assert_eq!(settings.dev_account, 2);
    assert!(!settings.seed_mock_entries);
}

#[test]
fn ignores_malformed_file_and_unparsable_env() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("guestbook.toml");
    fs::write(&path, "connect_delay_ms = \"soon\"").expect("write settings");

    let settings = load_settings_from(&path, env_from(&[("GUESTBOOK_CONNECT_DELAY_MS", "later")]));
    assert_eq!(settings.connect_delay_ms, 1500);
}

#[test]
fn blank_database_url_env_means_simulated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("guestbook.toml");
    fs::write(&path, "database_url = \"sqlite://x.db\"").expect("write settings");

    let settings = load_settings_from(&path, env_from(&[("APP__DATABASE_URL", "")]));
    assert_eq!(settings.database_url, None);
}
