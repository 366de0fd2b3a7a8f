use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_nanos();
    std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), ts))
}

#[test]
fn defaults_point_at_latest_release() {
    let config = UpdaterConfig::default();
    assert!(config.release_url.ends_with("/releases/latest"));
    assert_eq!(config.launcher_asset_name, "tmc");
    assert_eq!(config.windows_asset_extension, ".jar");
    assert_eq!(config.download_suffix, ".new");
    assert_eq!(config.metadata_timeout(), None);
    assert_eq!(config.connect_timeout(), None);
}

#[test]
fn partial_json_falls_back_to_defaults_for_missing_keys() {
    let config = UpdaterConfig::from_json(r#"{"launcher_asset_name": "tmc-beta"}"#)
        .expect("partial settings must parse");
    assert_eq!(config.launcher_asset_name, "tmc-beta");
    assert_eq!(config.release_url, UpdaterConfig::default().release_url);
}

#[test]
fn zero_timeout_means_transport_default() {
    let config = UpdaterConfig::from_json(r#"{"metadata_timeout_secs": 0, "connect_timeout_secs": 7}"#)
        .expect("settings must parse");
    assert_eq!(config.metadata_timeout(), None);
    assert_eq!(config.connect_timeout(), Some(Duration::from_secs(7)));
}

#[test]
fn malformed_json_is_an_error() {
    let err = UpdaterConfig::from_json("{not json").expect_err("malformed settings must fail");
    assert!(err.to_string().contains("settings.json"));
}

#[test]
fn load_from_missing_file_returns_defaults() {
    let path = unique_temp_dir("tmc_config_missing").join(SETTINGS_FILE_NAME);
    let config = UpdaterConfig::load_from(&path).expect("missing file must yield defaults");
    assert_eq!(config, UpdaterConfig::default());
}

#[test]
fn load_from_reads_existing_file() -> Result<()> {
    let dir = unique_temp_dir("tmc_config_existing");
    fs::create_dir_all(&dir)?;
    let path = dir.join(SETTINGS_FILE_NAME);
    fs::write(&path, r#"{"release_url": "http://localhost/latest"}"#)?;

    let config = UpdaterConfig::load_from(&path)?;
    assert_eq!(config.release_url, "http://localhost/latest");

    fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn env_override_replaces_release_url() {
    let mut config = UpdaterConfig::default();
    config.apply_env_overrides(|key| {
        (key == UPDATE_URL_ENV_KEY).then(|| " http://mirror/latest ".to_string())
    });
    assert_eq!(config.release_url, "http://mirror/latest");
}

#[test]
fn blank_env_override_is_ignored() {
    let mut config = UpdaterConfig::default();
    config.apply_env_overrides(|_| Some("  ".to_string()));
    assert_eq!(config.release_url, UpdaterConfig::default().release_url);
}

#[test]
fn skip_switch_requires_exact_value() {
    assert!(update_check_skipped(|key| {
        (key == UPDATE_SKIP_ENV_KEY).then(|| UPDATE_SKIP_ENV_VALUE.to_string())
    }));
    assert!(!update_check_skipped(|_| Some("0".to_string())));
    assert!(!update_check_skipped(|_| Some("yes".to_string())));
    assert!(!update_check_skipped(|_| Some(" 1".to_string())));
}

#[test]
fn skip_switch_is_off_when_unset() {
    assert!(!update_check_skipped(|_| None));
    assert!(!update_check_skipped(|key| {
        (key == UPDATE_URL_ENV_KEY).then(|| UPDATE_SKIP_ENV_VALUE.to_string())
    }));
}
