use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use scancheck::config::{Config, ENV_PREFIX};
use scancheck::loader::HeaderPolicy;
use scancheck::output::ExportFormat;
use scancheck::validator::CooldownScope;
use std::fs;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

// Environment variables are process-wide
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config.cooldown(), Duration::from_secs(2));
    assert_eq!(config.header, HeaderPolicy::Auto);
    assert_eq!(config.export_format, ExportFormat::Csv);
}

#[test]
fn test_config_load_from_env() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    std::env::set_var("SCANCHECK_COOLDOWN_MS", "750");
    std::env::set_var("SCANCHECK_COOLDOWN_SCOPE", "global");
    // Double underscore for nesting
    std::env::set_var("SCANCHECK_MATCHING__CASE_INSENSITIVE", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .unwrap();

    std::env::remove_var("SCANCHECK_COOLDOWN_MS");
    std::env::remove_var("SCANCHECK_COOLDOWN_SCOPE");
    std::env::remove_var("SCANCHECK_MATCHING__CASE_INSENSITIVE");

    assert_eq!(config.cooldown_ms, 750);
    assert_eq!(config.cooldown_scope, CooldownScope::Global);
    assert!(config.matching.case_insensitive);
    assert!(!config.matching.strip_leading_zeros);
}

#[test]
fn test_config_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
cooldown_ms = 0
header = "never"
audio_cue = false
export_format = "json"
export_dir = "/srv/exports"

[matching]
strip_leading_zeros = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.cooldown(), Duration::ZERO);
    assert_eq!(config.header, HeaderPolicy::Never);
    assert!(!config.audio_cue);
    assert_eq!(config.export_format, ExportFormat::Json);
    assert!(config.matching.strip_leading_zeros);
    // Unset keys keep their defaults
    assert_eq!(config.min_code_length, 1);
    assert!(config.console_commands);
}

#[test]
fn test_env_overrides_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_code_length = 4\n").unwrap();

    std::env::set_var("SCANCHECK_MIN_CODE_LENGTH", "8");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .unwrap();
    std::env::remove_var("SCANCHECK_MIN_CODE_LENGTH");

    assert_eq!(config.min_code_length, 8);
}

#[test]
fn test_invalid_toml_value_is_an_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "cooldown_scope = \"sometimes\"\n").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_save_round_trip() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|p| p.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let config = Config {
        cooldown_ms: 1500,
        cooldown_scope: CooldownScope::Global,
        ..Config::default()
    };
    config.save(&config_path).unwrap();

    assert_eq!(Config::load(Some(&config_path)).unwrap(), config);
}
