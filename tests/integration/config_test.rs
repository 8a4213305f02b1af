use gpu_tools::core::config::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.disabled_vendors.is_empty());
    assert!(config.rocm_smi_path.is_none());
    assert!(config.is_vendor_enabled("NVIDIA"));
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config {
        mx_smi_path: Some("/opt/maca/bin/mx-smi".to_string()),
        corex_root: Some("/opt".to_string()),
        ..Default::default()
    };
    config.disable_vendor("Enflame");
    config.disable_vendor("enflame");
    config.save_to(&config_path).unwrap();

    let loaded = Config::load_from(&config_path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.disabled_vendors, vec!["Enflame"]);
    assert!(!loaded.is_vendor_enabled("ENFLAME"));
}

#[test]
fn test_missing_and_empty_files_give_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());

    fs::write(&config_path, "  \n").unwrap();
    assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, r#"{"disabled_vendors": ["CPU"]}"#).unwrap();

    let config = Config::load_from(&config_path).unwrap();
    assert_eq!(config.disabled_vendors, vec!["CPU"]);
    assert!(config.drm_root.is_none());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, "{ not json").unwrap();

    let err = Config::load_from(&config_path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
