use gpu_tools::core::config::Config;
use gpu_tools::core::runner::ScriptedRunner;
use gpu_tools::core::telemetry::{collect_all, Registry};
use std::sync::Arc;
use tempfile::TempDir;

const NVIDIA_CSV: &str = include_str!("../fixtures/nvidia_smi.csv");
const ROCM_JSON: &str = include_str!("../fixtures/rocm_smi.json");

/// Config pointing every filesystem probe at an empty directory
fn isolated_config(dir: &TempDir) -> Config {
    Config {
        corex_root: Some(dir.path().display().to_string()),
        drm_root: Some(dir.path().display().to_string()),
        ..Default::default()
    }
}

#[test]
fn test_default_registration_order() {
    let registry = Registry::with_defaults(Arc::new(ScriptedRunner::new()), &Config::default());
    assert_eq!(registry.len(), 8);
    assert_eq!(
        registry.vendors(),
        vec!["AMD", "AMD-riscv", "CPU", "Denglin", "Enflame", "Iluvatar", "mx", "NVIDIA"]
    );
}

#[test]
fn test_disabled_vendors_are_not_registered() {
    let config = Config {
        disabled_vendors: vec!["cpu".to_string(), "NVIDIA".to_string()],
        ..Default::default()
    };
    let registry = Registry::with_defaults(Arc::new(ScriptedRunner::new()), &config);
    assert_eq!(registry.len(), 6);
    assert!(registry.find("CPU").is_none());
    assert!(registry.find("nvidia").is_none());
    assert!(registry.find("amd").is_some());
}

#[test]
fn test_only_nvidia_driver_info_is_offered() {
    let registry = Registry::with_defaults(Arc::new(ScriptedRunner::new()), &Config::default());
    let providers: Vec<&str> = registry
        .all()
        .iter()
        .filter(|l| l.driver_info_provider().is_some())
        .map(|l| l.vendor())
        .collect();
    assert_eq!(providers, vec!["NVIDIA"]);
}

#[test]
fn test_collect_all_on_scripted_host() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(
        ScriptedRunner::new()
            .with_output("nvidia-smi", NVIDIA_CSV)
            .with_output("/usr/bin/rocm-smi", ROCM_JSON),
    );
    let registry = Registry::with_defaults(runner, &isolated_config(&dir));

    let reports = collect_all(&registry);
    let available: Vec<&str> = reports
        .iter()
        .filter(|r| r.available)
        .map(|r| r.vendor)
        .collect();
    assert_eq!(available, vec!["AMD", "CPU", "NVIDIA"]);

    let counts: Vec<(&str, usize)> = reports
        .iter()
        .filter(|r| r.available)
        .map(|r| (r.vendor, r.device_count()))
        .collect();
    assert_eq!(counts, vec![("AMD", 1), ("CPU", 0), ("NVIDIA", 2)]);
}

#[test]
fn test_one_failing_vendor_does_not_hide_others() {
    let dir = TempDir::new().unwrap();
    let runner = Arc::new(
        ScriptedRunner::new()
            .with_output("nvidia-smi", NVIDIA_CSV)
            .with_output("/usr/bin/rocm-smi", "not json"),
    );
    let registry = Registry::with_defaults(runner, &isolated_config(&dir));

    let reports = collect_all(&registry);
    let amd = reports.iter().find(|r| r.vendor == "AMD").unwrap();
    assert!(matches!(&amd.result, Some(Err(e)) if e.is_parse()));

    let nvidia = reports.iter().find(|r| r.vendor == "NVIDIA").unwrap();
    assert_eq!(nvidia.device_count(), 2);
}

#[test]
fn test_configured_tool_paths_are_used() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        rocm_smi_path: Some("/opt/rocm/bin/rocm-smi".to_string()),
        mx_smi_path: Some("/opt/maca/bin/mx-smi".to_string()),
        ..isolated_config(&dir)
    };
    let runner = Arc::new(
        ScriptedRunner::new()
            .with_output("/opt/rocm/bin/rocm-smi", ROCM_JSON)
            .with_output("/opt/maca/bin/mx-smi", ""),
    );
    let registry = Registry::with_defaults(runner, &config);

    assert!(registry.find("AMD").unwrap().available());
    assert!(registry.find("mx").unwrap().available());
    assert_eq!(registry.find("AMD").unwrap().load().unwrap().len(), 1);
}
