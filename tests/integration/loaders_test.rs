use gpu_tools::core::runner::ScriptedRunner;
use gpu_tools::core::telemetry::GpuInfoLoader;
use gpu_tools::platform::gpu::{
    AmdLoader, DenglinLoader, EnflameLoader, MetaxLoader, NvidiaLoader, MX_SMI_PATH,
    ROCM_SMI_PATH,
};
use std::sync::Arc;

const ROCM_JSON: &str = include_str!("../fixtures/rocm_smi.json");
const NVIDIA_CSV: &str = include_str!("../fixtures/nvidia_smi.csv");
const DLSMI_XML: &str = include_str!("../fixtures/dlsmi_output.xml");
const EFSMI_TXT: &str = include_str!("../fixtures/efsmi.txt");
const MX_SMI_TXT: &str = include_str!("../fixtures/mx_smi.txt");

#[test]
fn test_amd_end_to_end() {
    let loader = AmdLoader::new(Arc::new(
        ScriptedRunner::new().with_output(ROCM_SMI_PATH, ROCM_JSON),
    ));
    let list = loader.load().unwrap();

    let gpu = &list.gpu_infos[0];
    assert_eq!(gpu.index, 0);
    assert_eq!(gpu.vram_total, "17163091968");
    assert_eq!(gpu.card_vendor, "Advanced Micro Devices, Inc. [AMD/ATI]");
}

#[test]
fn test_nvidia_end_to_end() {
    let runner = Arc::new(ScriptedRunner::new().with_output("nvidia-smi", NVIDIA_CSV));
    let loader = NvidiaLoader::new(runner.clone());
    assert!(loader.available());

    let list = loader.load().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.gpu_infos[0].vram_total, "17171480576");
    assert_eq!(list.gpu_infos[0].temperature_edge, "41.0");

    let query = runner.invocations().pop().unwrap();
    assert_eq!(query.args[0], "--format=csv,noheader");
}

#[test]
fn test_denglin_end_to_end() {
    let loader = DenglinLoader::new(Arc::new(
        ScriptedRunner::new().with_output("dlsmi", DLSMI_XML),
    ));
    let list = loader.load().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.gpu_infos[0].card_model, "KS38 QUAD-3");
    assert_eq!(list.gpu_infos[2].card_vendor, "Denglin");
}

#[test]
fn test_enflame_end_to_end() {
    let loader = EnflameLoader::new(Arc::new(
        ScriptedRunner::new().with_output("efsmi", EFSMI_TXT),
    ));
    assert!(loader.available());
    let list = loader.load().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.gpu_infos[0].pci_bus, "0000:0c:00.0");
}

#[test]
fn test_metax_end_to_end() {
    let loader = MetaxLoader::new(Arc::new(
        ScriptedRunner::new().with_output(MX_SMI_PATH, MX_SMI_TXT),
    ));
    let list = loader.load().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.gpu_infos[0].vram_used, "62684897280");
}

#[test]
fn test_snapshot_json_uses_canonical_names() {
    let loader = AmdLoader::new(Arc::new(
        ScriptedRunner::new().with_output(ROCM_SMI_PATH, ROCM_JSON),
    ));
    let list = loader.load().unwrap();

    let value = serde_json::to_value(&list).unwrap();
    let gpu = &value["GPUInfos"][0];
    assert_eq!(gpu["num"], 0);
    assert_eq!(gpu["VRAM Total Memory (B)"], "17163091968");
    assert_eq!(gpu["PCI Bus"], "0000:03:00.0");
}

#[test]
fn test_missing_tools_fail_with_execution_errors() {
    let runner = Arc::new(ScriptedRunner::new());
    let loaders: Vec<Box<dyn GpuInfoLoader>> = vec![
        Box::new(AmdLoader::new(runner.clone())),
        Box::new(DenglinLoader::new(runner.clone())),
        Box::new(EnflameLoader::new(runner.clone())),
        Box::new(MetaxLoader::new(runner.clone())),
        Box::new(NvidiaLoader::new(runner)),
    ];

    for loader in &loaders {
        assert!(!loader.available(), "{} should be unavailable", loader.vendor());
        let err = loader.load().unwrap_err();
        assert!(err.is_execution(), "{}: {}", loader.vendor(), err);
    }
}
