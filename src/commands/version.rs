use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("gpu-tools version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
