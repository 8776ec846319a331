use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("uptime-monitor version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
