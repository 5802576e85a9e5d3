//! `onsem check-config`: load and validate a configuration file.

use std::path::Path;

use anyhow::Context;
use onsem_bridge::BridgeConfig;

pub fn execute(path: &Path, resolved: bool) -> anyhow::Result<()> {
    let config = BridgeConfig::load(path).with_context(|| format!("invalid configuration {}", path.display()))?;
    println!("{}: ok", path.display());
    if resolved {
        print!("{}", config.to_toml_string()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onsem.toml");
        std::fs::write(&path, "[text]\nformal_address = false\n").unwrap();
        assert!(execute(&path, true).is_ok());
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onsem.toml");
        std::fs::write(&path, "[recommendations]\nmax_results = 0\n").unwrap();
        let err = execute(&path, false).unwrap_err();
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
