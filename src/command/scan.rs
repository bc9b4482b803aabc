//! `scan` command implementation.
use color_eyre::eyre::WrapErr;
use std::path::Path;

use crate::{command::to_yaml, result::Result, scanner::scan_all};

/// Dependencies under `path`, grouped by scanner, as YAML.
pub fn render(path: &Path) -> Result<String> {
    let results = scan_all(path)
        .wrap_err_with(|| format!("scanning {} failed", path.display()))?;
    to_yaml(&results)
}

/// Execute `scan` on the tree at `path`.
pub fn execute(path: &Path) -> Result<()> {
    print!("{}", render(path)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn renders_dependencies_by_kind() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(".pre-commit-config.yaml"),
            "repos:\n  - repo: https://github.com/psf/black\n    rev: 20.8b1\n",
        )
        .unwrap();

        let output = render(tmp.path()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();

        assert_eq!(parsed["helm"].as_sequence().unwrap().len(), 0);
        let hooks = parsed["pre-commit"].as_sequence().unwrap();
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0]["kind"], "pre-commit");
        assert_eq!(hooks[0]["owner"], "psf");
        assert_eq!(hooks[0]["version"], "20.8b1");
    }
}
