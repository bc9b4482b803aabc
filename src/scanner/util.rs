use log::*;
use serde_yaml::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

use crate::error::Result;

/// Finds files with one of `names` under `root`, skipping the `tests`
/// directory at the root and any `.git` directory.
pub fn find_files(root: &Path, names: &[&str]) -> Result<Vec<PathBuf>> {
    let tests = root.join("tests");
    let mut results = vec![];

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != tests.as_path() && e.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && names.contains(&name)
        {
            results.push(entry.into_path());
        }
    }

    Ok(results)
}

/// Loads a YAML file, logging and returning `None` when it cannot be read
/// or parsed so one broken file does not stop the scan.
pub fn load_yaml(path: &Path) -> Option<Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("unable to read {}: {err}", path.display());
            return None;
        }
    };

    match serde_yaml::from_str(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("unable to parse {}: {err}", path.display());
            None
        }
    }
}

/// Reads a scalar as a string. Numbers are accepted since unquoted
/// versions like `1.10` load as floats.
pub fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
