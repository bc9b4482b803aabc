//! Command execution for freshen.
//!
//! Each command loads what it needs from the [`Config`](crate::config::Config),
//! runs one operation and prints its result as YAML on stdout.

/// Report, apply or publish the updates a single checkout needs.
pub mod analyze;

/// Query a Helm repository or a GitHub repository for its latest versions.
pub mod inventory;

/// Update every configured repository.
pub mod process;

/// List declared dependencies.
pub mod scan;

use serde::Serialize;

use crate::result::Result;

/// Render `value` as a YAML document.
pub(crate) fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Print `value` as YAML on stdout.
pub(crate) fn print_yaml<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    print!("{}", to_yaml(value)?);
    Ok(())
}
