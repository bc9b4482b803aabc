//! Result type for the command layer and the binary.
//!
//! Library code returns [`crate::error::Result`] so callers can match on
//! failures. Commands convert those into `color_eyre` reports and add
//! context with `.wrap_err()`:
//!
//! ```rust,ignore
//! use color_eyre::eyre::WrapErr;
//!
//! let config = Config::load(path).wrap_err("unable to load configuration")?;
//! ```

use color_eyre::eyre::Result as EyreResult;

/// Standard result type for commands.
pub type Result<T> = EyreResult<T>;
