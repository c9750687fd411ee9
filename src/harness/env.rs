//! Scoped environment overrides for implicit watch arguments
//!
//! The child binary reads the positional key and range end from these
//! variables when they are not on the command line. They are process-wide
//! state: exactly one scenario may hold them at a time, and they must be
//! unset before the next scenario starts.

use std::env;

/// Implicit positional key read by the child.
pub const WATCH_KEY_ENV: &str = "IMPLICIT_WATCH_KEY";

/// Implicit positional range end read by the child.
pub const WATCH_RANGE_END_ENV: &str = "IMPLICIT_WATCH_RANGE_END";

/// Guard over the implicit-argument variables.
///
/// `clear` unsets exactly the variables that were set and is idempotent.
/// It also runs on drop, so the environment is restored on every exit path
/// (success, assertion failure, or timeout).
#[derive(Debug)]
pub struct EnvOverride {
    applied: Vec<&'static str>,
}

impl EnvOverride {
    /// Set the implicit key and/or range-end variables for one scenario.
    pub fn apply(key: Option<&str>, range_end: Option<&str>) -> Self {
        Self::apply_named(WATCH_KEY_ENV, WATCH_RANGE_END_ENV, key, range_end)
    }

    fn apply_named(
        key_var: &'static str,
        range_var: &'static str,
        key: Option<&str>,
        range_end: Option<&str>,
    ) -> Self {
        let mut applied = Vec::new();
        if let Some(key) = key {
            env::set_var(key_var, key);
            applied.push(key_var);
        }
        if let Some(range_end) = range_end {
            env::set_var(range_var, range_end);
            applied.push(range_var);
        }
        Self { applied }
    }

    /// Unset exactly the variables this override set. Idempotent.
    pub fn clear(&mut self) {
        for var in self.applied.drain(..) {
            env::remove_var(var);
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        self.clear();
    }
}
