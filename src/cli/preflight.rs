//! Pre-flight checks before provider calls.
//!
//! Validates that the configured provider can be reached with credentials
//! before any request is built.

use crate::config::ProviderSettings;
use crate::error::{Result, SegueError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Script generation calls the provider.
    Generate,
    /// Style extraction calls the provider.
    StyleCreate,
    /// Article extraction needs no credentials.
    Extract,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, provider: &ProviderSettings) -> Result<()> {
    match operation {
        Operation::Generate | Operation::StyleCreate => check_api_key(provider),
        Operation::Extract => Ok(()),
    }
}

/// Check that the provider's API key variable is set.
fn check_api_key(provider: &ProviderSettings) -> Result<()> {
    let var = provider.api_key_env();
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(SegueError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(SegueError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}
