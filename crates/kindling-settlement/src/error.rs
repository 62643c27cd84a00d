//! Error types for the `kindling-settlement` crate.

/// Errors that can occur when validating settlement configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// A configuration value is out of its allowed range.
    #[error("invalid settlement configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl SettlementError {
    pub(crate) fn invalid(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_owned(),
        }
    }
}
