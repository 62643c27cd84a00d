//! Error types for the `kindling-world` crate.
//!
//! Simulation operations in this crate never fail; they clamp. The only
//! fallible step is validating configuration before a game starts.

/// Errors that can occur when validating world configuration.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A configuration value is out of its allowed range.
    #[error("invalid world configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}
