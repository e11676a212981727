/// Errors raised when building limits or looking them up in a catalog.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum LimitError {
    /// The critical threshold is not stricter than the warning threshold.
    #[error(
        "critical threshold ({critical}%) must be greater than warning threshold ({warning}%)"
    )]
    InvalidThresholds {
        /// The rejected warning percentage.
        warning: u32,
        /// The rejected critical percentage.
        critical: u32,
    },

    /// The service has no limit with the given name.
    #[error("unknown limit {limit:?} for service {service:?}")]
    UnknownLimit {
        /// Name of the service that was searched.
        service: String,
        /// The limit name that was not found.
        limit: String,
    },

    /// No service with the given name is registered.
    #[error("unknown service {0:?}")]
    UnknownService(String),
}
