use awslimits_config::ConfigError;
use awslimits_limits::LimitError;
use awslimits_quotas::QuotasError;
use awslimits_trustedadvisor::TrustedAdvisorError;

use crate::BoxError;

/// Errors that abort a limit check.
///
/// Degraded data sources do not cause errors. They are logged and the affected limits fall back to
/// the best value available.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// A service or limit name was not found.
    #[error(transparent)]
    Limit(#[from] LimitError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The usage collector of a service failed.
    #[error("failed to collect usage for service {service}")]
    Usage {
        /// Name of the service.
        service: String,
        /// The error raised by the collector.
        #[source]
        source: BoxError,
    },

    /// Reading limits from the own API of a service failed.
    #[error("failed to read api limits for service {service}")]
    ApiLimits {
        /// Name of the service.
        service: String,
        /// The error raised by the collector.
        #[source]
        source: BoxError,
    },

    /// Polling Trusted Advisor failed.
    #[error("failed to update limits from trusted advisor")]
    TrustedAdvisor(#[source] TrustedAdvisorError),

    /// Listing Service Quotas failed.
    #[error("failed to update limits from service quotas")]
    Quotas(#[source] QuotasError),
}
