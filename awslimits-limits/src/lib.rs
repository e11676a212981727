//! Limit resolution and threshold evaluation for AWS service limits.
//!
//! A [`Limit`] holds every value known for one named quantity of an AWS service: the documented
//! default, a manual override, and the values reported by Trusted Advisor, the service's own API
//! and Service Quotas. [`Limit::get_limit`] resolves the effective value from these sources and
//! [`Limit::check_thresholds`] evaluates the recorded [`UsageSample`]s against warning and
//! critical thresholds.
//!
//! Limits are owned by the catalog of their [`Service`]; all services of a run are registered
//! explicitly in a [`ServiceRegistry`].

#![warn(missing_docs)]

mod error;
mod limit;
mod service;
mod usage;

pub use self::error::*;
pub use self::limit::*;
pub use self::service::*;
pub use self::usage::*;
