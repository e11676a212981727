//! Trusted Advisor polling for AWS service limits.
//!
//! Trusted Advisor reports current limits for many services through a single check named
//! "Service Limits". The [`TrustedAdvisor`] poller discovers this check, optionally refreshes it
//! according to a [`TaRefreshMode`], parses the flagged resources of the check result and pushes
//! the reported values into the matching [`Limit`](awslimits_limits::Limit)s.
//!
//! Requests go through the [`SupportClient`] trait, which is implemented on top of the AWS
//! Support API by the caller.

#![warn(missing_docs)]

mod client;
mod clock;
mod config;
mod trusted_advisor;

pub use self::client::*;
pub use self::clock::*;
pub use self::config::*;
pub use self::trusted_advisor::*;
