//! Checks AWS usage against service limits and reports threshold alarms.
//!
//! The [`LimitChecker`] drives a single run over a [`ServiceRegistry`](awslimits_limits::ServiceRegistry):
//!
//!  1. [`find_usage`](LimitChecker::find_usage) asks the registered [`UsageCollector`]s to record
//!     current usage on the limits of their service.
//!  2. [`update_limits`](LimitChecker::update_limits) refreshes limit values from the services'
//!     own APIs, Trusted Advisor and Service Quotas.
//!  3. [`check_thresholds`](LimitChecker::check_thresholds) evaluates usage against the warning and
//!     critical thresholds of every limit and returns the limits in alarm.
//!
//! All steps run sequentially on the calling thread.

#![warn(missing_docs)]

mod checker;
mod collector;
mod error;

pub use self::checker::*;
pub use self::collector::*;
pub use self::error::*;
