//! Service Quotas ingestion for AWS service limits.
//!
//! Service Quotas reports the current applied value of many AWS limits per account. The
//! [`ServiceQuotasClient`] lists the quotas of each service once, caches them by service code, and
//! pushes the values into the matching [`Limit`](awslimits_limits::Limit)s with
//! [`set_quotas_limit`](awslimits_limits::Limit::set_quotas_limit).
//!
//! Quotas are matched by the limit's [`quotas_name`](awslimits_limits::Limit::quotas_name),
//! ignoring case. Values reported in a different unit than the limit expects are converted with the
//! limit's unit converter, or ignored if the limit has none.

#![warn(missing_docs)]

mod api;
mod client;

pub use self::api::*;
pub use self::client::*;
