use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error parsing a [`TaRefreshMode`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error(r#"invalid refresh mode {0:?}: expected a number of seconds, "trigger" or "wait""#)]
pub struct ParseRefreshModeError(String);

/// Controls whether the "Service Limits" check is refreshed before its result is read.
///
/// The absence of a refresh mode means that the check is never refreshed, and the result
/// currently cached by AWS is used as-is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(try_from = "RefreshModeRepr", into = "RefreshModeRepr")]
pub enum TaRefreshMode {
    /// Refresh and wait for completion if the cached result is older than the given seconds.
    Older(u64),
    /// Request a refresh without waiting for it, and read the cached result right away.
    ///
    /// This keeps the current run fast and warms the cache for the next run.
    Trigger,
    /// Always refresh and wait for completion.
    Wait,
}

impl FromStr for TaRefreshMode {
    type Err = ParseRefreshModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trigger" => Ok(Self::Trigger),
            "wait" => Ok(Self::Wait),
            other => other
                .parse()
                .map(Self::Older)
                .map_err(|_| ParseRefreshModeError(other.to_owned())),
        }
    }
}

impl fmt::Display for TaRefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Older(seconds) => write!(f, "{seconds}"),
            Self::Trigger => f.write_str("trigger"),
            Self::Wait => f.write_str("wait"),
        }
    }
}

/// Serialized form of [`TaRefreshMode`]: a number of seconds or a mode name.
#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum RefreshModeRepr {
    Seconds(u64),
    Named(String),
}

impl TryFrom<RefreshModeRepr> for TaRefreshMode {
    type Error = ParseRefreshModeError;

    fn try_from(value: RefreshModeRepr) -> Result<Self, Self::Error> {
        match value {
            RefreshModeRepr::Seconds(seconds) => Ok(Self::Older(seconds)),
            RefreshModeRepr::Named(name) => name.parse(),
        }
    }
}

impl From<TaRefreshMode> for RefreshModeRepr {
    fn from(value: TaRefreshMode) -> Self {
        match value {
            TaRefreshMode::Older(seconds) => Self::Seconds(seconds),
            named => Self::Named(named.to_string()),
        }
    }
}

/// Options of the [`TrustedAdvisor`](crate::TrustedAdvisor) poller.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TrustedAdvisorConfig {
    /// Only rows of this region are used. Defaults to the region of the support client.
    pub region: Option<String>,
    /// Refresh behavior of the "Service Limits" check. `None` never refreshes.
    pub refresh_mode: Option<TaRefreshMode>,
    /// Maximum time to wait for a refresh to complete. `None` waits without a practical bound.
    pub refresh_timeout: Option<Duration>,
}
