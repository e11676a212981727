//! Overrides of individual configuration values from the environment.

use std::env;

/// Environment variable overriding the target region.
pub const REGION_ENV: &str = "AWSLIMITS_REGION";
/// Environment variable overriding the Trusted Advisor refresh mode.
pub const TA_REFRESH_MODE_ENV: &str = "AWSLIMITS_TA_REFRESH_MODE";
/// Environment variable overriding the Trusted Advisor refresh timeout in seconds.
pub const TA_REFRESH_TIMEOUT_ENV: &str = "AWSLIMITS_TA_REFRESH_TIMEOUT";
/// Environment variable overriding the default warning threshold.
pub const WARNING_THRESHOLD_ENV: &str = "AWSLIMITS_WARNING_THRESHOLD";
/// Environment variable overriding the default critical threshold.
pub const CRITICAL_THRESHOLD_ENV: &str = "AWSLIMITS_CRITICAL_THRESHOLD";

/// Unparsed overrides of configuration values.
///
/// Values are parsed and validated by [`Config::apply_override`](crate::Config::apply_override).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OverridableConfig {
    /// The target region for Trusted Advisor results.
    pub region: Option<String>,
    /// The Trusted Advisor refresh mode: seconds, `trigger`, `wait`, or empty to disable refreshes.
    pub ta_refresh_mode: Option<String>,
    /// The Trusted Advisor refresh timeout in seconds, or empty to wait indefinitely.
    pub ta_refresh_timeout: Option<String>,
    /// The default warning threshold in percent.
    pub warning_threshold: Option<String>,
    /// The default critical threshold in percent.
    pub critical_threshold: Option<String>,
}

impl OverridableConfig {
    /// Reads overrides from the `AWSLIMITS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            region: lookup(REGION_ENV),
            ta_refresh_mode: lookup(TA_REFRESH_MODE_ENV),
            ta_refresh_timeout: lookup(TA_REFRESH_TIMEOUT_ENV),
            warning_threshold: lookup(WARNING_THRESHOLD_ENV),
            critical_threshold: lookup(CRITICAL_THRESHOLD_ENV),
        }
    }

    /// Returns `true` if no value is overridden.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_from_lookup() {
        let vars = BTreeMap::from([
            (REGION_ENV, "eu-west-1"),
            (TA_REFRESH_MODE_ENV, "wait"),
            (CRITICAL_THRESHOLD_ENV, "95"),
        ]);

        let overrides =
            OverridableConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned()));

        assert_eq!(
            overrides,
            OverridableConfig {
                region: Some("eu-west-1".to_owned()),
                ta_refresh_mode: Some("wait".to_owned()),
                ta_refresh_timeout: None,
                warning_threshold: None,
                critical_threshold: Some("95".to_owned()),
            }
        );
        assert!(!overrides.is_empty());
        assert!(OverridableConfig::from_lookup(|_| None).is_empty());
    }

    #[test]
    fn test_from_env() {
        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe { env::set_var(TA_REFRESH_TIMEOUT_ENV, "300") };
        let overrides = OverridableConfig::from_env();
        // SAFETY: see above.
        unsafe { env::remove_var(TA_REFRESH_TIMEOUT_ENV) };

        assert_eq!(overrides.ta_refresh_timeout.as_deref(), Some("300"));
    }
}
