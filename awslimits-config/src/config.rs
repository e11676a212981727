use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use awslimits_limits::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD, LimitError, ThresholdOverride,
};
use awslimits_log::LogConfig;
use awslimits_trustedadvisor::{TaRefreshMode, TrustedAdvisorConfig};
use serde::{Deserialize, Serialize};

use crate::OverridableConfig;

/// Defines the source of a config error.
#[derive(Debug)]
enum ConfigErrorSource {
    /// An error occurring independently.
    None,
    /// An error originating from a configuration file.
    File(PathBuf),
    /// An error originating in a field override (an env var or a caller supplied value).
    FieldOverride(String),
}

/// Indicates config related errors.
#[derive(Debug)]
pub struct ConfigError {
    source: ConfigErrorSource,
    kind: ConfigErrorKind,
    inner: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ConfigError {
    #[inline]
    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            source: ConfigErrorSource::None,
            kind,
            inner: None,
        }
    }

    #[inline]
    fn wrap<E>(inner: E, kind: ConfigErrorKind) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner: Some(Box::new(inner)),
            ..Self::new(kind)
        }
    }

    #[inline]
    fn for_field<E>(inner: E, field: &'static str) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::wrap(inner, ConfigErrorKind::InvalidValue).field(field)
    }

    #[inline]
    fn file<P: AsRef<Path>>(mut self, p: P) -> Self {
        self.source = ConfigErrorSource::File(p.as_ref().to_path_buf());
        self
    }

    #[inline]
    fn field(mut self, name: &'static str) -> Self {
        self.source = ConfigErrorSource::FieldOverride(name.to_owned());
        self
    }

    /// Returns the error kind of the error.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ConfigErrorSource::None => self.kind.fmt(f),
            ConfigErrorSource::File(file_name) => {
                write!(f, "{} (file {})", self.kind, file_name.display())
            }
            ConfigErrorSource::FieldOverride(name) => write!(f, "{} (field {})", self.kind, name),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Indicates config related errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum ConfigErrorKind {
    /// Failed to open the file.
    #[error("could not open config file")]
    CouldNotOpenFile,
    /// Parsing YAML failed.
    #[error("could not parse yaml config file")]
    BadYaml,
    /// Invalid config value.
    #[error("invalid config value")]
    InvalidValue,
}

/// Trusted Advisor settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
struct TrustedAdvisor {
    enabled: bool,
    refresh_mode: Option<TaRefreshMode>,
    /// Seconds.
    refresh_timeout: Option<u64>,
}

impl Default for TrustedAdvisor {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_mode: None,
            refresh_timeout: None,
        }
    }
}

/// Service Quotas settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
struct ServiceQuotas {
    enabled: bool,
}

impl Default for ServiceQuotas {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Manual limit values: service name to limit name to value.
pub type LimitOverrides = BTreeMap<String, BTreeMap<String, f64>>;

/// Threshold overrides: service name to limit name to thresholds.
pub type ThresholdOverrides = BTreeMap<String, BTreeMap<String, ThresholdOverride>>;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
struct ConfigValues {
    logging: LogConfig,
    region: Option<String>,
    warning_threshold: u32,
    critical_threshold: u32,
    trusted_advisor: TrustedAdvisor,
    service_quotas: ServiceQuotas,
    limit_overrides: LimitOverrides,
    override_ta: bool,
    threshold_overrides: ThresholdOverrides,
}

impl Default for ConfigValues {
    fn default() -> Self {
        Self {
            logging: LogConfig::default(),
            region: None,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            trusted_advisor: TrustedAdvisor::default(),
            service_quotas: ServiceQuotas::default(),
            limit_overrides: LimitOverrides::new(),
            override_ta: true,
            threshold_overrides: ThresholdOverrides::new(),
        }
    }
}

impl ConfigValues {
    fn validate(&self) -> Result<(), ConfigError> {
        let warning = self.warning_threshold;
        let critical = self.critical_threshold;

        if critical <= warning || critical > 100 {
            let error = LimitError::InvalidThresholds { warning, critical };
            return Err(ConfigError::for_field(error, "critical_threshold"));
        }

        Ok(())
    }
}

/// Config struct.
#[derive(Clone, Debug, Default)]
pub struct Config {
    values: ConfigValues,
    path: Option<PathBuf>,
}

impl Config {
    /// Loads the config from a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotOpenFile).file(path))?;
        let values: ConfigValues = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml).file(path))?;

        let config = Self {
            values,
            path: Some(path.to_path_buf()),
        };
        config.values.validate().map_err(|e| e.file(path))?;

        Ok(config)
    }

    /// Parses the config from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let values = serde_yaml::from_str(s)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml))?;

        let config = Self { values, path: None };
        config.values.validate()?;

        Ok(config)
    }

    /// Override configuration with values coming from other sources (e.g. env variables).
    ///
    /// The config is left unchanged if any value fails to parse or the resulting thresholds are
    /// invalid.
    pub fn apply_override(
        &mut self,
        overrides: OverridableConfig,
    ) -> Result<&mut Self, ConfigError> {
        let mut values = self.values.clone();

        if let Some(region) = overrides.region {
            values.region = Some(region).filter(|r| !r.is_empty());
        }

        let trusted_advisor = &mut values.trusted_advisor;
        if let Some(mode) = overrides.ta_refresh_mode {
            trusted_advisor.refresh_mode = match mode.as_str() {
                "" => None,
                mode => Some(
                    mode.parse()
                        .map_err(|err| ConfigError::for_field(err, "ta_refresh_mode"))?,
                ),
            };
        }

        if let Some(timeout) = overrides.ta_refresh_timeout {
            trusted_advisor.refresh_timeout = match timeout.as_str() {
                "" => None,
                timeout => Some(
                    timeout
                        .parse()
                        .map_err(|err| ConfigError::for_field(err, "ta_refresh_timeout"))?,
                ),
            };
        }

        if let Some(warning) = overrides.warning_threshold {
            values.warning_threshold = warning
                .parse()
                .map_err(|err| ConfigError::for_field(err, "warning_threshold"))?;
        }

        if let Some(critical) = overrides.critical_threshold {
            values.critical_threshold = critical
                .parse()
                .map_err(|err| ConfigError::for_field(err, "critical_threshold"))?;
        }

        values.validate()?;
        self.values = values;
        Ok(self)
    }

    /// The path of the config file, if the config was loaded from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the logging configuration.
    pub fn logging(&self) -> &LogConfig {
        &self.values.logging
    }

    /// The region to report Trusted Advisor results for.
    ///
    /// Defaults to the region of the support client.
    pub fn region(&self) -> Option<&str> {
        self.values.region.as_deref()
    }

    /// The default warning threshold in percent.
    pub fn warning_threshold(&self) -> u32 {
        self.values.warning_threshold
    }

    /// The default critical threshold in percent.
    pub fn critical_threshold(&self) -> u32 {
        self.values.critical_threshold
    }

    /// Returns `true` if limits are updated from Trusted Advisor.
    pub fn trusted_advisor_enabled(&self) -> bool {
        self.values.trusted_advisor.enabled
    }

    /// The refresh mode of the "Service Limits" check, `None` to never refresh.
    pub fn ta_refresh_mode(&self) -> Option<TaRefreshMode> {
        self.values.trusted_advisor.refresh_mode
    }

    /// The maximum time to wait for a check refresh, `None` to wait indefinitely.
    pub fn ta_refresh_timeout(&self) -> Option<Duration> {
        self.values
            .trusted_advisor
            .refresh_timeout
            .map(Duration::from_secs)
    }

    /// Returns the settings for the Trusted Advisor poller.
    pub fn trusted_advisor_config(&self) -> TrustedAdvisorConfig {
        TrustedAdvisorConfig {
            region: self.values.region.clone(),
            refresh_mode: self.ta_refresh_mode(),
            refresh_timeout: self.ta_refresh_timeout(),
        }
    }

    /// Returns `true` if limits are updated from Service Quotas.
    pub fn service_quotas_enabled(&self) -> bool {
        self.values.service_quotas.enabled
    }

    /// Manual limit values by service and limit name.
    pub fn limit_overrides(&self) -> &LimitOverrides {
        &self.values.limit_overrides
    }

    /// Whether [`limit_overrides`](Self::limit_overrides) take precedence over Trusted Advisor.
    pub fn override_ta(&self) -> bool {
        self.values.override_ta
    }

    /// Threshold overrides by service and limit name.
    pub fn threshold_overrides(&self) -> &ThresholdOverrides {
        &self.values.threshold_overrides
    }
}
