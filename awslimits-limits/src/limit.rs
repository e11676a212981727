use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LimitError, LimitId, UsageSample};

/// The unit Service Quotas reports for plain counts.
pub const DEFAULT_QUOTAS_UNIT: &str = "None";

/// Converts a Service Quotas value from the unit reported by the API into the unit of a limit.
///
/// Receives the value, the unit reported by Service Quotas and the unit the limit expects.
/// Returns `None` if the conversion is not supported, in which case the quota is ignored.
pub type UnitConverter = fn(value: f64, from_unit: &str, to_unit: &str) -> Option<f64>;

/// The source that produced the effective value of a [`Limit`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitSource {
    /// A manual override set by the user.
    Override,
    /// The describe-limits API of the service itself.
    Api,
    /// The Trusted Advisor "Service Limits" check.
    Ta,
    /// The Service Quotas API.
    Quotas,
    /// The hard-coded default from the AWS documentation.
    Default,
}

impl LimitSource {
    /// Returns the canonical name of this source.
    pub fn name(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Api => "api",
            Self::Ta => "ta",
            Self::Quotas => "quotas",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for LimitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional warning or critical boundaries of a single severity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdLevel {
    /// Alarm when usage reaches this percentage of the limit.
    pub percent: Option<u32>,
    /// Alarm when usage reaches this absolute count.
    pub count: Option<u64>,
}

/// Per-limit overrides of the default thresholds.
///
/// Percentages that are not overridden fall back to the default thresholds of the limit. Counts
/// have no default and are only checked when set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdOverride {
    /// Warning boundaries.
    pub warning: ThresholdLevel,
    /// Critical boundaries.
    pub critical: ThresholdLevel,
}

/// The severity a usage sample crossed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Severity {
    /// The warning threshold was reached.
    Warning,
    /// The critical threshold was reached.
    Critical,
}

/// Thresholds of a limit after merging overrides with the defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Thresholds {
    /// Absolute warning count, if configured.
    pub warning_count: Option<u64>,
    /// Warning percentage.
    pub warning_percent: u32,
    /// Absolute critical count, if configured.
    pub critical_count: Option<u64>,
    /// Critical percentage.
    pub critical_percent: u32,
}

impl Thresholds {
    /// Evaluates a single usage value against a non-zero limit.
    ///
    /// Critical takes precedence: a value that crosses both critical and warning thresholds is
    /// reported as [`Severity::Critical`] only.
    pub fn evaluate(&self, value: f64, limit: f64) -> Option<Severity> {
        let percent = value / limit * 100.0;
        let crossed = |count: Option<u64>, threshold: u32| {
            count.is_some_and(|count| value >= count as f64) || percent >= f64::from(threshold)
        };

        if crossed(self.critical_count, self.critical_percent) {
            Some(Severity::Critical)
        } else if crossed(self.warning_count, self.warning_percent) {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

/// A named ceiling on a countable AWS resource, for instance "VPCs" of the VPC service.
///
/// The effective limit is resolved from several sources, highest precedence first:
///
///  1. The manual override, if it was set to win over Trusted Advisor or Trusted Advisor has no
///     value for this limit.
///  2. The limit reported by the service's own API.
///  3. The limit reported by Trusted Advisor, where "Unlimited" resolves to no limit at all.
///  4. The limit reported by Service Quotas.
///  5. The documented default.
///
/// See [`get_limit`](Self::get_limit) and [`get_limit_source`](Self::get_limit_source).
#[derive(Clone, Debug)]
pub struct Limit {
    id: LimitId,
    default_limit: f64,
    limit_override: Option<f64>,
    override_ta: bool,
    ta_limit: Option<f64>,
    ta_unlimited: bool,
    api_limit: Option<f64>,
    quotas_limit: Option<f64>,
    def_warning_threshold: u32,
    def_critical_threshold: u32,
    threshold_override: ThresholdOverride,
    limit_type: Option<String>,
    limit_subtype: Option<String>,
    ta_service_name: Option<String>,
    ta_limit_name: Option<String>,
    quotas_service_code: Option<String>,
    quotas_name: Option<String>,
    quotas_unit: String,
    quotas_unit_converter: Option<UnitConverter>,
    current_usage: Vec<UsageSample>,
    warnings: Vec<UsageSample>,
    criticals: Vec<UsageSample>,
}

impl Limit {
    /// Creates a new limit with its documented default and the default thresholds in percent.
    ///
    /// Fails with [`LimitError::InvalidThresholds`] unless the critical threshold is strictly
    /// greater than the warning threshold.
    pub fn new(
        name: &str,
        service: &str,
        default_limit: f64,
        warning_threshold: u32,
        critical_threshold: u32,
    ) -> Result<Self, LimitError> {
        if critical_threshold <= warning_threshold {
            return Err(LimitError::InvalidThresholds {
                warning: warning_threshold,
                critical: critical_threshold,
            });
        }

        Ok(Self {
            id: LimitId::new(service, name),
            default_limit,
            limit_override: None,
            override_ta: true,
            ta_limit: None,
            ta_unlimited: false,
            api_limit: None,
            quotas_limit: None,
            def_warning_threshold: warning_threshold,
            def_critical_threshold: critical_threshold,
            threshold_override: ThresholdOverride::default(),
            limit_type: None,
            limit_subtype: None,
            ta_service_name: None,
            ta_limit_name: None,
            quotas_service_code: None,
            quotas_name: None,
            quotas_unit: DEFAULT_QUOTAS_UNIT.to_owned(),
            quotas_unit_converter: None,
            current_usage: Vec::new(),
            warnings: Vec::new(),
            criticals: Vec::new(),
        })
    }

    /// Sets the AWS resource type this limit applies to, for instance `AWS::EC2::Instance`.
    pub fn with_limit_type(mut self, limit_type: impl Into<String>) -> Self {
        self.limit_type = Some(limit_type.into());
        self
    }

    /// Sets a subtype of the resource, for instance an instance type.
    pub fn with_limit_subtype(mut self, limit_subtype: impl Into<String>) -> Self {
        self.limit_subtype = Some(limit_subtype.into());
        self
    }

    /// Overrides the service name under which Trusted Advisor reports this limit.
    pub fn with_ta_service_name(mut self, name: impl Into<String>) -> Self {
        self.ta_service_name = Some(name.into());
        self
    }

    /// Overrides the limit name under which Trusted Advisor reports this limit.
    pub fn with_ta_limit_name(mut self, name: impl Into<String>) -> Self {
        self.ta_limit_name = Some(name.into());
        self
    }

    /// Sets the Service Quotas service code, for instance `ec2`.
    pub fn with_quotas_service_code(mut self, code: impl Into<String>) -> Self {
        self.quotas_service_code = Some(code.into());
        self
    }

    /// Overrides the quota name under which Service Quotas reports this limit.
    pub fn with_quotas_name(mut self, name: impl Into<String>) -> Self {
        self.quotas_name = Some(name.into());
        self
    }

    /// Sets the unit this limit is expressed in, compared against the unit of the quota.
    pub fn with_quotas_unit(mut self, unit: impl Into<String>) -> Self {
        self.quotas_unit = unit.into();
        self
    }

    /// Sets the converter applied when Service Quotas reports a different unit.
    pub fn with_quotas_unit_converter(mut self, converter: UnitConverter) -> Self {
        self.quotas_unit_converter = Some(converter);
        self
    }

    /// Falls back to the service code of the owning service.
    pub(crate) fn inherit_quotas_service_code(&mut self, code: &str) {
        if self.quotas_service_code.is_none() {
            self.quotas_service_code = Some(code.to_owned());
        }
    }

    /// Returns the identifier of this limit.
    pub fn id(&self) -> &LimitId {
        &self.id
    }

    /// Returns the name of this limit, unique within its service.
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Returns the name of the owning service.
    pub fn service_name(&self) -> &str {
        self.id.service()
    }

    /// The documented default limit.
    pub fn default_limit(&self) -> f64 {
        self.default_limit
    }

    /// The manual override, if any.
    pub fn limit_override(&self) -> Option<f64> {
        self.limit_override
    }

    /// Whether the manual override wins over a value from Trusted Advisor.
    pub fn override_ta(&self) -> bool {
        self.override_ta
    }

    /// The limit reported by Trusted Advisor, if any.
    pub fn ta_limit(&self) -> Option<f64> {
        self.ta_limit
    }

    /// Whether Trusted Advisor reported this limit as "Unlimited".
    pub fn ta_unlimited(&self) -> bool {
        self.ta_unlimited
    }

    /// The limit reported by the service's describe-limits API, if any.
    pub fn api_limit(&self) -> Option<f64> {
        self.api_limit
    }

    /// The limit reported by Service Quotas, if any.
    pub fn quotas_limit(&self) -> Option<f64> {
        self.quotas_limit
    }

    /// The AWS resource type, if known.
    pub fn limit_type(&self) -> Option<&str> {
        self.limit_type.as_deref()
    }

    /// The resource subtype, if known.
    pub fn limit_subtype(&self) -> Option<&str> {
        self.limit_subtype.as_deref()
    }

    /// The service name Trusted Advisor uses, defaulting to the owning service's name.
    pub fn ta_service_name(&self) -> &str {
        self.ta_service_name
            .as_deref()
            .unwrap_or_else(|| self.id.service())
    }

    /// The limit name Trusted Advisor uses, defaulting to this limit's name.
    pub fn ta_limit_name(&self) -> &str {
        self.ta_limit_name
            .as_deref()
            .unwrap_or_else(|| self.id.name())
    }

    /// The Service Quotas service code, if this limit is known to Service Quotas.
    pub fn quotas_service_code(&self) -> Option<&str> {
        self.quotas_service_code.as_deref()
    }

    /// The quota name Service Quotas uses, defaulting to this limit's name.
    pub fn quotas_name(&self) -> &str {
        self.quotas_name.as_deref().unwrap_or_else(|| self.id.name())
    }

    /// The unit this limit is expressed in.
    pub fn quotas_unit(&self) -> &str {
        &self.quotas_unit
    }

    /// The converter for Service Quotas values in a different unit.
    pub fn quotas_unit_converter(&self) -> Option<UnitConverter> {
        self.quotas_unit_converter
    }

    /// Sets a manual override for this limit.
    ///
    /// If `override_ta` is `true`, the override also wins over a value from Trusted Advisor.
    /// Otherwise, it only applies while Trusted Advisor has no data for this limit.
    pub fn set_limit_override(&mut self, value: f64, override_ta: bool) {
        self.limit_override = Some(value);
        self.override_ta = override_ta;
    }

    /// Records the limit value reported by Trusted Advisor.
    pub fn set_ta_limit(&mut self, value: f64) {
        self.ta_limit = Some(value);
    }

    /// Records that Trusted Advisor reports no limit for this quantity.
    pub fn set_ta_unlimited(&mut self) {
        self.ta_unlimited = true;
    }

    /// Records the limit value reported by the service's describe-limits API.
    pub fn set_api_limit(&mut self, value: f64) {
        self.api_limit = Some(value);
    }

    /// Records the limit value reported by Service Quotas.
    pub fn set_quotas_limit(&mut self, value: f64) {
        self.quotas_limit = Some(value);
    }

    /// Overrides the default thresholds of this limit.
    pub fn set_threshold_override(&mut self, threshold_override: ThresholdOverride) {
        self.threshold_override = threshold_override;
    }

    fn has_ta_data(&self) -> bool {
        self.ta_limit.is_some() || self.ta_unlimited
    }

    /// Resolves the source and value of the effective limit.
    ///
    /// Every source is probed in order of precedence and the first one that is present wins.
    /// A `None` value means the limit is unlimited.
    fn resolve(&self) -> (LimitSource, Option<f64>) {
        let ta_value = if self.ta_unlimited {
            None
        } else {
            self.ta_limit
        };

        let probes = [
            (
                self.limit_override.is_some() && (self.override_ta || !self.has_ta_data()),
                LimitSource::Override,
                self.limit_override,
            ),
            (self.api_limit.is_some(), LimitSource::Api, self.api_limit),
            (self.has_ta_data(), LimitSource::Ta, ta_value),
            (self.quotas_limit.is_some(), LimitSource::Quotas, self.quotas_limit),
        ];

        probes
            .into_iter()
            .find(|(present, _, _)| *present)
            .map(|(_, source, value)| (source, value))
            .unwrap_or((LimitSource::Default, Some(self.default_limit)))
    }

    /// Returns the effective limit, or `None` if the limit is unlimited.
    pub fn get_limit(&self) -> Option<f64> {
        self.resolve().1
    }

    /// Returns the source that produced the value of [`get_limit`](Self::get_limit).
    pub fn get_limit_source(&self) -> LimitSource {
        self.resolve().0
    }

    /// Returns the thresholds after merging overrides with the defaults.
    pub fn thresholds(&self) -> Thresholds {
        let ThresholdOverride { warning, critical } = self.threshold_override;

        Thresholds {
            warning_count: warning.count,
            warning_percent: warning.percent.unwrap_or(self.def_warning_threshold),
            critical_count: critical.count,
            critical_percent: critical.percent.unwrap_or(self.def_critical_threshold),
        }
    }

    /// Records a usage sample.
    ///
    /// Use `resource_id` to tell apart multiple resources sharing the limit, and `aws_type` to
    /// classify the resource.
    pub fn add_current_usage(
        &mut self,
        value: f64,
        resource_id: Option<&str>,
        aws_type: Option<&str>,
    ) {
        let sample = UsageSample::new(self.id.clone(), value, None, resource_id, aws_type);
        self.current_usage.push(sample);
    }

    /// Records a usage sample of a resource with its own maximum.
    ///
    /// During threshold evaluation, a non-zero `maximum` replaces the effective limit for this
    /// sample.
    pub fn add_current_usage_with_maximum(
        &mut self,
        value: f64,
        maximum: f64,
        resource_id: Option<&str>,
        aws_type: Option<&str>,
    ) {
        let sample =
            UsageSample::new(self.id.clone(), value, Some(maximum), resource_id, aws_type);
        self.current_usage.push(sample);
    }

    /// Removes all usage samples.
    pub fn reset_usage(&mut self) {
        self.current_usage.clear();
    }

    /// Returns all usage samples in the order they were recorded.
    pub fn get_current_usage(&self) -> &[UsageSample] {
        &self.current_usage
    }

    /// Returns the sample with the highest value.
    pub fn max_usage(&self) -> Option<&UsageSample> {
        self.current_usage
            .iter()
            .max_by(|a, b| a.value().total_cmp(&b.value()))
    }

    /// Formats the current usage for humans.
    ///
    /// Returns `<unknown>` without samples, and the sole sample if there is exactly one.
    /// Otherwise, the maximum is followed by all samples in ascending order.
    pub fn current_usage_display(&self) -> String {
        match self.current_usage.as_slice() {
            [] => "<unknown>".to_owned(),
            [sample] => sample.to_string(),
            samples => {
                let mut sorted: Vec<_> = samples.iter().collect();
                sorted.sort_by(|a, b| a.value().total_cmp(&b.value()));

                let all = sorted
                    .iter()
                    .map(|sample| sample.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                match sorted.last() {
                    Some(max) => format!("max: {max} ({all})"),
                    None => all,
                }
            }
        }
    }

    /// Checks all usage samples against the warning and critical thresholds.
    ///
    /// Samples are evaluated independently. A sample that crosses the critical threshold is only
    /// recorded in [`get_criticals`](Self::get_criticals), never in
    /// [`get_warnings`](Self::get_warnings). A sample with a non-zero maximum is checked against
    /// that maximum instead of [`get_limit`](Self::get_limit).
    ///
    /// An unlimited or zero limit, which Trusted Advisor uses to express an unbounded quantity,
    /// never raises alarms. No sample is inspected in that case, not even one with its own maximum.
    ///
    /// Returns `true` if no sample crossed any threshold.
    pub fn check_thresholds(&mut self) -> bool {
        self.warnings.clear();
        self.criticals.clear();

        let Some(limit) = self.get_limit().filter(|limit| *limit != 0.0) else {
            return true;
        };

        let thresholds = self.thresholds();

        for sample in &self.current_usage {
            let effective = sample.maximum().filter(|max| *max != 0.0).unwrap_or(limit);

            match thresholds.evaluate(sample.value(), effective) {
                Some(Severity::Critical) => self.criticals.push(sample.clone()),
                Some(Severity::Warning) => self.warnings.push(sample.clone()),
                None => (),
            }
        }

        !self.has_alarms()
    }

    /// Returns `true` if the last [`check_thresholds`](Self::check_thresholds) raised an alarm.
    pub fn has_alarms(&self) -> bool {
        !self.warnings.is_empty() || !self.criticals.is_empty()
    }

    /// Samples that crossed the warning threshold during the last check.
    pub fn get_warnings(&self) -> &[UsageSample] {
        &self.warnings
    }

    /// Samples that crossed the critical threshold during the last check.
    pub fn get_criticals(&self) -> &[UsageSample] {
        &self.criticals
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;

    use super::*;

    fn limit(default_limit: f64) -> Limit {
        Limit::new("VPCs", "VPC", default_limit, 80, 99).unwrap()
    }

    fn values(samples: &[UsageSample]) -> Vec<f64> {
        samples.iter().map(UsageSample::value).collect()
    }

    #[test]
    fn test_new_rejects_weak_critical_threshold() {
        assert_eq!(
            Limit::new("VPCs", "VPC", 5.0, 90, 80).unwrap_err(),
            LimitError::InvalidThresholds {
                warning: 90,
                critical: 80
            }
        );
    }

    #[test]
    fn test_new_rejects_equal_thresholds() {
        assert!(Limit::new("VPCs", "VPC", 5.0, 80, 80).is_err());
    }

    #[test]
    fn test_defaults() {
        let limit = limit(5.0);
        assert_eq!(limit.get_limit(), Some(5.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Default);
        assert_eq!(limit.ta_service_name(), "VPC");
        assert_eq!(limit.ta_limit_name(), "VPCs");
        assert_eq!(limit.quotas_name(), "VPCs");
        assert_eq!(limit.quotas_unit(), DEFAULT_QUOTAS_UNIT);
        assert!(limit.override_ta());
    }

    #[test]
    fn test_classification_overrides() {
        let limit = limit(5.0)
            .with_limit_type("AWS::EC2::VPC")
            .with_limit_subtype("default")
            .with_ta_service_name("VPC (TA)")
            .with_ta_limit_name("VPCs per region")
            .with_quotas_service_code("vpc")
            .with_quotas_name("VPCs per Region")
            .with_quotas_unit("Count");

        assert_eq!(limit.limit_type(), Some("AWS::EC2::VPC"));
        assert_eq!(limit.limit_subtype(), Some("default"));
        assert_eq!(limit.ta_service_name(), "VPC (TA)");
        assert_eq!(limit.ta_limit_name(), "VPCs per region");
        assert_eq!(limit.quotas_service_code(), Some("vpc"));
        assert_eq!(limit.quotas_name(), "VPCs per Region");
        assert_eq!(limit.quotas_unit(), "Count");
    }

    #[test]
    fn test_source_quotas_over_default() {
        let mut limit = limit(5.0);
        limit.set_quotas_limit(7.0);
        assert_eq!(limit.get_limit(), Some(7.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Quotas);
    }

    #[test]
    fn test_source_ta_over_quotas() {
        let mut limit = limit(5.0);
        limit.set_quotas_limit(7.0);
        limit.set_ta_limit(10.0);
        assert_eq!(limit.get_limit(), Some(10.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Ta);
    }

    #[test]
    fn test_source_api_over_ta() {
        let mut limit = limit(5.0);
        limit.set_ta_limit(10.0);
        limit.set_api_limit(12.0);
        limit.set_quotas_limit(7.0);
        assert_eq!(limit.get_limit(), Some(12.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Api);
    }

    #[test]
    fn test_source_override_wins_regardless_of_order() {
        let mut limit = limit(5.0);
        limit.set_limit_override(50.0, true);
        limit.set_api_limit(12.0);
        limit.set_ta_limit(10.0);
        limit.set_quotas_limit(7.0);
        assert_eq!(limit.get_limit(), Some(50.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Override);
    }

    #[test]
    fn test_override_without_ta_data() {
        let mut limit = limit(5.0);
        limit.set_limit_override(50.0, false);
        assert_eq!(limit.get_limit(), Some(50.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Override);
    }

    #[test]
    fn test_override_loses_to_ta_when_not_overriding_ta() {
        let mut limit = limit(5.0);
        limit.set_limit_override(50.0, false);
        limit.set_ta_limit(10.0);
        assert_eq!(limit.get_limit(), Some(10.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Ta);
    }

    #[test]
    fn test_override_loses_to_api_when_not_overriding_ta() {
        let mut limit = limit(5.0);
        limit.set_limit_override(50.0, false);
        limit.set_ta_unlimited();
        limit.set_api_limit(12.0);
        assert_eq!(limit.get_limit(), Some(12.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Api);
    }

    #[test]
    fn test_ta_unlimited() {
        let mut limit = limit(5.0);
        limit.set_quotas_limit(7.0);
        limit.set_ta_limit(10.0);
        limit.set_ta_unlimited();
        assert_eq!(limit.get_limit(), None);
        assert_eq!(limit.get_limit_source(), LimitSource::Ta);
    }

    #[test]
    fn test_ta_unlimited_below_override_and_api() {
        let mut limit = limit(5.0);
        limit.set_ta_unlimited();
        limit.set_api_limit(12.0);
        assert_eq!(limit.get_limit(), Some(12.0));

        let mut limit = self::limit(5.0);
        limit.set_ta_unlimited();
        limit.set_limit_override(3.0, true);
        assert_eq!(limit.get_limit(), Some(3.0));
    }

    #[test]
    fn test_zero_is_reported_as_limit() {
        let mut limit = limit(5.0);
        limit.set_ta_limit(0.0);
        assert_eq!(limit.get_limit(), Some(0.0));
        assert_eq!(limit.get_limit_source(), LimitSource::Ta);
    }

    #[test]
    fn test_thresholds_default() {
        assert_debug_snapshot!(limit(5.0).thresholds(), @r###"
        Thresholds {
            warning_count: None,
            warning_percent: 80,
            critical_count: None,
            critical_percent: 99,
        }
        "###);
    }

    #[test]
    fn test_thresholds_partial_override() {
        let mut limit = limit(5.0);
        limit.set_threshold_override(ThresholdOverride {
            warning: ThresholdLevel {
                percent: None,
                count: Some(3),
            },
            critical: ThresholdLevel {
                percent: Some(95),
                count: None,
            },
        });

        assert_debug_snapshot!(limit.thresholds(), @r###"
        Thresholds {
            warning_count: Some(
                3,
            ),
            warning_percent: 80,
            critical_count: None,
            critical_percent: 95,
        }
        "###);
    }

    #[test]
    fn test_check_thresholds_without_usage() {
        let mut limit = limit(100.0);
        assert!(limit.check_thresholds());
        assert!(limit.get_warnings().is_empty());
        assert!(limit.get_criticals().is_empty());
    }

    #[test]
    fn test_check_thresholds_ok() {
        let mut limit = limit(100.0);
        limit.add_current_usage(79.0, None, None);
        assert!(limit.check_thresholds());
    }

    #[test]
    fn test_check_thresholds_warning() {
        let mut limit = limit(100.0);
        limit.add_current_usage(85.0, None, None);

        assert!(!limit.check_thresholds());
        assert_eq!(values(limit.get_warnings()), [85.0]);
        assert!(limit.get_criticals().is_empty());
    }

    #[test]
    fn test_check_thresholds_critical_supersedes_warning() {
        let mut limit = limit(100.0);
        limit.add_current_usage(99.0, None, None);

        assert!(!limit.check_thresholds());
        assert!(limit.get_warnings().is_empty());
        assert_eq!(values(limit.get_criticals()), [99.0]);
    }

    #[test]
    fn test_check_thresholds_mixed_samples() {
        let mut limit = limit(10.0);
        limit.add_current_usage(10.0, Some("sg-1"), None);
        limit.add_current_usage(2.0, Some("sg-2"), None);
        limit.add_current_usage(8.0, Some("sg-3"), None);
        limit.add_current_usage(12.0, Some("sg-4"), None);

        assert!(!limit.check_thresholds());
        assert_eq!(values(limit.get_warnings()), [8.0]);
        assert_eq!(values(limit.get_criticals()), [10.0, 12.0]);
        assert_eq!(limit.get_criticals()[1].resource_id(), Some("sg-4"));
    }

    #[test]
    fn test_check_thresholds_counts() {
        let mut limit = limit(100.0);
        limit.set_threshold_override(ThresholdOverride {
            warning: ThresholdLevel {
                percent: None,
                count: Some(10),
            },
            critical: ThresholdLevel {
                percent: None,
                count: Some(20),
            },
        });
        limit.add_current_usage(5.0, None, None);
        limit.add_current_usage(10.0, None, None);
        limit.add_current_usage(20.0, None, None);

        assert!(!limit.check_thresholds());
        assert_eq!(values(limit.get_warnings()), [10.0]);
        assert_eq!(values(limit.get_criticals()), [20.0]);
    }

    #[test]
    fn test_check_thresholds_unlimited() {
        let mut limit = limit(10.0);
        limit.set_ta_unlimited();
        limit.add_current_usage(1000.0, None, None);
        assert!(limit.check_thresholds());
    }

    #[test]
    fn test_check_thresholds_zero_limit() {
        let mut limit = limit(10.0);
        limit.set_ta_limit(0.0);
        limit.add_current_usage(1000.0, None, None);
        assert!(limit.check_thresholds());
        assert_eq!(limit.get_limit(), Some(0.0));
    }

    #[test]
    fn test_check_thresholds_unlimited_ignores_sample_maximum() {
        let mut limit = limit(10.0);
        limit.set_ta_unlimited();
        limit.add_current_usage_with_maximum(49.0, 50.0, Some("sg-1"), None);

        assert!(limit.check_thresholds());
        assert!(limit.get_warnings().is_empty());
        assert!(limit.get_criticals().is_empty());
    }

    #[test]
    fn test_check_thresholds_zero_limit_ignores_sample_maximum() {
        let mut limit = limit(10.0);
        limit.set_ta_limit(0.0);
        limit.add_current_usage_with_maximum(49.0, 50.0, Some("sg-1"), None);

        assert!(limit.check_thresholds());
        assert!(limit.get_warnings().is_empty());
        assert!(limit.get_criticals().is_empty());
    }

    #[test]
    fn test_check_thresholds_clears_alarms_when_unlimited() {
        let mut limit = limit(50.0);
        limit.add_current_usage_with_maximum(49.0, 50.0, Some("sg-1"), None);
        assert!(!limit.check_thresholds());

        limit.set_ta_unlimited();
        assert!(limit.check_thresholds());
        assert!(!limit.has_alarms());
    }

    #[test]
    fn test_check_thresholds_sample_maximum() {
        let mut limit = limit(100.0);
        limit.add_current_usage_with_maximum(45.0, 50.0, Some("sg-1"), None);
        limit.add_current_usage_with_maximum(45.0, 0.0, Some("sg-2"), None);

        assert!(!limit.check_thresholds());
        assert_eq!(limit.get_warnings()[0].resource_id(), Some("sg-1"));
        assert!(limit.get_criticals().is_empty());
    }

    #[test]
    fn test_check_thresholds_is_repeatable() {
        let mut limit = limit(100.0);
        limit.add_current_usage(85.0, None, None);
        assert!(!limit.check_thresholds());
        assert!(!limit.check_thresholds());
        assert_eq!(limit.get_warnings().len(), 1);

        limit.reset_usage();
        assert!(limit.check_thresholds());
        assert!(!limit.has_alarms());
    }

    #[test]
    fn test_reset_usage() {
        let mut limit = limit(100.0);
        limit.add_current_usage(1.0, None, None);
        limit.add_current_usage(2.0, None, None);
        limit.reset_usage();
        assert!(limit.get_current_usage().is_empty());
    }

    #[test]
    fn test_add_current_usage_keeps_insertion_order() {
        let mut limit = limit(100.0);
        limit.add_current_usage(3.0, Some("c"), Some("AWS::EC2::SecurityGroup"));
        limit.add_current_usage(1.0, Some("a"), None);

        let usage = limit.get_current_usage();
        assert_eq!(values(usage), [3.0, 1.0]);
        assert_eq!(usage[0].aws_type(), Some("AWS::EC2::SecurityGroup"));
        assert_eq!(usage[0].limit(), limit.id());
        assert_eq!(limit.max_usage().map(UsageSample::value), Some(3.0));
    }

    #[test]
    fn test_current_usage_display() {
        let mut limit = limit(100.0);
        assert_eq!(limit.current_usage_display(), "<unknown>");

        limit.add_current_usage(4.0, Some("sg-b"), None);
        assert_eq!(limit.current_usage_display(), "sg-b=4");

        limit.add_current_usage(7.0, Some("sg-c"), None);
        limit.add_current_usage(1.0, Some("sg-a"), None);
        assert_eq!(
            limit.current_usage_display(),
            "max: sg-c=7 (sg-a=1, sg-b=4, sg-c=7)"
        );
    }

    #[test]
    fn test_limit_source_serde() {
        assert_eq!(serde_json::to_string(&LimitSource::Ta).unwrap(), r#""ta""#);
        assert_eq!(LimitSource::Quotas.to_string(), "quotas");
    }

    #[test]
    fn test_threshold_override_deserialize() {
        let value = serde_json::json!({"warning": {"count": 4}, "critical": {"percent": 95}});
        let threshold_override: ThresholdOverride = serde_json::from_value(value).unwrap();
        assert_eq!(threshold_override.warning.count, Some(4));
        assert_eq!(threshold_override.warning.percent, None);
        assert_eq!(threshold_override.critical.percent, Some(95));
    }
}
