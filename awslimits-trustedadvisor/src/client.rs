use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The error code AWS returns when the account has no Business or Enterprise support plan.
pub const SUBSCRIPTION_REQUIRED: &str = "SubscriptionRequiredException";

/// An error returned by the AWS Support API.
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    /// The service rejected the request with an error code.
    #[error("{code}: {message}")]
    Service {
        /// The AWS error code, for instance `SubscriptionRequiredException`.
        code: String,
        /// The error message returned by AWS.
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("failed to send request to the support api")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
}

impl SupportError {
    /// Creates an error from an AWS error code and message.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the AWS error code, if the service returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            Self::Transport(_) => None,
        }
    }

    /// Returns `true` if the account does not have a Trusted Advisor subscription.
    pub fn is_subscription_required(&self) -> bool {
        self.code() == Some(SUBSCRIPTION_REQUIRED)
    }
}

/// Response of `DescribeTrustedAdvisorChecks`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeChecksResponse {
    /// All checks available to the account.
    pub checks: Vec<CheckDescription>,
}

/// Description of a single Trusted Advisor check.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDescription {
    /// The unique identifier of the check.
    pub id: String,
    /// The display name of the check.
    pub name: String,
    /// The category of the check, for instance `performance`.
    pub category: String,
    /// Column names of the metadata of flagged resources, in positional order.
    #[serde(default)]
    pub metadata: Vec<String>,
}

/// Response of `DescribeTrustedAdvisorCheckResult`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeCheckResultResponse {
    /// The result of the check.
    pub result: CheckResult,
}

/// The cached result of a Trusted Advisor check.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// The unique identifier of the check.
    #[serde(default)]
    pub check_id: String,
    /// ISO 8601 time of the last refresh of the check.
    pub timestamp: String,
    /// The alert status of the check, or `not_available`.
    #[serde(default)]
    pub status: String,
    /// Resources reported by the check. Missing if the check has no data.
    #[serde(default)]
    pub flagged_resources: Option<Vec<FlaggedResource>>,
}

/// A row of a Trusted Advisor check result.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedResource {
    /// The AWS region of the resource, missing for global resources.
    #[serde(default)]
    pub region: Option<String>,
    /// The status of the row.
    #[serde(default)]
    pub status: Option<String>,
    /// Column values, matching [`CheckDescription::metadata`] by position.
    #[serde(default)]
    pub metadata: Vec<Option<String>>,
}

/// The refresh state of a Trusted Advisor check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    /// No refresh is in progress.
    None,
    /// A refresh was requested and is waiting to be processed.
    Enqueued,
    /// The refresh is in progress.
    Processing,
    /// The refresh completed.
    Success,
    /// The refresh was abandoned by AWS.
    Abandoned,
    /// A status this crate does not know.
    #[serde(other)]
    Unknown,
}

impl RefreshStatus {
    /// Returns the name of the status as reported by AWS.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Abandoned => "abandoned",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` once the refresh has completed or was abandoned.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Success | Self::Abandoned)
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The refresh status of a single check.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRefreshStatus {
    /// The unique identifier of the check.
    pub check_id: String,
    /// The refresh state.
    pub status: RefreshStatus,
    /// Milliseconds until the check can be refreshed again.
    pub millis_until_next_refreshable: i64,
}

/// Response of `DescribeTrustedAdvisorCheckRefreshStatuses`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRefreshStatusesResponse {
    /// Refresh statuses for the requested checks.
    pub statuses: Vec<CheckRefreshStatus>,
}

/// Response of `RefreshTrustedAdvisorCheck`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCheckResponse {
    /// The refresh status right after the request.
    pub status: CheckRefreshStatus,
}

/// Access to the Trusted Advisor operations of the AWS Support API.
///
/// The poller issues requests one at a time and blocks on each of them.
pub trait SupportClient {
    /// The region the client is connected to, used when no target region is configured.
    fn region(&self) -> Option<&str> {
        None
    }

    /// Lists all Trusted Advisor checks.
    fn describe_trusted_advisor_checks(
        &self,
        language: &str,
    ) -> Result<DescribeChecksResponse, SupportError>;

    /// Returns the cached result of a check.
    fn describe_trusted_advisor_check_result(
        &self,
        check_id: &str,
        language: &str,
    ) -> Result<DescribeCheckResultResponse, SupportError>;

    /// Returns the refresh status of the given checks.
    fn describe_trusted_advisor_check_refresh_statuses(
        &self,
        check_ids: &[&str],
    ) -> Result<DescribeRefreshStatusesResponse, SupportError>;

    /// Requests a refresh of a check.
    fn refresh_trusted_advisor_check(
        &self,
        check_id: &str,
    ) -> Result<RefreshCheckResponse, SupportError>;
}

impl<T: SupportClient + ?Sized> SupportClient for &T {
    fn region(&self) -> Option<&str> {
        (**self).region()
    }

    fn describe_trusted_advisor_checks(
        &self,
        language: &str,
    ) -> Result<DescribeChecksResponse, SupportError> {
        (**self).describe_trusted_advisor_checks(language)
    }

    fn describe_trusted_advisor_check_result(
        &self,
        check_id: &str,
        language: &str,
    ) -> Result<DescribeCheckResultResponse, SupportError> {
        (**self).describe_trusted_advisor_check_result(check_id, language)
    }

    fn describe_trusted_advisor_check_refresh_statuses(
        &self,
        check_ids: &[&str],
    ) -> Result<DescribeRefreshStatusesResponse, SupportError> {
        (**self).describe_trusted_advisor_check_refresh_statuses(check_ids)
    }

    fn refresh_trusted_advisor_check(
        &self,
        check_id: &str,
    ) -> Result<RefreshCheckResponse, SupportError> {
        (**self).refresh_trusted_advisor_check(check_id)
    }
}

impl<T: SupportClient + ?Sized> SupportClient for Box<T> {
    fn region(&self) -> Option<&str> {
        (**self).region()
    }

    fn describe_trusted_advisor_checks(
        &self,
        language: &str,
    ) -> Result<DescribeChecksResponse, SupportError> {
        (**self).describe_trusted_advisor_checks(language)
    }

    fn describe_trusted_advisor_check_result(
        &self,
        check_id: &str,
        language: &str,
    ) -> Result<DescribeCheckResultResponse, SupportError> {
        (**self).describe_trusted_advisor_check_result(check_id, language)
    }

    fn describe_trusted_advisor_check_refresh_statuses(
        &self,
        check_ids: &[&str],
    ) -> Result<DescribeRefreshStatusesResponse, SupportError> {
        (**self).describe_trusted_advisor_check_refresh_statuses(check_ids)
    }

    fn refresh_trusted_advisor_check(
        &self,
        check_id: &str,
    ) -> Result<RefreshCheckResponse, SupportError> {
        (**self).refresh_trusted_advisor_check(check_id)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_subscription_required() {
        let error = SupportError::service(SUBSCRIPTION_REQUIRED, "AWS Premium Support required");
        assert!(error.is_subscription_required());
        assert_eq!(
            error.to_string(),
            "SubscriptionRequiredException: AWS Premium Support required"
        );

        let error = SupportError::service("AccessDeniedException", "denied");
        assert!(!error.is_subscription_required());

        let error = SupportError::Transport("connection reset".into());
        assert_eq!(error.code(), None);
    }

    #[test]
    fn test_parse_check_result() {
        let response: DescribeCheckResultResponse = serde_json::from_value(json!({
            "result": {
                "checkId": "eW7HH0l7J9",
                "timestamp": "2026-10-14T12:00:00Z",
                "status": "warning",
                "flaggedResources": [
                    {
                        "region": "us-east-1",
                        "status": "ok",
                        "resourceId": "abc",
                        "metadata": ["us-east-1", "VPC", "VPCs", "5", "1", "Green"]
                    },
                    {
                        "metadata": [null, "IAM", "Roles", "1000", "10", "Green"]
                    }
                ]
            }
        }))
        .unwrap();

        assert_debug_snapshot!(response.result.flagged_resources, @r###"
        Some(
            [
                FlaggedResource {
                    region: Some(
                        "us-east-1",
                    ),
                    status: Some(
                        "ok",
                    ),
                    metadata: [
                        Some(
                            "us-east-1",
                        ),
                        Some(
                            "VPC",
                        ),
                        Some(
                            "VPCs",
                        ),
                        Some(
                            "5",
                        ),
                        Some(
                            "1",
                        ),
                        Some(
                            "Green",
                        ),
                    ],
                },
                FlaggedResource {
                    region: None,
                    status: None,
                    metadata: [
                        None,
                        Some(
                            "IAM",
                        ),
                        Some(
                            "Roles",
                        ),
                        Some(
                            "1000",
                        ),
                        Some(
                            "10",
                        ),
                        Some(
                            "Green",
                        ),
                    ],
                },
            ],
        )
        "###);
    }

    #[test]
    fn test_parse_refresh_status() {
        let response: DescribeRefreshStatusesResponse = serde_json::from_value(json!({
            "statuses": [
                {"checkId": "a", "status": "enqueued", "millisUntilNextRefreshable": 0},
                {"checkId": "b", "status": "paused", "millisUntilNextRefreshable": 3600}
            ]
        }))
        .unwrap();

        assert_eq!(response.statuses[0].status, RefreshStatus::Enqueued);
        assert_eq!(response.statuses[1].status, RefreshStatus::Unknown);
        assert_eq!(response.statuses[1].millis_until_next_refreshable, 3600);
        assert!(RefreshStatus::Abandoned.is_finished());
        assert!(!RefreshStatus::Processing.is_finished());
    }
}
