use std::error::Error;

use awslimits_limits::DEFAULT_QUOTAS_UNIT;
use serde::{Deserialize, Serialize};

/// The error code Service Quotas returns for services without quotas.
pub const NO_SUCH_RESOURCE: &str = "NoSuchResourceException";

/// An error returned by the Service Quotas API.
#[derive(Debug, thiserror::Error)]
pub enum QuotasError {
    /// The service rejected the request with an error code.
    #[error("{code}: {message}")]
    Service {
        /// The AWS error code, for instance `NoSuchResourceException`.
        code: String,
        /// The error message returned by AWS.
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("failed to send request to the service quotas api")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
}

impl QuotasError {
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

    /// Returns `true` if the requested service has no quotas.
    pub fn is_no_such_resource(&self) -> bool {
        self.code() == Some(NO_SUCH_RESOURCE)
    }
}

fn default_unit() -> String {
    DEFAULT_QUOTAS_UNIT.to_owned()
}

/// One entry of the `ListServiceQuotas` response.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceQuota {
    /// The display name of the quota, for instance `VPCs per Region`.
    pub quota_name: String,
    /// The quota code, for instance `L-F678F1CE`.
    #[serde(default)]
    pub quota_code: String,
    /// The applied value of the quota.
    #[serde(default)]
    pub value: Option<f64>,
    /// The unit of [`value`](Self::value), `"None"` for plain counts.
    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Access to the `ListServiceQuotas` operation of the Service Quotas API.
pub trait ServiceQuotasApi {
    /// Returns all quotas of a service.
    ///
    /// Implementations follow pagination and return the quotas of all pages.
    fn list_service_quotas(&self, service_code: &str) -> Result<Vec<ServiceQuota>, QuotasError>;
}

impl<T: ServiceQuotasApi + ?Sized> ServiceQuotasApi for &T {
    fn list_service_quotas(&self, service_code: &str) -> Result<Vec<ServiceQuota>, QuotasError> {
        (**self).list_service_quotas(service_code)
    }
}

impl<T: ServiceQuotasApi + ?Sized> ServiceQuotasApi for Box<T> {
    fn list_service_quotas(&self, service_code: &str) -> Result<Vec<ServiceQuota>, QuotasError> {
        (**self).list_service_quotas(service_code)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_service_quota() {
        let quotas: Vec<ServiceQuota> = serde_json::from_value(json!([
            {
                "ServiceCode": "vpc",
                "QuotaName": "VPCs per Region",
                "QuotaCode": "L-F678F1CE",
                "Value": 5.0,
                "Unit": "None",
                "Adjustable": true
            },
            {
                "QuotaName": "Rules per network ACL"
            }
        ]))
        .unwrap();

        insta::assert_debug_snapshot!(quotas, @r###"
        [
            ServiceQuota {
                quota_name: "VPCs per Region",
                quota_code: "L-F678F1CE",
                value: Some(
                    5.0,
                ),
                unit: "None",
            },
            ServiceQuota {
                quota_name: "Rules per network ACL",
                quota_code: "",
                value: None,
                unit: "None",
            },
        ]
        "###);
    }

    #[test]
    fn test_no_such_resource() {
        assert!(QuotasError::service(NO_SUCH_RESOURCE, "no quotas").is_no_such_resource());
        assert!(!QuotasError::service("AccessDeniedException", "denied").is_no_such_resource());
        assert!(!QuotasError::Transport("timeout".into()).is_no_such_resource());
    }
}
