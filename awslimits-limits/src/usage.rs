use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Identifies a limit within the catalog of its service.
///
/// This is a cheap handle that samples and collaborators hold instead of a reference to the
/// [`Limit`](crate::Limit) itself. The catalog of the [`Service`](crate::Service) remains the sole
/// owner of the limit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LimitId {
    service: Arc<str>,
    name: Arc<str>,
}

impl LimitId {
    /// Creates a new identifier from a service name and a limit name.
    pub fn new(service: &str, name: &str) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
        }
    }

    /// Returns the name of the owning service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Returns the name of the limit, unique within its service.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LimitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.name)
    }
}

/// One observed data point of current consumption against a limit.
///
/// Samples are created through [`Limit::add_current_usage`](crate::Limit::add_current_usage) and
/// are immutable afterwards. They compare and order strictly by [`value`](Self::value): two samples
/// with the same value are equal, regardless of the resource they describe.
#[derive(Clone, Debug)]
pub struct UsageSample {
    limit: LimitId,
    value: f64,
    maximum: Option<f64>,
    resource_id: Option<String>,
    aws_type: Option<String>,
}

impl UsageSample {
    pub(crate) fn new(
        limit: LimitId,
        value: f64,
        maximum: Option<f64>,
        resource_id: Option<&str>,
        aws_type: Option<&str>,
    ) -> Self {
        Self {
            limit,
            value,
            maximum,
            resource_id: resource_id.map(str::to_owned),
            aws_type: aws_type.map(str::to_owned),
        }
    }

    /// Returns the identifier of the limit this sample was recorded for.
    pub fn limit(&self) -> &LimitId {
        &self.limit
    }

    /// The observed usage.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// A resource-specific maximum that replaces the limit's value during evaluation.
    ///
    /// This is used for limits that apply per resource, for instance the number of rules in one
    /// out of many security groups.
    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    /// The resource this sample describes, if the limit is shared by multiple resources.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// The AWS type of the resource, for instance `AWS::EC2::SecurityGroup`.
    pub fn aws_type(&self) -> Option<&str> {
        self.aws_type.as_deref()
    }
}

impl PartialEq for UsageSample {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for UsageSample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for UsageSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_id {
            Some(ref resource_id) => write!(f, "{resource_id}={}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(value: f64, resource_id: Option<&str>) -> UsageSample {
        let limit = LimitId::new("VPC", "Rules per security group");
        UsageSample::new(limit, value, None, resource_id, None)
    }

    #[test]
    fn test_equal_by_value_only() {
        assert_eq!(sample(3.0, Some("sg-1")), sample(3.0, Some("sg-2")));
        assert_ne!(sample(3.0, Some("sg-1")), sample(4.0, Some("sg-1")));
    }

    #[test]
    fn test_order_by_value() {
        assert!(sample(1.0, Some("sg-9")) < sample(2.0, Some("sg-1")));
        assert!(sample(2.5, None) > sample(2.0, None));
    }

    #[test]
    fn test_display() {
        assert_eq!(sample(85.0, None).to_string(), "85");
        assert_eq!(sample(1.5, Some("sg-1")).to_string(), "sg-1=1.5");
    }

    #[test]
    fn test_limit_id() {
        let id = LimitId::new("EC2", "Elastic IP addresses (EIPs)");
        assert_eq!(id.service(), "EC2");
        assert_eq!(id.name(), "Elastic IP addresses (EIPs)");
        assert_eq!(id.to_string(), "EC2/Elastic IP addresses (EIPs)");
    }
}
