use std::error::Error;

use awslimits_limits::Service;

/// A boxed error returned by a [`UsageCollector`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Collects current usage of one AWS service.
///
/// Collectors talk to the service's own API. They record usage on the limits of their service
/// through [`Limit::add_current_usage`](awslimits_limits::Limit::add_current_usage), and may report
/// the limits the service itself returns through
/// [`Limit::set_api_limit`](awslimits_limits::Limit::set_api_limit).
pub trait UsageCollector {
    /// The name of the service in the [`ServiceRegistry`](awslimits_limits::ServiceRegistry).
    fn service_name(&self) -> &str;

    /// Records current usage on the limits of the service.
    ///
    /// Usage of the previous run has already been reset when this is called.
    fn find_usage(&mut self, service: &mut Service) -> Result<(), BoxError>;

    /// Sets limits reported by the service's own describe-limits API.
    ///
    /// Most services have no such API, which is the default.
    fn update_api_limits(&mut self, _service: &mut Service) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T: UsageCollector + ?Sized> UsageCollector for Box<T> {
    fn service_name(&self) -> &str {
        (**self).service_name()
    }

    fn find_usage(&mut self, service: &mut Service) -> Result<(), BoxError> {
        (**self).find_usage(service)
    }

    fn update_api_limits(&mut self, service: &mut Service) -> Result<(), BoxError> {
        (**self).update_api_limits(service)
    }
}
