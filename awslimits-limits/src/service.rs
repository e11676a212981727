use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use indexmap::IndexMap;

use crate::{Limit, LimitError, ThresholdOverride};

/// The default warning threshold in percent.
pub const DEFAULT_WARNING_THRESHOLD: u32 = 80;

/// The default critical threshold in percent.
pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 99;

/// The catalog of limits of one AWS service.
///
/// The service is the sole owner of its limits. Limits keep the order in which they were added.
#[derive(Clone, Debug)]
pub struct Service {
    name: String,
    quotas_service_code: Option<String>,
    warning_threshold: u32,
    critical_threshold: u32,
    limits: IndexMap<String, Limit>,
}

impl Service {
    /// Creates an empty catalog with the default thresholds for its limits.
    pub fn new(name: impl Into<String>, warning_threshold: u32, critical_threshold: u32) -> Self {
        Self {
            name: name.into(),
            quotas_service_code: None,
            warning_threshold,
            critical_threshold,
            limits: IndexMap::new(),
        }
    }

    /// Sets the Service Quotas code inherited by limits without their own code.
    pub fn with_quotas_service_code(mut self, code: impl Into<String>) -> Self {
        self.quotas_service_code = Some(code.into());
        self
    }

    /// The service name, for instance `EC2`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Service Quotas code of this service, if it is covered by Service Quotas.
    pub fn quotas_service_code(&self) -> Option<&str> {
        self.quotas_service_code.as_deref()
    }

    /// The default warning threshold in percent.
    pub fn warning_threshold(&self) -> u32 {
        self.warning_threshold
    }

    /// The default critical threshold in percent.
    pub fn critical_threshold(&self) -> u32 {
        self.critical_threshold
    }

    /// Creates a limit owned by this service with the service's default thresholds.
    ///
    /// The limit still needs to be added with [`add_limit`](Self::add_limit).
    pub fn new_limit(&self, name: &str, default_limit: f64) -> Result<Limit, LimitError> {
        Limit::new(
            name,
            &self.name,
            default_limit,
            self.warning_threshold,
            self.critical_threshold,
        )
    }

    /// Adds a limit to the catalog, replacing a previous limit with the same name.
    pub fn add_limit(&mut self, mut limit: Limit) -> &mut Limit {
        if let Some(ref code) = self.quotas_service_code {
            limit.inherit_quotas_service_code(code);
        }

        match self.limits.entry(limit.name().to_owned()) {
            indexmap::map::Entry::Occupied(mut occupied) => {
                occupied.insert(limit);
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(limit),
        }
    }

    /// Returns all limits in the order they were added.
    pub fn limits(&self) -> &IndexMap<String, Limit> {
        &self.limits
    }

    /// Returns mutable access to all limits.
    pub fn limits_mut(&mut self) -> impl Iterator<Item = &mut Limit> {
        self.limits.values_mut()
    }

    /// Looks up a limit by name.
    pub fn limit(&self, name: &str) -> Result<&Limit, LimitError> {
        self.limits
            .get(name)
            .ok_or_else(|| LimitError::UnknownLimit {
                service: self.name.clone(),
                limit: name.to_owned(),
            })
    }

    /// Looks up a limit by name for modification.
    pub fn limit_mut(&mut self, name: &str) -> Result<&mut Limit, LimitError> {
        self.limits
            .get_mut(name)
            .ok_or_else(|| LimitError::UnknownLimit {
                service: self.name.clone(),
                limit: name.to_owned(),
            })
    }

    /// Sets a manual override on the named limit.
    pub fn set_limit_override(
        &mut self,
        name: &str,
        value: f64,
        override_ta: bool,
    ) -> Result<(), LimitError> {
        self.limit_mut(name)?.set_limit_override(value, override_ta);
        Ok(())
    }

    /// Overrides the thresholds of the named limit.
    pub fn set_threshold_override(
        &mut self,
        name: &str,
        threshold_override: ThresholdOverride,
    ) -> Result<(), LimitError> {
        self.limit_mut(name)?
            .set_threshold_override(threshold_override);
        Ok(())
    }

    /// Removes the usage samples of all limits.
    pub fn reset_usage(&mut self) {
        for limit in self.limits.values_mut() {
            limit.reset_usage();
        }
    }

    /// Checks the thresholds of all limits and returns the limits in alarm.
    pub fn check_thresholds(&mut self) -> Vec<&Limit> {
        for limit in self.limits.values_mut() {
            limit.check_thresholds();
        }

        self.limits
            .values()
            .filter(|limit| limit.has_alarms())
            .collect()
    }
}

/// The explicit registration table of all services known to a run.
///
/// Services are ordered by name.
#[derive(Clone, Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Service>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service, replacing a previous service with the same name.
    pub fn register(&mut self, service: Service) -> &mut Service {
        match self.services.entry(service.name().to_owned()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(service);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(service),
        }
    }

    /// Returns `true` if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns the names of all registered services in alphabetical order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns all services.
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    /// Returns mutable access to all services.
    pub fn services_mut(&mut self) -> impl Iterator<Item = &mut Service> {
        self.services.values_mut()
    }

    /// Looks up a service by name.
    pub fn service(&self, name: &str) -> Result<&Service, LimitError> {
        self.services
            .get(name)
            .ok_or_else(|| LimitError::UnknownService(name.to_owned()))
    }

    /// Looks up a service by name for modification.
    pub fn service_mut(&mut self, name: &str) -> Result<&mut Service, LimitError> {
        self.services
            .get_mut(name)
            .ok_or_else(|| LimitError::UnknownService(name.to_owned()))
    }

    /// Looks up a limit for modification.
    pub fn limit_mut(&mut self, service: &str, limit: &str) -> Result<&mut Limit, LimitError> {
        self.service_mut(service)?.limit_mut(limit)
    }
}

impl FromIterator<Service> for ServiceRegistry {
    fn from_iter<T: IntoIterator<Item = Service>>(iter: T) -> Self {
        let mut registry = Self::new();
        for service in iter {
            registry.register(service);
        }
        registry
    }
}
