use std::collections::BTreeMap;

use awslimits_config::{Config, LimitOverrides, ThresholdOverrides};
use awslimits_limits::{Limit, ServiceRegistry, ThresholdOverride};
use awslimits_quotas::{ServiceQuotasApi, ServiceQuotasClient};
use awslimits_trustedadvisor::{SupportClient, TrustedAdvisor, TrustedAdvisorConfig};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::{CheckerError, UsageCollector};

/// Limits in alarm after a check: service name to the names of limits with warnings or criticals.
///
/// Services without alarms are omitted.
pub type ThresholdAlarms = BTreeMap<String, Vec<String>>;

/// Runs limit checks over all services of a [`ServiceRegistry`].
///
/// The registry should be built with the default thresholds of the [`Config`], see
/// [`Config::warning_threshold`] and [`Config::critical_threshold`]. Trusted Advisor and Service
/// Quotas are optional sources of limit values. Without them, limits resolve to overrides, values
/// from the services' own APIs and the documented defaults.
pub struct LimitChecker {
    registry: ServiceRegistry,
    collectors: BTreeMap<String, Box<dyn UsageCollector>>,
    trusted_advisor: Option<TrustedAdvisor<Box<dyn SupportClient>>>,
    service_quotas: Option<ServiceQuotasClient<Box<dyn ServiceQuotasApi>>>,
}

impl LimitChecker {
    /// Creates a checker for all services in the registry.
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry,
            collectors: BTreeMap::new(),
            trusted_advisor: None,
            service_quotas: None,
        }
    }

    /// Registers the usage collector of a service, replacing a previous collector.
    pub fn with_collector<U>(mut self, collector: U) -> Self
    where
        U: UsageCollector + 'static,
    {
        let name = collector.service_name().to_owned();
        if self.registry.service(&name).is_err() {
            awslimits_log::warn!(service = name, "usage collector for unregistered service");
        }

        self.collectors.insert(name, Box::new(collector));
        self
    }

    /// Enables limit updates from Trusted Advisor.
    pub fn with_trusted_advisor<C>(mut self, client: C, config: TrustedAdvisorConfig) -> Self
    where
        C: SupportClient + 'static,
    {
        let client: Box<dyn SupportClient> = Box::new(client);
        self.trusted_advisor = Some(TrustedAdvisor::new(client, &self.registry, config));
        self
    }

    /// Enables limit updates from Service Quotas.
    pub fn with_service_quotas<A>(mut self, api: A) -> Self
    where
        A: ServiceQuotasApi + 'static,
    {
        let api: Box<dyn ServiceQuotasApi> = Box::new(api);
        self.service_quotas = Some(ServiceQuotasClient::new(api));
        self
    }

    /// Applies limit and threshold overrides from the config.
    ///
    /// Disables Trusted Advisor and Service Quotas if the config turns them off.
    pub fn apply_config(&mut self, config: &Config) -> Result<(), CheckerError> {
        if !config.trusted_advisor_enabled() && self.trusted_advisor.take().is_some() {
            awslimits_log::info!("trusted advisor disabled by config");
        }

        if !config.service_quotas_enabled() && self.service_quotas.take().is_some() {
            awslimits_log::info!("service quotas disabled by config");
        }

        self.set_limit_overrides(config.limit_overrides(), config.override_ta())?;
        self.set_threshold_overrides(config.threshold_overrides())?;

        Ok(())
    }

    /// Returns the registry with all services and their limits.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Returns the names of all services in alphabetical order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.registry.service_names()
    }

    /// Returns the limits of a service.
    pub fn limits(&self, service: &str) -> Result<&IndexMap<String, Limit>, CheckerError> {
        Ok(self.registry.service(service)?.limits())
    }

    /// Sets a manual override on a limit.
    pub fn set_limit_override(
        &mut self,
        service: &str,
        limit: &str,
        value: f64,
        override_ta: bool,
    ) -> Result<(), CheckerError> {
        self.registry
            .service_mut(service)?
            .set_limit_override(limit, value, override_ta)?;
        Ok(())
    }

    /// Sets manual overrides on many limits.
    ///
    /// Fails on the first unknown service or limit. Overrides before it remain applied.
    pub fn set_limit_overrides(
        &mut self,
        overrides: &LimitOverrides,
        override_ta: bool,
    ) -> Result<(), CheckerError> {
        for (service, limits) in overrides {
            for (limit, value) in limits {
                self.set_limit_override(service, limit, *value, override_ta)?;
            }
        }

        Ok(())
    }

    /// Overrides the thresholds of a limit.
    pub fn set_threshold_override(
        &mut self,
        service: &str,
        limit: &str,
        threshold_override: ThresholdOverride,
    ) -> Result<(), CheckerError> {
        self.registry
            .service_mut(service)?
            .set_threshold_override(limit, threshold_override)?;
        Ok(())
    }

    /// Overrides the thresholds of many limits.
    ///
    /// Fails on the first unknown service or limit. Overrides before it remain applied.
    pub fn set_threshold_overrides(
        &mut self,
        overrides: &ThresholdOverrides,
    ) -> Result<(), CheckerError> {
        for (service, limits) in overrides {
            for (limit, threshold_override) in limits {
                self.set_threshold_override(service, limit, *threshold_override)?;
            }
        }

        Ok(())
    }

    /// Resolves the requested service names, or all services for `None`.
    fn select(&self, services: Option<&[&str]>) -> Result<Vec<String>, CheckerError> {
        let Some(services) = services else {
            return Ok(self.registry.service_names().map(str::to_owned).collect());
        };

        services
            .iter()
            .unique()
            .map(|name| Ok::<_, CheckerError>(self.registry.service(name)?.name().to_owned()))
            .collect()
    }

    /// Replaces the usage of the given services, or of all services for `None`.
    pub fn find_usage(&mut self, services: Option<&[&str]>) -> Result<(), CheckerError> {
        for name in self.select(services)? {
            let service = self.registry.service_mut(&name)?;
            service.reset_usage();

            let Some(collector) = self.collectors.get_mut(&name) else {
                awslimits_log::warn!(service = name, "no usage collector for service");
                continue;
            };

            awslimits_log::debug!(service = name, "finding usage");
            collector
                .find_usage(service)
                .map_err(|source| CheckerError::Usage {
                    service: name.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Updates limit values from all available sources.
    ///
    /// Limits reported by the APIs of the given services are read first. Trusted Advisor and
    /// Service Quotas always update all services, and Trusted Advisor is polled at most once per
    /// checker.
    pub fn update_limits(&mut self, services: Option<&[&str]>) -> Result<(), CheckerError> {
        for name in self.select(services)? {
            let Some(collector) = self.collectors.get_mut(&name) else {
                continue;
            };

            let service = self.registry.service_mut(&name)?;
            collector
                .update_api_limits(service)
                .map_err(|source| CheckerError::ApiLimits {
                    service: name.clone(),
                    source,
                })?;
        }

        if let Some(ref mut trusted_advisor) = self.trusted_advisor {
            trusted_advisor
                .update_limits(&mut self.registry)
                .map_err(CheckerError::TrustedAdvisor)?;
        }

        if let Some(ref mut service_quotas) = self.service_quotas {
            service_quotas
                .update_limits(&mut self.registry)
                .map_err(CheckerError::Quotas)?;
        }

        Ok(())
    }

    /// Evaluates the current usage of the given services, or all services for `None`.
    ///
    /// Warnings and criticals of every limit are recomputed from scratch, so repeated calls
    /// return the same alarms for unchanged usage.
    pub fn check_thresholds(
        &mut self,
        services: Option<&[&str]>,
    ) -> Result<ThresholdAlarms, CheckerError> {
        let mut alarms = ThresholdAlarms::new();

        for name in self.select(services)? {
            let limits: Vec<_> = self
                .registry
                .service_mut(&name)?
                .check_thresholds()
                .into_iter()
                .map(|limit| limit.name().to_owned())
                .collect();

            if limits.is_empty() {
                continue;
            }

            awslimits_log::info!(
                service = name,
                "limits crossing thresholds: {}",
                limits.iter().join(", ")
            );
            alarms.insert(name, limits);
        }

        Ok(alarms)
    }

    /// Runs a full check: finds usage, updates limits and evaluates thresholds.
    pub fn check(&mut self, services: Option<&[&str]>) -> Result<ThresholdAlarms, CheckerError> {
        self.find_usage(services)?;
        self.update_limits(services)?;
        self.check_thresholds(services)
    }
}
