use awslimits_limits::{ServiceRegistry, UnitConverter};
use awslimits_log::LogError;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::{QuotasError, ServiceQuota, ServiceQuotasApi};

/// Quotas of one service, keyed by lowercase quota name.
type QuotaIndex = HashMap<String, ServiceQuota>;

/// Reads limit values from Service Quotas.
///
/// Quotas are requested at most once per service code and cached for the lifetime of the client.
/// Services without quotas are cached as empty.
pub struct ServiceQuotasClient<C> {
    api: C,
    cache: HashMap<String, QuotaIndex>,
}

impl<C: ServiceQuotasApi> ServiceQuotasClient<C> {
    /// Creates a client with an empty cache.
    pub fn new(api: C) -> Self {
        Self {
            api,
            cache: HashMap::new(),
        }
    }

    /// Returns the quotas of a service, listing them on first access.
    ///
    /// The iterator is empty if the service has no quotas.
    pub fn quotas_for_service(
        &mut self,
        service_code: &str,
    ) -> Result<impl Iterator<Item = &ServiceQuota>, QuotasError> {
        Ok(self.quota_index(service_code)?.values())
    }

    fn quota_index(&mut self, service_code: &str) -> Result<&QuotaIndex, QuotasError> {
        let entry = match self.cache.entry(service_code.to_owned()) {
            Entry::Occupied(occupied) => return Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => vacant,
        };

        awslimits_log::debug!(service_code, "listing service quotas");

        let index = match self.api.list_service_quotas(service_code) {
            Ok(quotas) => quotas
                .into_iter()
                .map(|quota| (quota.quota_name.to_lowercase(), quota))
                .collect(),
            Err(error) if error.is_no_such_resource() => {
                awslimits_log::warn!(
                    service_code,
                    "service quotas has no quotas for service: {}",
                    LogError(&error)
                );
                QuotaIndex::new()
            }
            Err(error) => return Err(error),
        };

        awslimits_log::debug!(service_code, count = index.len(), "cached service quotas");
        Ok(entry.insert(index))
    }

    /// Returns the value of a quota converted to the expected unit.
    ///
    /// Returns `None` if the quota does not exist, has no value, or is reported in a different unit
    /// and cannot be converted.
    pub fn get_quota_value(
        &mut self,
        service_code: &str,
        quota_name: &str,
        unit: &str,
        converter: Option<UnitConverter>,
    ) -> Result<Option<f64>, QuotasError> {
        let index = self.quota_index(service_code)?;

        let Some(quota) = index.get(&quota_name.to_lowercase()) else {
            awslimits_log::debug!(service_code, quota_name, "no service quota found");
            return Ok(None);
        };

        let Some(value) = quota.value else {
            awslimits_log::debug!(service_code, quota_name, "service quota has no value");
            return Ok(None);
        };

        if quota.unit == unit {
            return Ok(Some(value));
        }

        let converted = converter.and_then(|convert| convert(value, &quota.unit, unit));
        if converted.is_none() {
            awslimits_log::error!(
                service_code,
                quota_name,
                "cannot use service quota reported in unit {:?}, expected {unit:?}",
                quota.unit,
            );
        }

        Ok(converted)
    }

    /// Sets the quotas value on all limits that have a Service Quotas service code.
    pub fn update_limits(&mut self, registry: &mut ServiceRegistry) -> Result<(), QuotasError> {
        awslimits_log::debug!("updating limits from service quotas");

        for service in registry.services_mut() {
            for limit in service.limits_mut() {
                let Some(service_code) = limit.quotas_service_code() else {
                    continue;
                };

                let value = self.get_quota_value(
                    service_code,
                    limit.quotas_name(),
                    limit.quotas_unit(),
                    limit.quotas_unit_converter(),
                )?;

                if let Some(value) = value {
                    awslimits_log::trace!(limit = %limit.id(), value, "setting quotas limit");
                    limit.set_quotas_limit(value);
                }
            }
        }

        awslimits_log::info!("done updating limits from service quotas");
        Ok(())
    }
}
