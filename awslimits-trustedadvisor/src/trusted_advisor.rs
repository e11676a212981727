use std::collections::BTreeMap;
use std::time::Duration;

use awslimits_limits::{LimitId, ServiceRegistry};
use awslimits_log::LogError;
use chrono::{DateTime, TimeDelta, Utc};
use hashbrown::HashMap;

use crate::{
    CheckResult, Clock, RefreshStatus, SupportClient, SupportError, SystemClock, TaRefreshMode,
    TrustedAdvisorConfig,
};

/// Name of the Trusted Advisor check that reports service limits.
pub const SERVICE_LIMITS_CHECK_NAME: &str = "Service Limits";

/// Category of the "Service Limits" check.
pub const SERVICE_LIMITS_CHECK_CATEGORY: &str = "performance";

/// Literal value of the "Limit Amount" column for limits without a ceiling.
pub const UNLIMITED: &str = "Unlimited";

/// Interval between two refresh status requests while waiting for a refresh.
pub const REFRESH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Cutoff for waiting on a refresh when no timeout is configured.
const UNBOUNDED_REFRESH_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const LANGUAGE: &str = "en";

const SERVICE_COLUMN: &str = "Service";
const LIMIT_NAME_COLUMN: &str = "Limit Name";
const LIMIT_AMOUNT_COLUMN: &str = "Limit Amount";

/// A limit value reported by Trusted Advisor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TaLimitValue {
    /// A numeric limit.
    Limit(u64),
    /// The quantity has no limit.
    Unlimited,
}

/// Parsed check results: Trusted Advisor service name to limit name to value.
pub type TaResults = BTreeMap<String, BTreeMap<String, TaLimitValue>>;

/// Errors that abort a Trusted Advisor poll.
#[derive(Debug, thiserror::Error)]
pub enum TrustedAdvisorError {
    /// A request to the support API failed.
    #[error("trusted advisor request failed")]
    Api(#[from] SupportError),

    /// The refresh status request returned no status for the check.
    #[error("no refresh status returned for trusted advisor check {0}")]
    MissingRefreshStatus(String),
}

/// The "Service Limits" check as returned by check discovery.
#[derive(Clone, Debug)]
struct ServiceLimitsCheck {
    id: String,
    metadata: Vec<String>,
}

/// Polls the Trusted Advisor "Service Limits" check and applies its values to limits.
///
/// The poller runs at most once per instance: after a successful
/// [`update_limits`](Self::update_limits), subsequent calls return immediately.
///
/// Limits are matched by their [`ta_service_name`](awslimits_limits::Limit::ta_service_name) and
/// [`ta_limit_name`](awslimits_limits::Limit::ta_limit_name). The index is built once from the
/// registry passed to the constructor.
pub struct TrustedAdvisor<C, K = SystemClock> {
    client: C,
    clock: K,
    config: TrustedAdvisorConfig,
    have_ta: bool,
    limits_updated: bool,
    ta_services: HashMap<String, HashMap<String, LimitId>>,
}

impl<C: SupportClient> TrustedAdvisor<C> {
    /// Creates a poller for all limits in the registry.
    pub fn new(client: C, registry: &ServiceRegistry, config: TrustedAdvisorConfig) -> Self {
        Self::with_clock(client, registry, config, SystemClock)
    }
}

impl<C: SupportClient, K: Clock> TrustedAdvisor<C, K> {
    /// Creates a poller that reads time from the given clock.
    pub fn with_clock(
        client: C,
        registry: &ServiceRegistry,
        config: TrustedAdvisorConfig,
        clock: K,
    ) -> Self {
        Self {
            client,
            clock,
            config,
            have_ta: true,
            limits_updated: false,
            ta_services: make_ta_service_index(registry),
        }
    }

    /// Returns `false` once discovery found that the account has no Trusted Advisor access.
    pub fn have_ta(&self) -> bool {
        self.have_ta
    }

    /// Returns `true` after limits have been updated by this poller.
    pub fn limits_updated(&self) -> bool {
        self.limits_updated
    }

    /// Polls Trusted Advisor and applies the reported limits to the registry.
    ///
    /// This is a no-op if limits have already been updated by this instance.
    pub fn update_limits(
        &mut self,
        registry: &mut ServiceRegistry,
    ) -> Result<(), TrustedAdvisorError> {
        if self.limits_updated {
            awslimits_log::debug!("already polled trusted advisor, skipping update");
            return Ok(());
        }

        let results = self.poll()?;
        self.update_services(registry, &results);
        self.limits_updated = true;

        Ok(())
    }

    /// Retrieves and parses the result of the "Service Limits" check.
    ///
    /// Returns empty results if the account has no Trusted Advisor subscription, or if the check
    /// has no usable data.
    pub fn poll(&mut self) -> Result<TaResults, TrustedAdvisorError> {
        awslimits_log::info!("beginning trusted advisor poll");

        let check = self.find_limit_check()?;
        if !self.have_ta {
            awslimits_log::info!("trusted advisor is not available, not polling");
            return Ok(TaResults::new());
        }

        let Some(check) = check else {
            awslimits_log::error!(
                "unable to find the service limits trusted advisor check, not using trusted advisor data"
            );
            return Ok(TaResults::new());
        };

        let result = self.refreshed_check_result(&check.id)?;
        let results = self.parse_check_result(&check, &result);

        awslimits_log::info!("finished trusted advisor poll");
        Ok(results)
    }

    /// Discovers the "Service Limits" check and its metadata column names.
    fn find_limit_check(&mut self) -> Result<Option<ServiceLimitsCheck>, TrustedAdvisorError> {
        awslimits_log::debug!("querying trusted advisor checks");

        let response = match self.client.describe_trusted_advisor_checks(LANGUAGE) {
            Ok(response) => response,
            Err(error) if error.is_subscription_required() => {
                awslimits_log::warn!("cannot check trusted advisor: {}", LogError(&error));
                self.have_ta = false;
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        let check = response.checks.into_iter().find(|check| {
            check.category == SERVICE_LIMITS_CHECK_CATEGORY
                && check.name == SERVICE_LIMITS_CHECK_NAME
        });

        match check {
            Some(check) => {
                awslimits_log::debug!(check_id = check.id, "found trusted advisor check");
                Ok(Some(ServiceLimitsCheck {
                    id: check.id,
                    metadata: check.metadata,
                }))
            }
            None => Ok(None),
        }
    }

    /// Returns the check result after applying the configured refresh mode.
    fn refreshed_check_result(&self, check_id: &str) -> Result<CheckResult, TrustedAdvisorError> {
        let Some(mode) = self.config.refresh_mode else {
            awslimits_log::info!("not refreshing trusted advisor check (no refresh mode)");
            return Ok(self.check_result(check_id)?.0);
        };

        awslimits_log::debug!(check_id, %mode, "handling refresh of trusted advisor check");

        if !self.can_refresh_check(check_id) {
            return Ok(self.check_result(check_id)?.0);
        }

        if let TaRefreshMode::Older(max_age) = mode {
            let (result, timestamp) = self.check_result(check_id)?;
            if !self.is_older_than(timestamp, max_age) {
                awslimits_log::warn!(
                    check_id,
                    "trusted advisor check was refreshed less than {max_age} seconds ago, not refreshing"
                );
                return Ok(result);
            }
        }

        awslimits_log::info!(check_id, "refreshing trusted advisor check");
        self.client.refresh_trusted_advisor_check(check_id)?;

        match mode {
            TaRefreshMode::Trigger => Ok(self.check_result(check_id)?.0),
            TaRefreshMode::Older(_) | TaRefreshMode::Wait => self.poll_for_refresh(check_id),
        }
    }

    /// Returns `true` if the last refresh happened more than `max_age` seconds ago.
    ///
    /// A result without a valid timestamp is considered stale. A timestamp in the future is
    /// considered fresh.
    fn is_older_than(&self, timestamp: Option<DateTime<Utc>>, max_age: u64) -> bool {
        let Some(timestamp) = timestamp else {
            return true;
        };

        let age = self.clock.now().signed_duration_since(timestamp);
        if age < TimeDelta::zero() {
            awslimits_log::debug!(
                %timestamp,
                "trusted advisor check timestamp is in the future, treating result as fresh"
            );
            return false;
        }

        u64::try_from(age.num_seconds()).is_ok_and(|age| age > max_age)
    }

    /// Returns `false` while the refresh cooldown of the check has not elapsed.
    ///
    /// Failures to retrieve the status are logged and the check is assumed to be refreshable.
    fn can_refresh_check(&self, check_id: &str) -> bool {
        let response = match self
            .client
            .describe_trusted_advisor_check_refresh_statuses(&[check_id])
        {
            Ok(response) => response,
            Err(error) => {
                awslimits_log::warn!(
                    check_id,
                    "could not get refresh status for trusted advisor check: {}",
                    LogError(&error)
                );
                return true;
            }
        };

        let Some(status) = response.statuses.first() else {
            awslimits_log::warn!(check_id, "no refresh status for trusted advisor check");
            return true;
        };

        awslimits_log::debug!(check_id, status = %status.status, "trusted advisor refresh status");

        let millis = status.millis_until_next_refreshable;
        if millis > 0 {
            awslimits_log::warn!(
                check_id,
                "trusted advisor check cannot be refreshed for another {millis} milliseconds, \
                 using the current check results"
            );
            return false;
        }

        true
    }

    /// Waits for a requested refresh to finish, then returns the check result.
    ///
    /// Waiting ends when the refresh succeeds or is abandoned, when the status falls back to
    /// `none` after the refresh was active, or when the refresh timeout elapses. In all cases the
    /// result that is currently available is returned.
    fn poll_for_refresh(&self, check_id: &str) -> Result<CheckResult, TrustedAdvisorError> {
        awslimits_log::warn!(check_id, "polling for trusted advisor check refresh");

        let timeout = self
            .config
            .refresh_timeout
            .unwrap_or(UNBOUNDED_REFRESH_TIMEOUT);
        let deadline = TimeDelta::from_std(timeout)
            .ok()
            .and_then(|timeout| self.clock.now().checked_add_signed(timeout))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut last_status = None;

        loop {
            if self.clock.now() > deadline {
                awslimits_log::error!(
                    check_id,
                    status = ?last_status,
                    "timed out waiting for trusted advisor check refresh"
                );
                break;
            }

            awslimits_log::debug!(check_id, "checking refresh status");
            let status = self.refresh_status(check_id)?;

            if status.is_finished() {
                awslimits_log::info!(check_id, %status, "trusted advisor refresh finished");
                break;
            }

            if status == RefreshStatus::None && last_status.is_some_and(|s| s != status) {
                awslimits_log::warn!(
                    check_id,
                    "trusted advisor check refresh status went from {} to {status}, \
                     refresh is either complete or timed out on the aws side",
                    last_status.unwrap_or(status),
                );
                break;
            }

            last_status = Some(status);
            awslimits_log::info!(
                check_id,
                %status,
                "trusted advisor refresh in progress, sleeping {}s",
                REFRESH_POLL_INTERVAL.as_secs()
            );
            self.clock.sleep(REFRESH_POLL_INTERVAL);
        }

        awslimits_log::info!(check_id, "done polling for trusted advisor check refresh");
        let (result, timestamp) = self.check_result(check_id)?;
        awslimits_log::debug!(check_id, ?timestamp, "trusted advisor check last refreshed");

        Ok(result)
    }

    fn refresh_status(&self, check_id: &str) -> Result<RefreshStatus, TrustedAdvisorError> {
        self.client
            .describe_trusted_advisor_check_refresh_statuses(&[check_id])?
            .statuses
            .first()
            .map(|status| status.status)
            .ok_or_else(|| TrustedAdvisorError::MissingRefreshStatus(check_id.to_owned()))
    }

    /// Fetches the cached check result together with the time of its last refresh.
    fn check_result(
        &self,
        check_id: &str,
    ) -> Result<(CheckResult, Option<DateTime<Utc>>), TrustedAdvisorError> {
        let response = self
            .client
            .describe_trusted_advisor_check_result(check_id, LANGUAGE)?;

        let result = response.result;
        let timestamp = match DateTime::parse_from_rfc3339(&result.timestamp) {
            Ok(timestamp) => Some(timestamp.with_timezone(&Utc)),
            Err(error) => {
                awslimits_log::warn!(
                    check_id,
                    timestamp = result.timestamp,
                    "invalid trusted advisor check timestamp: {}",
                    LogError(&error)
                );
                None
            }
        };

        awslimits_log::debug!(check_id, ?timestamp, "got trusted advisor check result");
        Ok((result, timestamp))
    }

    /// Parses the flagged resources of the check into limit values.
    ///
    /// Column names are taken from the check's metadata and matched against each row by position.
    fn parse_check_result(&self, check: &ServiceLimitsCheck, result: &CheckResult) -> TaResults {
        let mut results = TaResults::new();

        if result.status == "not_available" {
            awslimits_log::warn!(
                "trusted advisor returned status not_available for the service limits check"
            );
            return results;
        }

        let Some(ref rows) = result.flagged_resources else {
            awslimits_log::warn!("trusted advisor returned no results for the service limits check");
            return results;
        };

        let region = self
            .config
            .region
            .as_deref()
            .or_else(|| self.client.region());

        for row in rows {
            match (region, row.region.as_deref()) {
                (Some(region), Some(row_region)) if region != row_region => continue,
                _ => (),
            }

            let columns: HashMap<&str, &str> = check
                .metadata
                .iter()
                .zip(&row.metadata)
                .filter_map(|(name, value)| Some((name.as_str(), value.as_deref()?)))
                .collect();

            let (Some(service), Some(limit_name), Some(amount)) = (
                columns.get(SERVICE_COLUMN),
                columns.get(LIMIT_NAME_COLUMN),
                columns.get(LIMIT_AMOUNT_COLUMN),
            ) else {
                awslimits_log::warn!(
                    "skipping trusted advisor row with missing columns: {:?}",
                    row.metadata
                );
                continue;
            };

            let value = match amount.trim().parse() {
                Ok(value) => TaLimitValue::Limit(value),
                Err(_) if *amount == UNLIMITED => {
                    awslimits_log::debug!(
                        service,
                        limit = limit_name,
                        "trusted advisor reports explicit unlimited limit"
                    );
                    TaLimitValue::Unlimited
                }
                Err(_) => {
                    awslimits_log::error!(
                        service,
                        limit = limit_name,
                        "trusted advisor returned unknown limit amount {amount:?}"
                    );
                    continue;
                }
            };

            results
                .entry((*service).to_owned())
                .or_default()
                .insert((*limit_name).to_owned(), value);
        }

        results
    }

    /// Pushes parsed values into the matching limits of the registry.
    fn update_services(&self, registry: &mut ServiceRegistry, results: &TaResults) {
        awslimits_log::debug!("updating trusted advisor limits");

        for (service_name, limits) in results {
            for (limit_name, value) in limits {
                let id = self
                    .ta_services
                    .get(service_name)
                    .and_then(|limits| limits.get(limit_name));

                let Some(id) = id else {
                    awslimits_log::info!(
                        service = service_name,
                        limit = limit_name,
                        "trusted advisor returned check results for unknown limit"
                    );
                    continue;
                };

                let limit = match registry.limit_mut(id.service(), id.name()) {
                    Ok(limit) => limit,
                    Err(error) => {
                        awslimits_log::warn!(
                            "cannot apply trusted advisor limit: {}",
                            LogError(&error)
                        );
                        continue;
                    }
                };

                match value {
                    TaLimitValue::Unlimited => limit.set_ta_unlimited(),
                    TaLimitValue::Limit(value) => limit.set_ta_limit(*value as f64),
                }
            }
        }

        awslimits_log::info!("done updating trusted advisor limits on all services");
    }
}

/// Indexes all limits by their Trusted Advisor service and limit names.
fn make_ta_service_index(registry: &ServiceRegistry) -> HashMap<String, HashMap<String, LimitId>> {
    let mut index: HashMap<String, HashMap<String, LimitId>> = HashMap::new();

    for service in registry.services() {
        for limit in service.limits().values() {
            index
                .entry(limit.ta_service_name().to_owned())
                .or_default()
                .insert(limit.ta_limit_name().to_owned(), limit.id().clone());
        }
    }

    index
}
