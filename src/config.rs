//! Rebate configuration loaded from environment variables.
//!
//! All variables are optional and fall back to the stock commission scheme:
//! - `REBATE_FIRST_LEVEL_RATE` — fraction of the trade fee paid to the
//!   direct inviter (default `0.10`)
//! - `REBATE_SECOND_LEVEL_RATE` — fraction paid to the inviter's inviter
//!   (default `0.05`)
//! - `REBATE_RECONCILE_POLICY` — `max` or `sum` (default `max`)

use rust_decimal::Decimal;

use crate::LedgerError;
use crate::models::rebate::RebateLevel;

/// Default first-level commission rate (10%).
const DEFAULT_FIRST_LEVEL_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Default second-level commission rate (5%).
const DEFAULT_SECOND_LEVEL_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Commission rates applied per referral level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebateRates {
    pub first_level: Decimal,
    pub second_level: Decimal,
}

impl RebateRates {
    /// Returns the rate for the given level.
    #[must_use]
    pub fn rate(&self, level: RebateLevel) -> Decimal {
        match level {
            RebateLevel::First => self.first_level,
            RebateLevel::Second => self.second_level,
        }
    }
}

impl Default for RebateRates {
    fn default() -> Self {
        Self {
            first_level: DEFAULT_FIRST_LEVEL_RATE,
            second_level: DEFAULT_SECOND_LEVEL_RATE,
        }
    }
}

/// How a recorded ledger total and a live recomputed total are combined
/// into the displayed value.
///
/// The ledger lags real trade activity until the next hourly settlement, so
/// the displayed value cannot simply read the ledger. Which combination is
/// correct is an open product question; both variants seen in the wild are
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Take the larger of the two.
    #[default]
    Max,
    /// Add the two.
    Sum,
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebateConfig {
    pub rates: RebateRates,
    pub reconcile: ReconcilePolicy,
}

/// Loads the configuration from environment variables.
///
/// # Errors
///
/// Returns [`LedgerError::Config`] if a rate variable is not a decimal in
/// `[0, 1]` or the policy variable names an unknown policy.
pub fn fetch_config() -> crate::Result<RebateConfig> {
    let first_level = rate_var("REBATE_FIRST_LEVEL_RATE", DEFAULT_FIRST_LEVEL_RATE)?;
    let second_level = rate_var("REBATE_SECOND_LEVEL_RATE", DEFAULT_SECOND_LEVEL_RATE)?;

    let reconcile = match non_empty_var("REBATE_RECONCILE_POLICY") {
        None => ReconcilePolicy::Max,
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "max" => ReconcilePolicy::Max,
            "sum" => ReconcilePolicy::Sum,
            other => {
                return Err(LedgerError::Config(format!(
                    "REBATE_RECONCILE_POLICY must be `max` or `sum`, got `{other}`"
                )));
            }
        },
    };

    Ok(RebateConfig {
        rates: RebateRates {
            first_level,
            second_level,
        },
        reconcile,
    })
}

/// Reads a rate variable, validating it is a decimal fraction in `[0, 1]`.
fn rate_var(name: &str, default: Decimal) -> crate::Result<Decimal> {
    let Some(raw) = non_empty_var(name) else {
        return Ok(default);
    };
    let rate: Decimal = raw
        .parse()
        .map_err(|_| LedgerError::Config(format!("{name} is not a valid decimal: `{raw}`")))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(LedgerError::Config(format!(
            "{name} must be between 0 and 1, got {rate}"
        )));
    }
    Ok(rate)
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Helper that temporarily sets env vars, runs `f`, then restores originals.
    ///
    /// # Safety
    ///
    /// Tests using this helper must run with `--test-threads=1` or otherwise
    /// ensure no other threads read these env vars concurrently.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let originals: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(k).ok()))
            .collect();

        for (k, v) in vars {
            // SAFETY: config tests run single-threaded (see test runner config).
            unsafe {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values, same single-threaded context.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(
            &[
                ("REBATE_FIRST_LEVEL_RATE", None),
                ("REBATE_SECOND_LEVEL_RATE", None),
                ("REBATE_RECONCILE_POLICY", None),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.rates.first_level, dec!(0.10));
                assert_eq!(config.rates.second_level, dec!(0.05));
                assert_eq!(config.reconcile, ReconcilePolicy::Max);
            },
        );
    }

    #[test]
    fn custom_rates_from_env() {
        with_env(
            &[
                ("REBATE_FIRST_LEVEL_RATE", Some("0.12")),
                ("REBATE_SECOND_LEVEL_RATE", Some("0.03")),
                ("REBATE_RECONCILE_POLICY", None),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.rates.first_level, dec!(0.12));
                assert_eq!(config.rates.second_level, dec!(0.03));
            },
        );
    }

    #[test]
    fn sum_policy_from_env() {
        with_env(
            &[
                ("REBATE_FIRST_LEVEL_RATE", None),
                ("REBATE_SECOND_LEVEL_RATE", None),
                ("REBATE_RECONCILE_POLICY", Some("SUM")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.reconcile, ReconcilePolicy::Sum);
            },
        );
    }

    #[test]
    fn rejects_non_decimal_rate() {
        with_env(&[("REBATE_FIRST_LEVEL_RATE", Some("ten percent"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("not a valid decimal"));
        });
    }

    #[test]
    fn rejects_rate_above_one() {
        with_env(&[("REBATE_FIRST_LEVEL_RATE", Some("1.5"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("between 0 and 1"));
        });
    }

    #[test]
    fn rejects_unknown_policy() {
        with_env(
            &[
                ("REBATE_FIRST_LEVEL_RATE", None),
                ("REBATE_RECONCILE_POLICY", Some("average")),
            ],
            || {
                let err = fetch_config().unwrap_err();
                assert!(err.to_string().contains("must be `max` or `sum`"));
            },
        );
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("REBATE_FIRST_LEVEL_RATE", Some("")),
                ("REBATE_SECOND_LEVEL_RATE", Some("")),
                ("REBATE_RECONCILE_POLICY", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.rates.first_level, dec!(0.10));
                assert_eq!(config.reconcile, ReconcilePolicy::Max);
            },
        );
    }

    #[test]
    fn rate_lookup_by_level() {
        let rates = RebateRates::default();
        assert_eq!(rates.rate(RebateLevel::First), dec!(0.10));
        assert_eq!(rates.rate(RebateLevel::Second), dec!(0.05));
    }
}
