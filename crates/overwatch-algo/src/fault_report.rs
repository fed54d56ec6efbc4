//! Field reports for located faults.
//!
//! A [`FaultReport`] is what a dispatcher acts on: which unit saw the fault,
//! how far out it is in metres, and how severe the current was. A
//! [`FaultLog`] accumulates reports and keeps severity counts.

use crate::table_locator::{Classification, LocateResult};
use overwatch_core::{FeederConfig, Kilometers};
use serde::{Deserialize, Serialize};

/// Target current above which a fault is reported as critical (A).
pub const CRITICAL_CURRENT_A: f64 = 8000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    /// Critical strictly above [`CRITICAL_CURRENT_A`].
    pub fn from_current(amps: f64) -> Self {
        if amps > CRITICAL_CURRENT_A {
            Severity::Critical
        } else {
            Severity::Warning
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Report record for one confirmed fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultReport {
    pub unit_index: usize,
    pub unit_distance_km: f64,
    pub classification: Classification,
    pub distance_km: f64,
    pub distance_m: f64,
    pub current_a: f64,
    pub severity: Severity,
}

impl FaultReport {
    /// `None` unless the result is a confirmed fault with an identifying unit
    /// known to `config`.
    pub fn from_result(result: &LocateResult, config: &FeederConfig) -> Option<Self> {
        if !result.is_fault() {
            return None;
        }
        let classification = result.classification?;
        let unit_index = result.unit_index?;
        let unit_distance = config.unit_distance(unit_index)?;
        Some(Self {
            unit_index,
            unit_distance_km: unit_distance.value(),
            classification,
            distance_km: result.distance_km,
            distance_m: Kilometers(result.distance_km).to_meters(),
            current_a: result.measured_current_a,
            severity: Severity::from_current(result.measured_current_a),
        })
    }
}

/// Severity counts over a set of reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaultLogStats {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
}

/// Reported faults in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaultLog {
    reports: Vec<FaultReport>,
}

impl FaultLog {
    pub fn stats(&self) -> FaultLogStats {
        let critical = self
            .reports
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .count();
        FaultLogStats {
            total: self.reports.len(),
            critical,
            warning: self.reports.len() - critical,
        }
    }
}

impl FromIterator<FaultReport> for FaultLog {
    fn from_iter<I: IntoIterator<Item = FaultReport>>(iter: I) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_locator::FaultStatus;

    fn located(unit: usize, distance_km: f64, amps: f64) -> LocateResult {
        LocateResult {
            status: FaultStatus::FaultConfirmed,
            classification: Some(Classification::ThreePhase),
            distance_km,
            unit_index: Some(unit),
            measured_current_a: amps,
            matched_current_a: amps,
        }
    }

    #[test]
    fn test_severity_threshold_is_strict() {
        assert_eq!(Severity::from_current(8000.0), Severity::Warning);
        assert_eq!(Severity::from_current(8000.1), Severity::Critical);
        assert_eq!(Severity::Critical.label(), "CRITICAL");
    }

    #[test]
    fn test_report_from_result() {
        let config = FeederConfig::default();
        let report = FaultReport::from_result(&located(1, 4.25, 2500.0), &config).unwrap();
        assert_eq!(report.unit_index, 1);
        assert_eq!(report.unit_distance_km, 3.0);
        assert_eq!(report.distance_m, 4250.0);
        assert_eq!(report.severity, Severity::Warning);
    }

    #[test]
    fn test_no_report_without_fault() {
        let config = FeederConfig::default();
        assert!(FaultReport::from_result(&LocateResult::no_fault(), &config).is_none());
        assert!(FaultReport::from_result(&located(7, 1.0, 9000.0), &config).is_none());
    }

    #[test]
    fn test_log_counts() {
        let config = FeederConfig::default();
        let log: FaultLog = [(0, 0.5, 10_500.0), (1, 4.0, 3000.0), (2, 9.0, 1800.0)]
            .into_iter()
            .filter_map(|(u, d, a)| FaultReport::from_result(&located(u, d, a), &config))
            .collect();
        assert_eq!(
            log.stats(),
            FaultLogStats {
                total: 3,
                critical: 1,
                warning: 2
            }
        );
    }
}
