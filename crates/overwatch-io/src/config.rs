//! TOML feeder description.
//!
//! Every section and field is optional; anything left out takes the value of
//! the 13.2 kV reference feeder:
//!
//! ```toml
//! [base]
//! voltage_kv = 13.2
//! power_mva = 5.0
//!
//! [source]
//! short_circuit_mva = 250.0
//! r_pu = 0.1
//! x_pu = 0.99
//!
//! [line]
//! r1_ohm_per_km = 0.19
//! x1_ohm_per_km = 0.40
//! r0_ohm_per_km = 0.50
//! x0_ohm_per_km = 1.20
//!
//! [feeder]
//! length_km = 10.0
//! unit_distances_km = [0.0, 3.0, 8.0]
//! ```
//!
//! The source impedance is `(S_base / S_sc) · (r_pu + j·x_pu)`; line
//! impedances are divided by the base impedance.

use anyhow::{Context, Result};
use num_complex::Complex64;
use overwatch_core::{
    FeederConfig, Kilometers, Kilovolts, MegavoltAmperes, OverwatchError, OverwatchResult,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// On-disk feeder configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederSettings {
    pub base: BaseSettings,
    pub source: SourceSettings,
    pub line: LineSettings,
    pub feeder: LayoutSettings,
}

/// System base quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseSettings {
    /// Line-to-line voltage
    pub voltage_kv: f64,
    /// Three-phase power
    pub power_mva: f64,
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self {
            voltage_kv: 13.2,
            power_mva: 5.0,
        }
    }
}

/// Upstream network seen from the substation bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub short_circuit_mva: f64,
    /// Resistive part of the impedance shape, scaled by `S_base / S_sc`
    pub r_pu: f64,
    /// Reactive part of the impedance shape, scaled by `S_base / S_sc`
    pub x_pu: f64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            short_circuit_mva: 250.0,
            r_pu: 0.1,
            x_pu: 0.99,
        }
    }
}

/// Sequence impedances of the overhead line, in ohms per km.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub r1_ohm_per_km: f64,
    pub x1_ohm_per_km: f64,
    pub r0_ohm_per_km: f64,
    pub x0_ohm_per_km: f64,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            r1_ohm_per_km: 0.19,
            x1_ohm_per_km: 0.40,
            r0_ohm_per_km: 0.50,
            x0_ohm_per_km: 1.20,
        }
    }
}

/// Feeder length and monitoring-unit placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub length_km: f64,
    pub unit_distances_km: Vec<f64>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            length_km: 10.0,
            unit_distances_km: vec![0.0, 3.0, 8.0],
        }
    }
}

impl FeederSettings {
    /// Convert to per-unit and validate.
    pub fn to_feeder_config(&self) -> OverwatchResult<FeederConfig> {
        let BaseSettings {
            voltage_kv,
            power_mva,
        } = self.base;
        if !(voltage_kv > 0.0 && power_mva > 0.0) {
            return Err(OverwatchError::InvalidConfig(format!(
                "base voltage and power must be positive (got {voltage_kv} kV, {power_mva} MVA)"
            )));
        }
        if !(self.source.short_circuit_mva > 0.0) {
            return Err(OverwatchError::InvalidConfig(format!(
                "source short-circuit level must be positive (got {} MVA)",
                self.source.short_circuit_mva
            )));
        }

        let z_base = voltage_kv.powi(2) / power_mva;
        let source_scale = power_mva / self.source.short_circuit_mva;
        let line = &self.line;

        let config = FeederConfig {
            base_voltage: Kilovolts(voltage_kv),
            base_power: MegavoltAmperes(power_mva),
            source_impedance: Complex64::new(self.source.r_pu, self.source.x_pu) * source_scale,
            z1_per_km: Complex64::new(line.r1_ohm_per_km, line.x1_ohm_per_km) / z_base,
            z0_per_km: Complex64::new(line.r0_ohm_per_km, line.x0_ohm_per_km) / z_base,
            unit_distances_km: self.feeder.unit_distances_km.clone(),
            length: Kilometers(self.feeder.length_km),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Read, parse and validate a feeder configuration file.
pub fn load_feeder_config(path: impl AsRef<Path>) -> Result<FeederConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading feeder config: {}", path.display()))?;
    let settings: FeederSettings = toml::from_str(&text)
        .with_context(|| format!("parsing feeder config: {}", path.display()))?;
    let config = settings
        .to_feeder_config()
        .with_context(|| format!("validating feeder config: {}", path.display()))?;
    debug!(
        path = %path.display(),
        units = config.unit_count(),
        length_km = config.length.value(),
        "loaded feeder config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn close(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-12
    }

    #[test]
    fn test_defaults_match_reference_feeder() {
        let config = FeederSettings::default().to_feeder_config().unwrap();
        let reference = FeederConfig::default();
        assert_eq!(config.base_voltage, reference.base_voltage);
        assert_eq!(config.unit_distances_km, reference.unit_distances_km);
        assert!(close(config.source_impedance, reference.source_impedance));
        assert!(close(config.z1_per_km, reference.z1_per_km));
        assert!(close(config.z0_per_km, reference.z0_per_km));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feeder]").unwrap();
        writeln!(file, "length_km = 12.0").unwrap();
        writeln!(file, "unit_distances_km = [0.0, 4.0, 9.0, 11.5]").unwrap();

        let config = load_feeder_config(file.path()).unwrap();
        assert_eq!(config.length.value(), 12.0);
        assert_eq!(config.unit_count(), 4);
        assert_eq!(config.base_voltage.value(), 13.2);
    }

    #[test]
    fn test_unsorted_units_name_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[feeder]").unwrap();
        writeln!(file, "unit_distances_km = [0.0, 8.0, 3.0]").unwrap();

        let err = load_feeder_config(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains(&file.path().display().to_string()));
        assert!(err.downcast_ref::<OverwatchError>().is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = load_feeder_config("/nonexistent/feeder.toml").unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/feeder.toml"));
    }

    #[test]
    fn test_rejects_zero_short_circuit_level() {
        let mut settings = FeederSettings::default();
        settings.source.short_circuit_mva = 0.0;
        assert!(matches!(
            settings.to_feeder_config(),
            Err(OverwatchError::InvalidConfig(_))
        ));
    }
}
