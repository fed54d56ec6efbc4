//! Radial feeder description consumed read-only by every engine function.

use crate::error::{OverwatchError, OverwatchResult};
use crate::units::{Amperes, Kilometers, Kilovolts, MegavoltAmperes, Ohms};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Electrical and topological constants of a single radial feeder.
///
/// Impedances are per-unit on the feeder base. Base current and base impedance
/// are derived from the line-to-line base voltage and the three-phase base power:
///
/// ```text
/// I_base = S_base / (√3 · V_LL)
/// Z_base = V_LL² / S_base
/// ```
///
/// Monitoring units are listed in ascending distance order; unit 0 sits at the
/// source and the unit index is the position in `unit_distances_km`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeederConfig {
    pub base_voltage: Kilovolts,
    pub base_power: MegavoltAmperes,
    /// Thevenin source impedance behind the substation bus (pu)
    pub source_impedance: Complex64,
    /// Positive-sequence line impedance (pu/km); negative sequence is taken equal
    pub z1_per_km: Complex64,
    /// Zero-sequence line impedance (pu/km)
    pub z0_per_km: Complex64,
    pub unit_distances_km: Vec<f64>,
    pub length: Kilometers,
}

impl Default for FeederConfig {
    /// 13.2 kV, 5 MVA base, 250 MVA short-circuit source, 10 km overhead line
    /// with monitoring units at 0, 3 and 8 km.
    fn default() -> Self {
        let base_voltage = Kilovolts(13.2);
        let base_power = MegavoltAmperes(5.0);
        let z_base = base_voltage.value().powi(2) / base_power.value();
        let source_scale = base_power.value() / 250.0;
        Self {
            base_voltage,
            base_power,
            source_impedance: Complex64::new(0.1, 0.99) * source_scale,
            z1_per_km: Complex64::new(0.19, 0.40) / z_base,
            z0_per_km: Complex64::new(0.50, 1.20) / z_base,
            unit_distances_km: vec![0.0, 3.0, 8.0],
            length: Kilometers(10.0),
        }
    }
}

impl FeederConfig {
    /// Base current in amperes.
    pub fn base_current(&self) -> Amperes {
        let va = self.base_power.value() * 1e6;
        let v_ll = self.base_voltage.value() * 1e3;
        Amperes(va / (3f64.sqrt() * v_ll))
    }

    /// Base impedance in ohms.
    pub fn base_impedance(&self) -> Ohms {
        let kv = self.base_voltage.value();
        Ohms(kv * kv / self.base_power.value())
    }

    pub fn unit_count(&self) -> usize {
        self.unit_distances_km.len()
    }

    pub fn unit_distance(&self, index: usize) -> Option<Kilometers> {
        self.unit_distances_km.get(index).copied().map(Kilometers)
    }

    /// Check the invariants every engine function relies on.
    pub fn validate(&self) -> OverwatchResult<()> {
        if !(self.base_voltage.value() > 0.0) || !(self.base_power.value() > 0.0) {
            return Err(OverwatchError::InvalidConfig(format!(
                "base voltage ({}) and base power ({}) must be positive",
                self.base_voltage, self.base_power
            )));
        }
        if !(self.base_impedance().value() > 0.0) || !self.base_impedance().is_finite() {
            return Err(OverwatchError::InvalidConfig(
                "base impedance must be positive and finite".into(),
            ));
        }
        if !(self.length.value() > 0.0) || !self.length.is_finite() {
            return Err(OverwatchError::InvalidConfig(format!(
                "feeder length must be positive, got {}",
                self.length
            )));
        }
        for (name, z) in [
            ("source impedance", self.source_impedance),
            ("z1 per km", self.z1_per_km),
            ("z0 per km", self.z0_per_km),
        ] {
            if !z.re.is_finite() || !z.im.is_finite() {
                return Err(OverwatchError::InvalidConfig(format!(
                    "{name} must be finite, got {z}"
                )));
            }
        }
        if self.z1_per_km.norm() < 1e-12 {
            return Err(OverwatchError::InvalidConfig(
                "positive-sequence line impedance must be non-zero".into(),
            ));
        }

        let units = &self.unit_distances_km;
        match units.first() {
            None => {
                return Err(OverwatchError::InvalidConfig(
                    "at least one monitoring unit is required".into(),
                ))
            }
            Some(&first) if first.abs() > 1e-9 => {
                return Err(OverwatchError::InvalidConfig(format!(
                    "unit 0 must sit at the source (0 km), found {first} km"
                )))
            }
            Some(_) => {}
        }
        for (idx, pair) in units.windows(2).enumerate() {
            if !(pair[1] >= pair[0]) {
                return Err(OverwatchError::InvalidConfig(format!(
                    "unit distances must be sorted ascending: unit {} at {} km precedes unit {} at {} km",
                    idx,
                    pair[0],
                    idx + 1,
                    pair[1]
                )));
            }
        }
        if let Some(&last) = units.last() {
            if last > self.length.value() {
                return Err(OverwatchError::InvalidConfig(format!(
                    "unit at {last} km lies beyond the feeder end ({})",
                    self.length
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bases() {
        let config = FeederConfig::default();
        assert!((config.base_impedance().value() - 34.848).abs() < 1e-9);
        assert!((config.base_current().value() - 218.6938).abs() < 1e-3);
        assert!((config.source_impedance - Complex64::new(0.002, 0.0198)).norm() < 1e-12);
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_unsorted_units() {
        let config = FeederConfig {
            unit_distances_km: vec![0.0, 5.0, 2.0],
            ..FeederConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, OverwatchError::InvalidConfig(_)));
        assert!(err.to_string().contains("sorted ascending"));
    }

    #[test]
    fn test_rejects_unit_off_source() {
        let config = FeederConfig {
            unit_distances_km: vec![0.5, 3.0],
            ..FeederConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_base() {
        let config = FeederConfig {
            base_power: MegavoltAmperes(0.0),
            ..FeederConfig::default()
        };
        assert!(config.validate().unwrap_err().is_precondition());
    }

    #[test]
    fn test_rejects_unit_past_feeder_end() {
        let config = FeederConfig {
            unit_distances_km: vec![0.0, 12.0],
            ..FeederConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
