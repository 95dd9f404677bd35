//! Unit configuration threaded through generation and emission calls.
//!
//! All lengths are stored internally in metres. `UnitConfig` describes the
//! unit in which caller-supplied lengths are expressed, and
//! `KernelDictContext` the unit the rendering kernel expects in emitted
//! scene dictionaries.

use serde::{Deserialize, Serialize};

/// Supported length units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "cm")]
    Centimeter,
    #[default]
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "km")]
    Kilometer,
}

impl LengthUnit {
    /// Number of metres in one unit
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1e-3,
            LengthUnit::Centimeter => 1e-2,
            LengthUnit::Meter => 1.0,
            LengthUnit::Kilometer => 1e3,
        }
    }

    /// Convert a value expressed in this unit to metres
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            _ => value * self.meters_per_unit(),
        }
    }

    /// Convert a value in metres to this unit
    pub fn from_meters(self, value: f64) -> f64 {
        match self {
            LengthUnit::Meter => value,
            _ => value / self.meters_per_unit(),
        }
    }

    /// Unit symbol
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
            LengthUnit::Kilometer => "km",
        }
    }
}

/// Units in which user-facing parameters are expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitConfig {
    /// Length unit of leaf radii, extents, sizes and instance positions
    pub length: LengthUnit,
}

impl UnitConfig {
    pub fn new(length: LengthUnit) -> Self {
        Self { length }
    }

    /// Convert a config-unit length to metres
    pub fn length_to_meters(&self, value: f64) -> f64 {
        self.length.to_meters(value)
    }
}

/// Parameters relevant for kernel dictionary generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelDictContext {
    /// Emit BSDFs once and refer to them by id from shapes
    #[serde(rename = "ref")]
    pub ref_bsdfs: bool,
    /// Length unit expected by the kernel
    pub kernel_length: LengthUnit,
}

impl Default for KernelDictContext {
    fn default() -> Self {
        Self {
            ref_bsdfs: true,
            kernel_length: LengthUnit::Meter,
        }
    }
}

impl KernelDictContext {
    /// Context with BSDFs inlined into each shape
    pub fn inline() -> Self {
        Self {
            ref_bsdfs: false,
            ..Self::default()
        }
    }

    /// Convert an internal length (metres) to kernel units
    pub fn kernel_length(&self, meters: f64) -> f64 {
        self.kernel_length.from_meters(meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion() {
        assert_eq!(LengthUnit::Meter.to_meters(2.5), 2.5);
        assert!((LengthUnit::Centimeter.to_meters(250.0) - 2.5).abs() < 1e-12);
        assert!((LengthUnit::Kilometer.from_meters(1500.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_symbol_matches_serialized_name() {
        for unit in [
            LengthUnit::Millimeter,
            LengthUnit::Centimeter,
            LengthUnit::Meter,
            LengthUnit::Kilometer,
        ] {
            assert_eq!(serde_json::to_value(unit).unwrap(), unit.symbol());
        }
    }

    #[test]
    fn test_unit_config_from_json() {
        let cfg: UnitConfig = serde_json::from_str(r#"{"length": "cm"}"#).unwrap();
        assert_eq!(cfg.length, LengthUnit::Centimeter);
        assert!((cfg.length_to_meters(10.0) - 0.1).abs() < 1e-12);

        let empty: UnitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, UnitConfig::default());
    }

    #[test]
    fn test_kernel_context_defaults() {
        let ctx: KernelDictContext = serde_json::from_str("{}").unwrap();
        assert!(ctx.ref_bsdfs);
        assert_eq!(ctx.kernel_length, LengthUnit::Meter);

        let ctx: KernelDictContext =
            serde_json::from_str(r#"{"ref": false, "kernel_length": "km"}"#).unwrap();
        assert!(!ctx.ref_bsdfs);
        assert!((ctx.kernel_length(2000.0) - 2.0).abs() < 1e-12);
    }
}
