//! Optical property values passed through to the kernel unchanged

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A scalar or spectral optical property (reflectance, transmittance).
///
/// Bare floats become uniform spectra; mappings are forwarded verbatim to
/// the spectral layer, which owns their evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Spectrum {
    Uniform(f64),
    Spec(Map<String, Value>),
}

impl Default for Spectrum {
    fn default() -> Self {
        Spectrum::Uniform(0.5)
    }
}

impl From<f64> for Spectrum {
    fn from(value: f64) -> Self {
        Spectrum::Uniform(value)
    }
}

impl Spectrum {
    /// Kernel plugin specification for this spectrum
    pub fn kernel_dict(&self) -> Value {
        match self {
            Spectrum::Uniform(value) => json!({"type": "uniform", "value": value}),
            Spectrum::Spec(spec) => Value::Object(spec.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_half() {
        assert_eq!(Spectrum::default(), Spectrum::Uniform(0.5));
    }

    #[test]
    fn test_deserialize_float_and_mapping() {
        let s: Spectrum = serde_json::from_str("0.3").unwrap();
        assert_eq!(s, Spectrum::Uniform(0.3));

        let s: Spectrum =
            serde_json::from_str(r#"{"type": "interpolated", "values": [0.1, 0.2]}"#).unwrap();
        assert!(matches!(s, Spectrum::Spec(_)));
        assert_eq!(s.kernel_dict()["type"], "interpolated");
    }

    #[test]
    fn test_uniform_kernel_dict() {
        let v = Spectrum::from(0.25).kernel_dict();
        assert_eq!(v, json!({"type": "uniform", "value": 0.25}));
    }
}
