//! Measurement value objects for drill sheets
//!
//! All lengths are in inches.

use serde::{Deserialize, Serialize};

/// Bridge distance used when a sheet does not record one
pub const DEFAULT_BRIDGE_DISTANCE: f64 = 0.25;

/// Smallest bridge the shop will drill
pub const MIN_BRIDGE_DISTANCE: f64 = 0.125;

/// Largest bridge the shop will drill
pub const MAX_BRIDGE_DISTANCE: f64 = 1.0;

/// Deepest hole a drill sheet may specify
pub const MAX_HOLE_DEPTH: f64 = 4.0;

/// Drill-bit sizes stocked by the shop, in 64ths from 5/16" to 1 1/4"
pub const BIT_SIZES: &[&str] = &[
    "5/16", "21/64", "11/32", "23/64", "3/8", "25/64", "13/32", "27/64", "7/16", "29/64",
    "15/32", "31/64", "1/2", "33/64", "17/32", "35/64", "9/16", "37/64", "19/32", "39/64",
    "5/8", "41/64", "21/32", "43/64", "11/16", "45/64", "23/32", "47/64", "3/4", "49/64",
    "25/32", "51/64", "13/16", "53/64", "27/32", "55/64", "7/8", "57/64", "29/32", "59/64",
    "15/16", "61/64", "31/32", "63/64", "1", "1 1/64", "1 1/32", "1 3/64", "1 1/16",
    "1 5/64", "1 3/32", "1 7/64", "1 1/8", "1 9/64", "1 5/32", "1 11/64", "1 3/16",
    "1 13/64", "1 7/32", "1 15/64", "1 1/4",
];

/// Check whether a size string names a stocked drill bit
///
/// Surrounding whitespace and a trailing inch mark are ignored.
pub fn is_bit_size(size: &str) -> bool {
    let normalized = size.trim().trim_end_matches('"').trim();
    BIT_SIZES.contains(&normalized)
}

/// Distance between two hole centers, measured up to three ways
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanMeasurement {
    /// Fit span, the canonical value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_span: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_span: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cut_to_cut_span: Option<f64>,
}

impl SpanMeasurement {
    /// A span with only the fit value recorded
    pub fn fit(value: f64) -> Self {
        Self {
            fit_span: Some(value),
            ..Self::default()
        }
    }

    /// The value used wherever a single span number is needed
    pub fn canonical(&self) -> Option<f64> {
        self.fit_span
    }

    pub fn is_empty(&self) -> bool {
        self.fit_span.is_none() && self.full_span.is_none() && self.cut_to_cut_span.is_none()
    }

    /// Recorded values, labelled, in declaration order
    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("fit_span", self.fit_span),
            ("full_span", self.full_span),
            ("cut_to_cut_span", self.cut_to_cut_span),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
    }
}

/// Gap between the middle and ring finger holes
///
/// Independent of the finger spans: it cannot be derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeMeasurement {
    #[serde(default = "default_bridge_distance")]
    pub distance: f64,
}

fn default_bridge_distance() -> f64 {
    DEFAULT_BRIDGE_DISTANCE
}

impl Default for BridgeMeasurement {
    fn default() -> Self {
        Self {
            distance: DEFAULT_BRIDGE_DISTANCE,
        }
    }
}

impl BridgeMeasurement {
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }
}

/// Inclusive range check for a bridge distance. NaN is out of range.
pub fn bridge_in_range(distance: f64) -> bool {
    (MIN_BRIDGE_DISTANCE..=MAX_BRIDGE_DISTANCE).contains(&distance)
}

/// Bit sizes and depth for a single hole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleSize {
    /// Bit size, e.g. "31/64"
    #[serde(default)]
    pub primary: String,

    /// Second bit for oval or stepped thumb holes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl HoleSize {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            ..Self::default()
        }
    }

    pub fn has_primary(&self) -> bool {
        !self.primary.trim().is_empty()
    }
}

/// Hole pitch relative to the surface normal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral: Option<f64>,
}

impl Pitch {
    pub fn is_empty(&self) -> bool {
        self.forward.is_none() && self.lateral.is_none()
    }
}

/// One pass of the drilling sequence for a hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillStep {
    pub step: u32,
    pub bit_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

/// A finger or thumb hole specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerHole {
    #[serde(default)]
    pub size: HoleSize,

    #[serde(default, skip_serializing_if = "Pitch::is_empty")]
    pub pitch: Pitch,

    /// Ordered drilling passes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<DrillStep>,
}

impl FingerHole {
    /// A hole with just a primary bit size
    pub fn sized(primary: impl Into<String>) -> Self {
        Self {
            size: HoleSize::new(primary),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_size_table() {
        assert!(is_bit_size("31/64"));
        assert!(is_bit_size(" 1 1/16\" "));
        assert!(is_bit_size("1"));
        assert!(!is_bit_size("1/4"));
        assert!(!is_bit_size("31/63"));
        assert!(!is_bit_size(""));
    }

    #[test]
    fn test_bridge_range_is_inclusive() {
        assert!(bridge_in_range(0.125));
        assert!(bridge_in_range(1.0));
        assert!(!bridge_in_range(0.1));
        assert!(!bridge_in_range(1.0625));
        assert!(!bridge_in_range(f64::NAN));
    }

    #[test]
    fn test_bridge_defaults_when_distance_missing() {
        let bridge: BridgeMeasurement = serde_yml::from_str("{}").unwrap();
        assert_eq!(bridge.distance, DEFAULT_BRIDGE_DISTANCE);
    }

    #[test]
    fn test_span_values_skip_missing() {
        let span = SpanMeasurement {
            fit_span: Some(4.25),
            cut_to_cut_span: Some(3.5),
            ..SpanMeasurement::default()
        };
        let values: Vec<_> = span.values().collect();
        assert_eq!(values, vec![("fit_span", 4.25), ("cut_to_cut_span", 3.5)]);
        assert_eq!(span.canonical(), Some(4.25));
    }

    #[test]
    fn test_finger_hole_omits_empty_parts() {
        let yaml = serde_yml::to_string(&FingerHole::sized("31/64")).unwrap();
        assert!(yaml.contains("31/64"));
        assert!(!yaml.contains("pitch"));
        assert!(!yaml.contains("sequence"));
    }
}
