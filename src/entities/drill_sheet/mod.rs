//! DRL entity type - Drill sheet
//!
//! A drill sheet records how a customer's ball is laid out and drilled:
//! the grip style, the finger spans, the bridge between the middle and ring
//! fingers, and the bit sizes, pitches and drilling passes for each hole.
//!
//! Templates are sheets with no owning customer, used as starting points.

pub mod measurement;
pub mod migration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

pub use measurement::{
    BridgeMeasurement, DrillStep, FingerHole, HoleSize, Pitch, SpanMeasurement,
    DEFAULT_BRIDGE_DISTANCE,
};
pub use migration::{DrillSheetDocument, LegacyDrillSheet, LegacySpans};

/// Current on-disk layout version for drill sheets
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// How the bowler grips the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripStyle {
    Conventional,
    Fingertip,
    /// Two-handed delivery with no thumb hole
    TwoHandedNoThumb,
}

impl Default for GripStyle {
    fn default() -> Self {
        GripStyle::Conventional
    }
}

impl GripStyle {
    /// Whether this grip can use a thumb hole at all
    pub fn allows_thumb(&self) -> bool {
        !matches!(self, GripStyle::TwoHandedNoThumb)
    }

    pub fn all() -> &'static [GripStyle] {
        &[
            GripStyle::Conventional,
            GripStyle::Fingertip,
            GripStyle::TwoHandedNoThumb,
        ]
    }
}

impl std::fmt::Display for GripStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GripStyle::Conventional => write!(f, "conventional"),
            GripStyle::Fingertip => write!(f, "fingertip"),
            GripStyle::TwoHandedNoThumb => write!(f, "two_handed_no_thumb"),
        }
    }
}

impl std::str::FromStr for GripStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "conventional" | "conv" => Ok(GripStyle::Conventional),
            "fingertip" | "tip" => Ok(GripStyle::Fingertip),
            "two_handed_no_thumb" | "two_handed" | "2h" => Ok(GripStyle::TwoHandedNoThumb),
            _ => Err(format!(
                "Invalid grip style: {}. Use conventional, fingertip, or two_handed_no_thumb",
                s
            )),
        }
    }
}

/// Whether the thumb hole is in effect for a grip style and stored flag
///
/// A two-handed grip never has a thumb hole, whatever the flag says.
pub fn effective_thumb_enabled(grip_style: GripStyle, thumb_enabled: bool) -> bool {
    grip_style.allows_thumb() && thumb_enabled
}

/// A labelled span beyond the two standard ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSpan {
    pub label: String,
    #[serde(default)]
    pub span: SpanMeasurement,
}

/// Finger spans measured from the thumb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spans {
    #[serde(default)]
    pub thumb_to_middle: SpanMeasurement,

    #[serde(default)]
    pub thumb_to_ring: SpanMeasurement,

    /// Extra labelled spans (not used by any rule)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomSpan>,
}

impl Spans {
    /// True when at least one thumb span has a fit value
    pub fn has_thumb_fit_span(&self) -> bool {
        self.thumb_to_middle.fit_span.is_some() || self.thumb_to_ring.fit_span.is_some()
    }
}

/// Purpose of an extra hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalHoleKind {
    Balance,
    Weight,
    Vent,
}

impl std::fmt::Display for AdditionalHoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdditionalHoleKind::Balance => write!(f, "balance"),
            AdditionalHoleKind::Weight => write!(f, "weight"),
            AdditionalHoleKind::Vent => write!(f, "vent"),
        }
    }
}

/// Position on the layout, in inches from the grip center
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HolePosition {
    pub x: f64,
    pub y: f64,
}

/// Balance, weight or vent hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalHole {
    pub kind: AdditionalHoleKind,
    #[serde(default)]
    pub size: HoleSize,
    pub position: HolePosition,
}

/// Hole layout for a sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Holes {
    /// Stored thumb flag; see [`effective_thumb_enabled`]
    #[serde(default = "default_true")]
    pub thumb_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<FingerHole>,

    pub middle: FingerHole,

    pub ring: FingerHole,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<AdditionalHole>,
}

fn default_true() -> bool {
    true
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Drill sheet entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillSheet {
    /// Unique identifier (DRL-xxx)
    pub id: EntityId,

    /// Layout version of this document
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,

    /// Sheet name, e.g. "League ball - 2024"
    pub name: String,

    /// Owning customer (absent for templates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,

    /// Owning pro shop
    #[serde(default)]
    pub pro_shop_id: String,

    /// Employee who took the measurements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EntityId>,

    #[serde(default)]
    pub grip_style: GripStyle,

    /// Reusable starting layout, not tied to a customer
    #[serde(default)]
    pub is_template: bool,

    #[serde(default)]
    pub spans: Spans,

    /// Always present; 0.25" when not recorded
    #[serde(default)]
    pub bridge: BridgeMeasurement,

    pub holes: Holes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    pub author: String,
}

impl Entity for DrillSheet {
    const PREFIX: EntityPrefix = EntityPrefix::Drl;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn pro_shop_id(&self) -> &str {
        &self.pro_shop_id
    }

    fn customer_id(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }

    /// Drill sheets always decode through the migration so that legacy
    /// three-span documents come back in the current layout.
    fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        DrillSheetDocument::from_value(value).map(DrillSheetDocument::migrate)
    }
}

impl DrillSheet {
    /// Create an empty sheet with the given name
    pub fn new(name: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Drl),
            schema_version: CURRENT_SCHEMA_VERSION,
            name,
            customer_id: None,
            pro_shop_id: String::new(),
            employee_id: None,
            grip_style: GripStyle::default(),
            is_template: false,
            spans: Spans::default(),
            bridge: BridgeMeasurement::default(),
            holes: Holes {
                thumb_enabled: true,
                ..Holes::default()
            },
            notes: None,
            created: Utc::now(),
            updated: None,
            author,
        }
    }

    /// Whether the thumb hole is in effect for this sheet
    pub fn thumb_enabled(&self) -> bool {
        effective_thumb_enabled(self.grip_style, self.holes.thumb_enabled)
    }

    /// Bring the sheet in line with its invariants
    ///
    /// - a disabled thumb (by flag or by grip) has no thumb hole; the stored
    ///   flag itself is left alone
    /// - templates have no owning customer
    pub fn normalize(&mut self) {
        if !self.thumb_enabled() {
            self.holes.thumb = None;
        }
        if self.is_template {
            self.customer_id = None;
        }
        self.schema_version = CURRENT_SCHEMA_VERSION;
    }

    /// Canonical thumb-to-middle span, if recorded
    pub fn thumb_to_middle(&self) -> Option<f64> {
        self.spans.thumb_to_middle.canonical()
    }

    /// Canonical thumb-to-ring span, if recorded
    pub fn thumb_to_ring(&self) -> Option<f64> {
        self.spans.thumb_to_ring.canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> DrillSheet {
        let mut sheet = DrillSheet::new("League ball".to_string(), "Test Author".to_string());
        sheet.grip_style = GripStyle::Fingertip;
        sheet.spans.thumb_to_middle = SpanMeasurement::fit(4.40);
        sheet.holes.thumb = Some(FingerHole::sized("31/64"));
        sheet.holes.middle = FingerHole::sized("31/64");
        sheet.holes.ring = FingerHole::sized("31/64");
        sheet
    }

    #[test]
    fn test_new_sheet_defaults() {
        let sheet = DrillSheet::new("Blank".to_string(), "Test Author".to_string());
        assert!(sheet.id.to_string().starts_with("DRL-"));
        assert_eq!(sheet.bridge.distance, DEFAULT_BRIDGE_DISTANCE);
        assert_eq!(sheet.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(sheet.holes.thumb_enabled);
    }

    #[test]
    fn test_two_handed_forces_thumb_off() {
        for flag in [true, false] {
            assert!(!effective_thumb_enabled(GripStyle::TwoHandedNoThumb, flag));
        }
        assert!(effective_thumb_enabled(GripStyle::Conventional, true));
        assert!(!effective_thumb_enabled(GripStyle::Fingertip, false));

        let mut sheet = sample_sheet();
        sheet.grip_style = GripStyle::TwoHandedNoThumb;
        assert!(sheet.holes.thumb_enabled);
        assert!(!sheet.thumb_enabled());
    }

    #[test]
    fn test_normalize_drops_disabled_thumb_and_template_customer() {
        let mut sheet = sample_sheet();
        sheet.grip_style = GripStyle::TwoHandedNoThumb;
        sheet.is_template = true;
        sheet.customer_id = Some(EntityId::new(EntityPrefix::Cust));
        sheet.normalize();

        assert!(sheet.holes.thumb_enabled);
        assert!(sheet.holes.thumb.is_none());
        assert!(sheet.customer_id.is_none());

        let mut unflagged = sample_sheet();
        unflagged.holes.thumb_enabled = false;
        unflagged.normalize();
        assert!(unflagged.holes.thumb.is_none());
        assert!(!unflagged.holes.thumb_enabled);
    }

    #[test]
    fn test_grip_style_parsing() {
        assert_eq!("fingertip".parse::<GripStyle>().unwrap(), GripStyle::Fingertip);
        assert_eq!(
            "two-handed".parse::<GripStyle>().unwrap(),
            GripStyle::TwoHandedNoThumb
        );
        assert!("palm".parse::<GripStyle>().is_err());
    }

    #[test]
    fn test_sheet_serialization() {
        let sheet = sample_sheet();
        let yaml = serde_yml::to_string(&sheet).unwrap();
        assert!(yaml.contains("grip_style: fingertip"));
        assert!(yaml.contains("bridge:"));
        assert!(!yaml.contains("middle_to_ring"));

        let parsed: DrillSheet = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sheet);
    }

    #[test]
    fn test_sheet_deserialization_defaults_bridge() {
        let yaml = r#"
id: DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: "House ball"
grip_style: conventional
spans:
  thumb_to_middle:
    fit_span: 4.5
holes:
  thumb:
    size:
      primary: "1"
  middle:
    size:
      primary: "31/64"
  ring:
    size:
      primary: "31/64"
created: 2024-01-15T10:00:00Z
author: "J. Smith"
"#;
        let sheet: DrillSheet = serde_yml::from_str(yaml).unwrap();
        assert_eq!(sheet.bridge.distance, 0.25);
        assert!(sheet.holes.thumb_enabled);
        assert_eq!(sheet.thumb_to_middle(), Some(4.5));
        assert_eq!(sheet.schema_version, CURRENT_SCHEMA_VERSION);
    }
}
