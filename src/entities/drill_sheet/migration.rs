//! Legacy drill-sheet layout and its upgrade
//!
//! Version 1 sheets stored the middle-to-ring gap as a third finger span
//! (`spans.middle_to_ring`). The current layout replaces it with an explicit
//! [`BridgeMeasurement`]. Any stored document is decoded into
//! [`DrillSheetDocument`] and then upgraded with [`DrillSheetDocument::migrate`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{
    BridgeMeasurement, CustomSpan, DrillSheet, SpanMeasurement, Spans, CURRENT_SCHEMA_VERSION,
    DEFAULT_BRIDGE_DISTANCE,
};

/// Key that marks a document as using the legacy three-span layout
pub const LEGACY_SPAN_KEY: &str = "middle_to_ring";

/// Spans as stored by version 1 sheets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacySpans {
    #[serde(default)]
    pub thumb_to_middle: SpanMeasurement,

    #[serde(default)]
    pub thumb_to_ring: SpanMeasurement,

    /// Middle-to-ring span; may be present but null
    #[serde(default)]
    pub middle_to_ring: Option<SpanMeasurement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<CustomSpan>,
}

/// A version 1 sheet: the legacy spans plus every other current field
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDrillSheet {
    pub spans: LegacySpans,
    /// Remaining fields; its `spans` and `bridge` are replaced on migration
    pub sheet: DrillSheet,
}

/// A stored drill sheet in either layout
#[derive(Debug, Clone, PartialEq)]
pub enum DrillSheetDocument {
    Legacy(LegacyDrillSheet),
    Current(DrillSheet),
}

impl DrillSheetDocument {
    /// Decode a stored document, detecting its layout
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        let is_legacy = value
            .get("spans")
            .and_then(Value::as_object)
            .is_some_and(|spans| spans.contains_key(LEGACY_SPAN_KEY));

        if !is_legacy {
            return serde_json::from_value(value).map(DrillSheetDocument::Current);
        }

        let raw_spans = value
            .as_object_mut()
            .and_then(|obj| obj.remove("spans"))
            .unwrap_or(Value::Null);
        let spans: LegacySpans = serde_json::from_value(raw_spans)?;
        let sheet: DrillSheet = serde_json::from_value(value)?;

        Ok(DrillSheetDocument::Legacy(LegacyDrillSheet { spans, sheet }))
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, DrillSheetDocument::Legacy(_))
    }

    /// Upgrade to the current layout
    ///
    /// The bridge takes the legacy middle-to-ring fit span, or the default
    /// when none was recorded. Current documents pass through unchanged
    /// apart from the version stamp.
    pub fn migrate(self) -> DrillSheet {
        match self {
            DrillSheetDocument::Current(mut sheet) => {
                sheet.schema_version = CURRENT_SCHEMA_VERSION;
                sheet
            }
            DrillSheetDocument::Legacy(LegacyDrillSheet { spans, mut sheet }) => {
                let distance = spans
                    .middle_to_ring
                    .and_then(|span| span.fit_span)
                    .unwrap_or(DEFAULT_BRIDGE_DISTANCE);

                tracing::info!(
                    id = %sheet.id,
                    bridge = distance,
                    "migrated legacy drill sheet"
                );

                sheet.spans = Spans {
                    thumb_to_middle: spans.thumb_to_middle,
                    thumb_to_ring: spans.thumb_to_ring,
                    custom: spans.custom,
                };
                sheet.bridge = BridgeMeasurement::new(distance);
                sheet.schema_version = CURRENT_SCHEMA_VERSION;
                sheet
            }
        }
    }
}

impl From<DrillSheet> for DrillSheetDocument {
    fn from(sheet: DrillSheet) -> Self {
        DrillSheetDocument::Current(sheet)
    }
}

impl<'de> Deserialize<'de> for DrillSheetDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        DrillSheetDocument::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_yaml(middle_to_ring: &str) -> String {
        format!(
            r#"
id: DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: "Old sheet"
customer_id: CUST-01HC2JB7SMQX7RS1Y0GFKBHPTE
grip_style: conventional
spans:
  thumb_to_middle:
    fit_span: 4.5
  thumb_to_ring:
    fit_span: 4.75
{}
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
created: 2023-06-01T09:30:00Z
author: "J. Smith"
"#,
            middle_to_ring
        )
    }

    fn decode(yaml: &str) -> DrillSheetDocument {
        let value: Value = serde_yml::from_str(yaml).unwrap();
        DrillSheetDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_legacy_span_becomes_bridge() {
        let doc = decode(&legacy_yaml("  middle_to_ring:\n    fit_span: 0.3"));
        assert!(doc.is_legacy());

        let sheet = doc.migrate();
        assert_eq!(sheet.bridge.distance, 0.3);
        assert_eq!(sheet.spans.thumb_to_middle.fit_span, Some(4.5));
        assert_eq!(sheet.spans.thumb_to_ring.fit_span, Some(4.75));
        assert_eq!(sheet.schema_version, CURRENT_SCHEMA_VERSION);

        let yaml = serde_yml::to_string(&sheet).unwrap();
        assert!(!yaml.contains("middle_to_ring"));
    }

    #[test]
    fn test_legacy_without_fit_span_uses_default() {
        let doc = decode(&legacy_yaml("  middle_to_ring:\n    full_span: 0.5"));
        assert_eq!(doc.migrate().bridge.distance, DEFAULT_BRIDGE_DISTANCE);
    }

    #[test]
    fn test_legacy_with_null_span_uses_default() {
        let doc = decode(&legacy_yaml("  middle_to_ring: null"));
        assert!(doc.is_legacy());
        assert_eq!(doc.migrate().bridge.distance, DEFAULT_BRIDGE_DISTANCE);
    }

    #[test]
    fn test_current_document_is_not_legacy() {
        let doc = decode(&legacy_yaml("bridge:\n  distance: 0.375"));
        assert!(!doc.is_legacy());
        assert_eq!(doc.migrate().bridge.distance, 0.375);
    }

    #[test]
    fn test_migration_is_idempotent() {
        let once = decode(&legacy_yaml("  middle_to_ring:\n    fit_span: 0.3")).migrate();
        let value = serde_json::to_value(&once).unwrap();
        let twice = DrillSheetDocument::from_value(value).unwrap().migrate();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_document_deserializes_from_yaml() {
        let doc: DrillSheetDocument =
            serde_yml::from_str(&legacy_yaml("  middle_to_ring:\n    fit_span: 0.3")).unwrap();
        assert!(doc.is_legacy());
    }
}
