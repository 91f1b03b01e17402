//! Drill-sheet form

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FieldErrors, Validate};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::drill_sheet::measurement::{
    bridge_in_range, is_bit_size, MAX_BRIDGE_DISTANCE, MAX_HOLE_DEPTH, MIN_BRIDGE_DISTANCE,
};
use crate::entities::drill_sheet::migration::LEGACY_SPAN_KEY;
use crate::entities::drill_sheet::{
    effective_thumb_enabled, AdditionalHole, BridgeMeasurement, DrillSheet, FingerHole,
    GripStyle, HoleSize, Holes, SpanMeasurement, Spans,
};

/// Current values of the drill-sheet form
///
/// Also the layout accepted by `proshop drill new --file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillSheetDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<EntityId>,
    pub is_template: bool,
    pub grip_style: GripStyle,
    /// Stored thumb flag; the grip style can still force the thumb off
    pub thumb_enabled: bool,
    pub spans: Spans,
    /// Empty when the user cleared the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_distance: Option<f64>,
    pub thumb: FingerHole,
    pub middle: FingerHole,
    pub ring: FingerHole,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<AdditionalHole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EntityId>,
}

impl Default for DrillSheetDraft {
    /// A blank form: thumb on, bridge pre-filled with the default
    fn default() -> Self {
        Self {
            name: String::new(),
            customer_id: None,
            is_template: false,
            grip_style: GripStyle::default(),
            thumb_enabled: true,
            spans: Spans::default(),
            bridge_distance: Some(BridgeMeasurement::default().distance),
            thumb: FingerHole::default(),
            middle: FingerHole::default(),
            ring: FingerHole::default(),
            additional: Vec::new(),
            notes: None,
            employee_id: None,
        }
    }
}

impl DrillSheetDraft {
    /// Pre-fill the form from an existing sheet (edit, or start from a template)
    pub fn from_sheet(sheet: &DrillSheet) -> Self {
        Self {
            name: sheet.name.clone(),
            customer_id: sheet.customer_id.clone(),
            is_template: sheet.is_template,
            grip_style: sheet.grip_style,
            thumb_enabled: sheet.holes.thumb_enabled,
            spans: sheet.spans.clone(),
            bridge_distance: Some(sheet.bridge.distance),
            thumb: sheet.holes.thumb.clone().unwrap_or_default(),
            middle: sheet.holes.middle.clone(),
            ring: sheet.holes.ring.clone(),
            additional: sheet.holes.additional.clone(),
            notes: sheet.notes.clone(),
            employee_id: sheet.employee_id.clone(),
        }
    }

    /// Read a form document, accepting the legacy three-span layout
    ///
    /// A legacy `spans.middle_to_ring` fit span becomes the bridge distance
    /// unless the form also sets `bridge_distance`.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        let legacy = value
            .get_mut("spans")
            .and_then(Value::as_object_mut)
            .and_then(|spans| spans.remove(LEGACY_SPAN_KEY));
        let explicit = value.get("bridge_distance").is_some();
        let mut draft: DrillSheetDraft = serde_json::from_value(value)?;

        if let Some(legacy) = legacy {
            let span: Option<SpanMeasurement> = serde_json::from_value(legacy)?;
            if !explicit {
                if let Some(fit) = span.and_then(|s| s.fit_span) {
                    draft.bridge_distance = Some(fit);
                }
            }
            tracing::debug!(bridge = ?draft.bridge_distance, "read legacy drill sheet form");
        }
        Ok(draft)
    }

    pub fn thumb_enabled(&self) -> bool {
        effective_thumb_enabled(self.grip_style, self.thumb_enabled)
    }

    /// Build a new sheet from this draft
    ///
    /// Assumes the draft validated; the sheet is normalized before it is
    /// returned.
    pub fn into_sheet(self, author: String, pro_shop_id: String) -> DrillSheet {
        let mut sheet = DrillSheet::new(self.name.trim().to_string(), author);
        sheet.customer_id = self.customer_id;
        sheet.pro_shop_id = pro_shop_id;
        sheet.employee_id = self.employee_id;
        sheet.grip_style = self.grip_style;
        sheet.is_template = self.is_template;
        sheet.spans = self.spans;
        sheet.bridge = self
            .bridge_distance
            .map(BridgeMeasurement::new)
            .unwrap_or_default();
        sheet.holes = Holes {
            thumb_enabled: self.thumb_enabled,
            thumb: Some(self.thumb),
            middle: self.middle,
            ring: self.ring,
            additional: self.additional,
        };
        sheet.notes = self.notes.filter(|n| !super::is_blank(n));
        sheet.normalize();
        sheet
    }
}

impl Validate for DrillSheetDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if super::is_blank(&self.name) {
            errors.insert("name", "Name is required");
        }

        if !self.is_template {
            match &self.customer_id {
                None => errors.insert("customer_id", "Customer is required"),
                Some(id) if id.prefix() != EntityPrefix::Cust => {
                    errors.insert("customer_id", format!("{} is not a customer", id))
                }
                Some(_) => {}
            }
        }

        if self.thumb_enabled() {
            if !self.spans.has_thumb_fit_span() {
                errors.insert(
                    "spans",
                    "Thumb to middle or thumb to ring fit span is required",
                );
            }
            if !self.thumb.size.has_primary() {
                errors.insert("holes.thumb.size.primary", "Thumb hole size is required");
            }
        }

        match self.bridge_distance {
            None => errors.insert("bridge.distance", "Bridge distance is required"),
            Some(distance) if !bridge_in_range(distance) => errors.insert(
                "bridge.distance",
                format!(
                    "Bridge distance must be between {:.3}\" and {:.1}\"",
                    MIN_BRIDGE_DISTANCE, MAX_BRIDGE_DISTANCE
                ),
            ),
            Some(_) => {}
        }

        if !self.middle.size.has_primary() {
            errors.insert("holes.middle.size.primary", "Middle finger hole size is required");
        }
        if !self.ring.size.has_primary() {
            errors.insert("holes.ring.size.primary", "Ring finger hole size is required");
        }

        check_span(&mut errors, "spans.thumb_to_middle", &self.spans.thumb_to_middle);
        check_span(&mut errors, "spans.thumb_to_ring", &self.spans.thumb_to_ring);

        if self.thumb_enabled() {
            check_hole(&mut errors, "holes.thumb", &self.thumb);
        }
        check_hole(&mut errors, "holes.middle", &self.middle);
        check_hole(&mut errors, "holes.ring", &self.ring);
        for (i, hole) in self.additional.iter().enumerate() {
            check_size(&mut errors, &format!("holes.additional[{}].size", i), &hole.size);
        }

        errors
    }
}

fn check_span(errors: &mut FieldErrors, field: &str, span: &SpanMeasurement) {
    for (name, value) in span.values() {
        if !(value.is_finite() && value > 0.0) {
            errors.insert(
                format!("{}.{}", field, name),
                "Span must be a positive number",
            );
        }
    }
}

fn check_hole(errors: &mut FieldErrors, field: &str, hole: &FingerHole) {
    check_size(errors, &format!("{}.size", field), &hole.size);
    for (i, step) in hole.sequence.iter().enumerate() {
        if !is_bit_size(&step.bit_size) {
            errors.insert(
                format!("{}.sequence[{}].bit_size", field, i),
                format!("Unknown drill bit size: {}", step.bit_size),
            );
        }
        if let Some(depth) = step.depth {
            check_depth(errors, &format!("{}.sequence[{}].depth", field, i), depth);
        }
    }
}

fn check_size(errors: &mut FieldErrors, field: &str, size: &HoleSize) {
    if size.has_primary() && !is_bit_size(&size.primary) {
        errors.insert(
            format!("{}.primary", field),
            format!("Unknown drill bit size: {}", size.primary),
        );
    }
    if let Some(secondary) = size.secondary.as_deref().filter(|s| !super::is_blank(s)) {
        if !is_bit_size(secondary) {
            errors.insert(
                format!("{}.secondary", field),
                format!("Unknown drill bit size: {}", secondary),
            );
        }
    }
    if let Some(depth) = size.depth {
        check_depth(errors, &format!("{}.depth", field), depth);
    }
}

fn check_depth(errors: &mut FieldErrors, field: &str, depth: f64) {
    if !(0.0..=MAX_HOLE_DEPTH).contains(&depth) {
        errors.insert(
            field,
            format!("Depth must be between 0\" and {}\"", MAX_HOLE_DEPTH),
        );
    }
}
