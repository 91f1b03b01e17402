//! Save flows: validate, build, persist
//!
//! These functions are the only writers of records. They work against any
//! [`RecordStore`], so the rules here do not depend on where records live.

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::store::{RecordStore, StoreError};
use crate::entities::ball::{BallStatus, BowlingBall};
use crate::entities::customer::Customer;
use crate::entities::drill_sheet::{DrillSheet, DrillSheetDocument};
use crate::entities::employee::Employee;
use crate::entities::location::Location;
use crate::entities::work_order::WorkOrder;
use crate::forms::{
    BallDraft, CustomerDraft, DrillSheetDraft, FieldErrors, Validate, WorkOrderDraft,
};

/// Who is saving, and for which shop
#[derive(Debug, Clone)]
pub struct SaveContext {
    pub author: String,
    pub pro_shop_id: String,
}

/// Why a save did not happen
#[derive(Debug, Error)]
pub enum SaveError {
    /// The input broke one or more form rules; nothing was written
    #[error("validation failed:\n{0}")]
    Invalid(FieldErrors),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The merged document is not a valid record
    #[error("record is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<FieldErrors> for SaveError {
    fn from(errors: FieldErrors) -> Self {
        SaveError::Invalid(errors)
    }
}

/// Merge `patch` into `target`
///
/// Objects merge key by key, recursively. A `null` in the patch removes the
/// key. Anything else (scalars, arrays) replaces the target value.
pub fn merge_patch(target: &mut Value, patch: Value) {
    let Value::Object(patch) = patch else {
        *target = patch;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in patch {
            if value.is_null() {
                map.remove(&key);
            } else {
                merge_patch(map.entry(key).or_insert(Value::Null), value);
            }
        }
    }
}

/// Check that `id`, when given, names an existing record of type `T`
fn check_reference<T: Entity, S: RecordStore>(
    store: &S,
    errors: &mut FieldErrors,
    field: &str,
    id: Option<&EntityId>,
) -> Result<Option<T>, SaveError> {
    let Some(id) = id else {
        return Ok(None);
    };
    if id.prefix() != T::PREFIX {
        errors.insert(field, format!("{} is not a {}", id, T::PREFIX.label()));
        return Ok(None);
    }
    let found = store.get::<T>(id)?;
    if found.is_none() {
        errors.insert(field, format!("{} {} not found", T::PREFIX.label(), id));
    }
    Ok(found)
}

pub fn create_customer<S: RecordStore>(
    store: &mut S,
    draft: CustomerDraft,
    ctx: &SaveContext,
) -> Result<Customer, SaveError> {
    draft.validate().into_result()?;
    let customer = draft.into_customer(ctx.author.clone(), ctx.pro_shop_id.clone());
    store.put(&customer)?;
    tracing::info!(id = %customer.id, "created customer");
    Ok(customer)
}

pub fn create_ball<S: RecordStore>(
    store: &mut S,
    draft: BallDraft,
    ctx: &SaveContext,
) -> Result<BowlingBall, SaveError> {
    let mut errors = draft.validate();
    check_reference::<Customer, _>(store, &mut errors, "customer_id", draft.customer_id.as_ref())?;
    check_reference::<DrillSheet, _>(
        store,
        &mut errors,
        "drill_sheet_id",
        draft.drill_sheet_id.as_ref(),
    )?;
    errors.into_result()?;

    let ball = draft.into_ball(ctx.author.clone(), ctx.pro_shop_id.clone())?;
    store.put(&ball)?;
    tracing::info!(id = %ball.id, "created ball");
    Ok(ball)
}

/// Change a ball's status; any status may follow any other
pub fn set_ball_status<S: RecordStore>(
    store: &mut S,
    id: &EntityId,
    status: BallStatus,
) -> Result<BowlingBall, SaveError> {
    let mut ball: BowlingBall = store
        .get(id)?
        .ok_or_else(|| SaveError::NotFound(id.to_string()))?;
    ball.set_status(status);
    store.put(&ball)?;
    Ok(ball)
}

/// Validate a drill-sheet draft and store it as a new sheet
pub fn create_drill_sheet<S: RecordStore>(
    store: &mut S,
    draft: DrillSheetDraft,
    ctx: &SaveContext,
) -> Result<DrillSheet, SaveError> {
    let mut errors = draft.validate();
    if !draft.is_template {
        check_reference::<Customer, _>(store, &mut errors, "customer_id", draft.customer_id.as_ref())?;
    }
    check_reference::<Employee, _>(store, &mut errors, "employee_id", draft.employee_id.as_ref())?;
    errors.into_result()?;

    let sheet = draft.into_sheet(ctx.author.clone(), ctx.pro_shop_id.clone());
    store.put(&sheet)?;
    tracing::info!(id = %sheet.id, template = sheet.is_template, "created drill sheet");
    Ok(sheet)
}

/// Apply a partial update to a stored drill sheet
///
/// Fields missing from `patch` keep their stored values. The stored sheet is
/// brought to the current layout before the patch is merged, so a legacy
/// middle-to-ring span never overrides a patched bridge; a patch that itself
/// carries the legacy span is migrated before it is checked.
/// `id`, `created` and `author` cannot be changed.
pub fn update_drill_sheet<S: RecordStore>(
    store: &mut S,
    id: &EntityId,
    patch: Value,
) -> Result<DrillSheet, SaveError> {
    let stored = store
        .get_value(id)?
        .ok_or_else(|| SaveError::NotFound(id.to_string()))?;
    let original = DrillSheet::from_value(stored).map_err(SaveError::Malformed)?;

    let mut merged = serde_json::to_value(&original).map_err(SaveError::Malformed)?;
    merge_patch(&mut merged, patch);
    let document = DrillSheetDocument::from_value(merged).map_err(SaveError::Malformed)?;
    if document.is_legacy() {
        tracing::debug!(%id, "update carries legacy spans");
    }

    let mut sheet = document.migrate();
    sheet.id = original.id;
    sheet.created = original.created;
    sheet.author = original.author;

    DrillSheetDraft::from_sheet(&sheet).validate().into_result()?;

    sheet.normalize();
    sheet.updated = Some(Utc::now());
    store.put(&sheet)?;
    tracing::info!(id = %sheet.id, "updated drill sheet");
    Ok(sheet)
}

/// Outcome of [`migrate_drill_sheets`]
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Sheets that were (or would be) rewritten
    pub migrated: Vec<EntityId>,
    /// Sheets already in the current layout
    pub current: usize,
    /// Sheets that could not be decoded at all
    pub failed: Vec<(EntityId, String)>,
}

/// Rewrite every legacy drill sheet in the current layout
pub fn migrate_drill_sheets<S: RecordStore>(
    store: &mut S,
    dry_run: bool,
) -> Result<MigrationReport, SaveError> {
    let mut report = MigrationReport::default();

    for (id, value) in store.list_values(EntityPrefix::Drl)? {
        let document = match DrillSheetDocument::from_value(value) {
            Ok(doc) => doc,
            Err(e) => {
                report.failed.push((id, e.to_string()));
                continue;
            }
        };
        if !document.is_legacy() {
            report.current += 1;
            continue;
        }
        if !dry_run {
            store.put(&document.migrate())?;
        }
        report.migrated.push(id);
    }

    Ok(report)
}

/// Hourly rate of the employee assigned to a work order, if any
fn hourly_rate<S: RecordStore>(
    store: &S,
    employee_id: Option<&EntityId>,
) -> Result<Option<f64>, SaveError> {
    match employee_id {
        Some(id) if id.prefix() == EntityPrefix::Emp => {
            Ok(store.get::<Employee>(id)?.and_then(|e| e.hourly_rate))
        }
        _ => Ok(None),
    }
}

pub fn create_work_order<S: RecordStore>(
    store: &mut S,
    draft: WorkOrderDraft,
    ctx: &SaveContext,
) -> Result<WorkOrder, SaveError> {
    let mut errors = draft.validate();
    check_reference::<Customer, _>(store, &mut errors, "customer_id", draft.customer_id.as_ref())?;
    let employee =
        check_reference::<Employee, _>(store, &mut errors, "employee_id", draft.employee_id.as_ref())?;
    check_reference::<BowlingBall, _>(store, &mut errors, "ball_id", draft.ball_id.as_ref())?;
    check_reference::<DrillSheet, _>(
        store,
        &mut errors,
        "drill_sheet_id",
        draft.drill_sheet_id.as_ref(),
    )?;
    check_reference::<Location, _>(store, &mut errors, "location_id", draft.location_id.as_ref())?;
    errors.into_result()?;

    let rate = employee.and_then(|e| e.hourly_rate);
    let wo = draft
        .into_work_order(ctx.author.clone(), ctx.pro_shop_id.clone(), rate)
        .ok_or_else(|| SaveError::Invalid(required("customer_id", "Customer is required")))?;
    store.put(&wo)?;
    tracing::info!(id = %wo.id, total = wo.total_cost, "created work order");
    Ok(wo)
}

fn required(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field, message);
    errors
}

/// Changes to an existing work order; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct WorkOrderChanges {
    pub description: Option<String>,
    pub employee_id: Option<EntityId>,
    pub labor_hours: Option<f64>,
    /// Manual labor cost, kept until hours or employee change
    pub labor_cost: Option<f64>,
    pub materials_cost: Option<f64>,
    pub quality_checked: Option<bool>,
    pub satisfaction: Option<u8>,
    pub notes: Option<String>,
}

/// Apply changes to a work order, re-deriving its costs
pub fn update_work_order<S: RecordStore>(
    store: &mut S,
    id: &EntityId,
    changes: WorkOrderChanges,
) -> Result<WorkOrder, SaveError> {
    let mut wo: WorkOrder = store
        .get(id)?
        .ok_or_else(|| SaveError::NotFound(id.to_string()))?;

    let mut errors = FieldErrors::new();
    check_reference::<Employee, _>(store, &mut errors, "employee_id", changes.employee_id.as_ref())?;
    errors.into_result()?;

    if let Some(description) = changes.description {
        wo.description = description;
    }
    if let Some(checked) = changes.quality_checked {
        wo.quality_checked = checked;
    }
    if changes.satisfaction.is_some() {
        wo.satisfaction = changes.satisfaction;
    }
    if changes.notes.is_some() {
        wo.notes = changes.notes;
    }
    if changes.labor_cost.is_some() {
        wo.set_labor_cost(changes.labor_cost);
    }
    if changes.materials_cost.is_some() {
        wo.set_materials_cost(changes.materials_cost);
    }

    if let Some(employee_id) = changes.employee_id {
        let rate = hourly_rate(store, Some(&employee_id))?;
        wo.assign_employee(Some(employee_id), rate);
    }
    if changes.labor_hours.is_some() {
        let rate = hourly_rate(store, wo.employee_id.as_ref())?;
        wo.set_labor_hours(changes.labor_hours, rate);
    }

    WorkOrderDraft::from_work_order(&wo).validate().into_result()?;

    wo.updated = Some(Utc::now());
    store.put(&wo)?;
    tracing::info!(id = %wo.id, total = wo.total_cost, "updated work order");
    Ok(wo)
}

pub fn create_employee<S: RecordStore>(
    store: &mut S,
    mut employee: Employee,
    ctx: &SaveContext,
) -> Result<Employee, SaveError> {
    let mut errors = FieldErrors::new();
    if employee.name.trim().is_empty() {
        errors.insert("name", "Name is required");
    }
    if let Some(rate) = employee.hourly_rate {
        if !(rate.is_finite() && rate >= 0.0) {
            errors.insert("hourly_rate", "Hourly rate must be zero or more");
        }
    }
    check_reference::<Location, _>(store, &mut errors, "location_id", employee.location_id.as_ref())?;
    errors.into_result()?;

    employee.author = ctx.author.clone();
    employee.pro_shop_id = ctx.pro_shop_id.clone();
    store.put(&employee)?;
    tracing::info!(id = %employee.id, role = %employee.role, "created employee");
    Ok(employee)
}

pub fn create_location<S: RecordStore>(
    store: &mut S,
    mut location: Location,
    ctx: &SaveContext,
) -> Result<Location, SaveError> {
    if location.name.trim().is_empty() {
        return Err(SaveError::Invalid(required("name", "Name is required")));
    }
    location.author = ctx.author.clone();
    location.pro_shop_id = ctx.pro_shop_id.clone();
    store.put(&location)?;
    tracing::info!(id = %location.id, "created location");
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{MemoryStore, RecordFilter};
    use crate::core::team::Role;
    use crate::entities::drill_sheet::{FingerHole, GripStyle, SpanMeasurement, Spans};
    use serde_json::json;

    fn ctx() -> SaveContext {
        SaveContext {
            author: "Test Author".to_string(),
            pro_shop_id: "main".to_string(),
        }
    }

    fn customer(store: &mut MemoryStore) -> Customer {
        create_customer(
            store,
            CustomerDraft {
                name: "Pat Rivera".to_string(),
                ..CustomerDraft::default()
            },
            &ctx(),
        )
        .unwrap()
    }

    fn fingertip_draft(customer_id: EntityId) -> DrillSheetDraft {
        DrillSheetDraft {
            name: "League ball".to_string(),
            customer_id: Some(customer_id),
            grip_style: GripStyle::Fingertip,
            spans: Spans {
                thumb_to_middle: SpanMeasurement::fit(4.40),
                ..Spans::default()
            },
            bridge_distance: Some(0.25),
            thumb: FingerHole::sized("31/64"),
            middle: FingerHole::sized("31/64"),
            ring: FingerHole::sized("31/64"),
            ..DrillSheetDraft::default()
        }
    }

    #[test]
    fn test_fingertip_sheet_end_to_end() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);

        let before = Utc::now();
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id.clone()), &ctx()).unwrap();

        assert!(sheet.id.to_string().starts_with("DRL-"));
        assert!(sheet.created >= before);
        assert_eq!(sheet.bridge.distance, 0.25);
        assert_eq!(sheet.author, "Test Author");

        let stored: DrillSheet = store.get(&sheet.id).unwrap().unwrap();
        assert_eq!(stored, sheet);
    }

    #[test]
    fn test_invalid_draft_is_not_stored() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let mut draft = fingertip_draft(cust.id);
        draft.bridge_distance = Some(0.1);

        let err = create_drill_sheet(&mut store, draft, &ctx()).unwrap_err();
        let SaveError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.contains("bridge.distance"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_customer_is_reported() {
        let mut store = MemoryStore::new();
        let draft = fingertip_draft(EntityId::new(EntityPrefix::Cust));
        let err = create_drill_sheet(&mut store, draft, &ctx()).unwrap_err();
        assert!(matches!(err, SaveError::Invalid(ref e) if e.contains("customer_id")));
    }

    #[test]
    fn test_partial_update_keeps_unspecified_fields() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let updated = update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({"bridge": {"distance": 0.375}, "notes": "Moved bridge"}),
        )
        .unwrap();

        assert_eq!(updated.bridge.distance, 0.375);
        assert_eq!(updated.notes.as_deref(), Some("Moved bridge"));
        assert_eq!(updated.name, sheet.name);
        assert_eq!(updated.spans, sheet.spans);
        assert_eq!(updated.created, sheet.created);
        assert!(updated.updated.is_some());
    }

    #[test]
    fn test_update_cannot_change_identity() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let updated = update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({"author": "someone else", "created": "2001-01-01T00:00:00Z"}),
        )
        .unwrap();
        assert_eq!(updated.author, sheet.author);
        assert_eq!(updated.created, sheet.created);
    }

    #[test]
    fn test_update_with_legacy_spans_is_migrated() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let updated = update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({"spans": {"middle_to_ring": {"fit_span": 0.5}}}),
        )
        .unwrap();
        assert_eq!(updated.bridge.distance, 0.5);

        let raw = store.get_value(&sheet.id).unwrap().unwrap();
        assert!(raw["spans"].get("middle_to_ring").is_none());
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let err = update_drill_sheet(&mut store, &sheet.id, json!({"bridge": {"distance": 1.5}}))
            .unwrap_err();
        assert!(matches!(err, SaveError::Invalid(_)));

        let stored: DrillSheet = store.get(&sheet.id).unwrap().unwrap();
        assert_eq!(stored.bridge.distance, 0.25);
    }

    #[test]
    fn test_update_switching_to_two_handed_drops_thumb() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let updated = update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({"grip_style": "two_handed_no_thumb"}),
        )
        .unwrap();
        assert!(updated.holes.thumb.is_none());
        assert!(updated.holes.thumb_enabled);
        assert!(!updated.thumb_enabled());
    }

    #[test]
    fn test_grip_round_trip_keeps_thumb_flag() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let sheet = create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({"grip_style": "two_handed_no_thumb"}),
        )
        .unwrap();
        let back = update_drill_sheet(
            &mut store,
            &sheet.id,
            json!({
                "grip_style": "fingertip",
                "holes": {"thumb": {"size": {"primary": "1"}}}
            }),
        )
        .unwrap();

        assert!(back.holes.thumb_enabled);
        assert!(back.thumb_enabled());
        assert_eq!(back.holes.thumb, Some(FingerHole::sized("1")));

        let stored: DrillSheet = store.get(&sheet.id).unwrap().unwrap();
        assert_eq!(stored.holes.thumb, Some(FingerHole::sized("1")));
    }

    #[test]
    fn test_bridge_update_on_legacy_sheet_wins_over_old_span() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let id = EntityId::new(EntityPrefix::Drl);
        store
            .put_value(
                &id,
                json!({
                    "id": id.to_string(),
                    "name": "Old",
                    "customer_id": cust.id.to_string(),
                    "grip_style": "conventional",
                    "spans": {
                        "thumb_to_middle": {"fit_span": 4.5},
                        "middle_to_ring": {"fit_span": 0.3}
                    },
                    "holes": {
                        "thumb": {"size": {"primary": "1"}},
                        "middle": {"size": {"primary": "31/64"}},
                        "ring": {"size": {"primary": "31/64"}}
                    },
                    "created": "2023-06-01T09:30:00Z",
                    "author": "test"
                }),
            )
            .unwrap();

        let updated =
            update_drill_sheet(&mut store, &id, json!({"bridge": {"distance": 0.5}})).unwrap();
        assert_eq!(updated.bridge.distance, 0.5);
        assert_eq!(updated.thumb_to_middle(), Some(4.5));

        let raw = store.get_value(&id).unwrap().unwrap();
        assert_eq!(raw["bridge"]["distance"], json!(0.5));
        assert!(raw["spans"].get("middle_to_ring").is_none());
    }

    #[test]
    fn test_update_missing_sheet() {
        let mut store = MemoryStore::new();
        let err = update_drill_sheet(&mut store, &EntityId::new(EntityPrefix::Drl), json!({}))
            .unwrap_err();
        assert!(matches!(err, SaveError::NotFound(_)));
    }

    #[test]
    fn test_merge_patch_semantics() {
        let mut target = json!({"a": 1, "b": {"c": 2, "d": 3}, "e": [1, 2]});
        merge_patch(&mut target, json!({"b": {"c": null, "x": 9}, "e": [3], "f": "new"}));
        assert_eq!(target, json!({"a": 1, "b": {"d": 3, "x": 9}, "e": [3], "f": "new"}));
    }

    #[test]
    fn test_bulk_migration() {
        let mut store = MemoryStore::new();
        let legacy_id = EntityId::new(EntityPrefix::Drl);
        store
            .put_value(
                &legacy_id,
                json!({
                    "id": legacy_id.to_string(),
                    "name": "Old",
                    "is_template": true,
                    "spans": {"thumb_to_middle": {"fit_span": 4.5}, "middle_to_ring": {}},
                    "holes": {"middle": {"size": {"primary": "1/2"}}, "ring": {"size": {"primary": "1/2"}}},
                    "created": "2023-06-01T09:30:00Z",
                    "author": "test"
                }),
            )
            .unwrap();
        let cust = customer(&mut store);
        create_drill_sheet(&mut store, fingertip_draft(cust.id), &ctx()).unwrap();

        let dry = migrate_drill_sheets(&mut store, true).unwrap();
        assert_eq!(dry.migrated, vec![legacy_id.clone()]);
        assert_eq!(dry.current, 1);

        let report = migrate_drill_sheets(&mut store, false).unwrap();
        assert_eq!(report.migrated.len(), 1);
        let raw = store.get_value(&legacy_id).unwrap().unwrap();
        assert_eq!(raw["bridge"]["distance"], json!(0.25));

        let again = migrate_drill_sheets(&mut store, false).unwrap();
        assert!(again.migrated.is_empty());
        assert_eq!(again.current, 2);
    }

    #[test]
    fn test_work_order_costs_follow_employee_rate() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let mut tech = Employee::new("Sam".to_string(), Role::DrillTechnician, String::new());
        tech.hourly_rate = Some(30.0);
        let tech = create_employee(&mut store, tech, &ctx()).unwrap();

        let wo = create_work_order(
            &mut store,
            WorkOrderDraft {
                description: "Drill Phaze II".to_string(),
                customer_id: Some(cust.id.clone()),
                employee_id: Some(tech.id.clone()),
                labor_hours: Some(1.0),
                materials_cost: Some(5.0),
                ..WorkOrderDraft::default()
            },
            &ctx(),
        )
        .unwrap();
        assert_eq!(wo.labor_cost, Some(30.0));
        assert_eq!(wo.total_cost, 35.0);

        let manual = update_work_order(
            &mut store,
            &wo.id,
            WorkOrderChanges {
                labor_cost: Some(50.0),
                ..WorkOrderChanges::default()
            },
        )
        .unwrap();
        assert_eq!(manual.total_cost, 55.0);

        let rehours = update_work_order(
            &mut store,
            &wo.id,
            WorkOrderChanges {
                labor_hours: Some(2.0),
                ..WorkOrderChanges::default()
            },
        )
        .unwrap();
        assert_eq!(rehours.labor_cost, Some(60.0));
        assert_eq!(rehours.total_cost, 65.0);

        let orders: Vec<WorkOrder> = store
            .list(&RecordFilter {
                customer_id: Some(cust.id),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn test_ball_creation_and_status() {
        let mut store = MemoryStore::new();
        let cust = customer(&mut store);
        let ball = create_ball(
            &mut store,
            BallDraft {
                customer_id: Some(cust.id),
                brand: "Storm".to_string(),
                model: "Phaze II".to_string(),
                weight: "15".to_string(),
                ..BallDraft::default()
            },
            &ctx(),
        )
        .unwrap();

        let sold = set_ball_status(&mut store, &ball.id, BallStatus::Sold).unwrap();
        assert_eq!(sold.status, BallStatus::Sold);
        let back = set_ball_status(&mut store, &ball.id, BallStatus::InStock).unwrap();
        assert_eq!(back.status, BallStatus::InStock);
    }
}
