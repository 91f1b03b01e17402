//! `proshop drill` command - Drill sheet management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service::{self, merge_patch};
use crate::core::team::Operation;
use crate::entities::drill_sheet::{FingerHole, SpanMeasurement};
use crate::entities::{DrillSheet, GripStyle};
use crate::forms::DrillSheetDraft;

#[derive(Subcommand, Debug)]
pub enum DrillCommands {
    /// List drill sheets
    List(ListArgs),

    /// Record a new drill sheet
    New(NewArgs),

    /// Show a drill sheet's spans and holes
    Show(ShowArgs),

    /// Edit a drill sheet in your editor
    Edit(ShowArgs),

    /// Change fields of a drill sheet, keeping the rest
    Update(UpdateArgs),

    /// Delete a drill sheet
    Delete(ShowArgs),

    /// Rewrite legacy three-span sheets in the current layout
    Migrate(MigrateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only sheets owned by this customer (CUST@N or ID)
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Only templates
    #[arg(long, conflicts_with = "customer")]
    pub templates: bool,

    /// Only sheets with this grip style
    #[arg(long, short = 'g')]
    pub grip: Option<GripStyle>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

/// Measurement flags shared by `new` and `update`
#[derive(clap::Args, Debug, Default)]
pub struct MeasurementArgs {
    /// Grip style (conventional, fingertip, two_handed_no_thumb)
    #[arg(long, short = 'g')]
    pub grip: Option<GripStyle>,

    /// Thumb-to-middle fit span, inches
    #[arg(long)]
    pub thumb_middle: Option<f64>,

    /// Thumb-to-ring fit span, inches
    #[arg(long)]
    pub thumb_ring: Option<f64>,

    /// Bridge distance between middle and ring holes, inches
    #[arg(long)]
    pub bridge: Option<f64>,

    /// Thumb hole bit size, e.g. 63/64
    #[arg(long)]
    pub thumb_size: Option<String>,

    /// Middle finger hole bit size, e.g. 31/64
    #[arg(long)]
    pub middle_size: Option<String>,

    /// Ring finger hole bit size, e.g. 31/64
    #[arg(long)]
    pub ring_size: Option<String>,

    /// Drill without a thumb hole
    #[arg(long)]
    pub no_thumb: bool,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Sheet name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Owning customer (CUST@N or ID); required unless --template
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Save as a reusable template with no customer
    #[arg(long)]
    pub template: bool,

    /// Start from an existing sheet or template (DRL@N or ID)
    #[arg(long)]
    pub from_template: Option<String>,

    /// Read the whole form from a YAML or JSON file
    #[arg(long, conflicts_with = "from_template")]
    pub file: Option<PathBuf>,

    /// Employee who took the measurements (EMP@N or ID)
    #[arg(long)]
    pub employee: Option<String>,

    #[command(flatten)]
    pub measurements: MeasurementArgs,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Drill sheet ID or short ID (DRL@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Drill sheet ID or short ID (DRL@N)
    pub id: String,

    /// Merge this YAML or JSON document into the sheet first
    #[arg(long)]
    pub patch: Option<PathBuf>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub measurements: MeasurementArgs,
}

#[derive(clap::Args, Debug)]
pub struct MigrateArgs {
    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("grip", "GRIP", 20),
    ColumnDef::new("t2m", "T-M", 6),
    ColumnDef::new("t2r", "T-R", 6),
    ColumnDef::new("bridge", "BRIDGE", 7),
    ColumnDef::new("customer", "CUSTOMER", 14),
];

pub fn run(cmd: DrillCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DrillCommands::List(args) => run_list(args, global),
        DrillCommands::New(args) => run_new(args, global),
        DrillCommands::Show(args) => run_show(args, global),
        DrillCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Drl, &args.id),
        DrillCommands::Update(args) => run_update(args, global),
        DrillCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Drl, &args.id, false)?;
            print_saved(global, "Deleted", "drill sheet", &id, "");
            Ok(())
        }
        DrillCommands::Migrate(args) => run_migrate(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let owner = shop.resolve_opt(EntityPrefix::Cust, args.customer.as_deref())?;
    let mut sheets: Vec<DrillSheet> = shop.list(owner)?;

    if args.templates {
        sheets.retain(|s| s.is_template);
    }
    if let Some(grip) = args.grip {
        sheets.retain(|s| s.grip_style == grip);
    }
    sheets.sort_by(|a, b| b.created.cmp(&a.created));

    if args.count {
        println!("{}", sheets.len());
        return Ok(());
    }
    if sheets.is_empty() {
        println!("No drill sheets found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Drl, sheets.iter().map(|s| &s.id));

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sheets).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&sheets).into_diagnostic()?),
        format => {
            let rows = sheets.iter().map(|s| {
                let owner = if s.is_template {
                    CellValue::Type("template".to_string())
                } else {
                    CellValue::reference(s.customer_id.as_ref(), &short_ids)
                };
                TableRow::new(&s.id, &short_ids)
                    .cell("name", CellValue::Text(s.name.clone()))
                    .cell("grip", CellValue::Type(s.grip_style.to_string()))
                    .cell("t2m", CellValue::Float(s.thumb_to_middle(), 2))
                    .cell("t2r", CellValue::Float(s.thumb_to_ring(), 2))
                    .cell("bridge", CellValue::Float(Some(s.bridge.distance), 3))
                    .cell("customer", owner)
            });
            TableFormatter::new(COLUMNS, "drill sheet", "DRL").output(rows.collect(), format);
        }
    }
    Ok(())
}

/// Read a YAML or JSON file into a document
fn read_document(path: &Path) -> Result<Value> {
    let source = fs::read_to_string(path).into_diagnostic()?;
    let filename = path.display().to_string();
    crate::yaml::parse_document(&source, &filename).map_err(miette::Report::new)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Drl, Operation::Create)?;

    let mut draft = match (&args.file, &args.from_template) {
        (Some(path), _) => DrillSheetDraft::from_value(read_document(path)?)
            .map_err(|e| miette::miette!("{} is not a drill sheet form: {}", path.display(), e))?,
        (None, Some(reference)) => {
            let template: DrillSheet = shop.load(reference)?;
            let mut draft = DrillSheetDraft::from_sheet(&template);
            draft.is_template = false;
            draft.customer_id = None;
            draft
        }
        (None, None) => DrillSheetDraft::default(),
    };

    if let Some(name) = args.name {
        draft.name = name;
    }
    if args.template {
        draft.is_template = true;
    }
    if let Some(owner) = shop.resolve_opt(EntityPrefix::Cust, args.customer.as_deref())? {
        draft.customer_id = Some(owner);
    }
    if let Some(employee) = shop.resolve_opt(EntityPrefix::Emp, args.employee.as_deref())? {
        draft.employee_id = Some(employee);
    }
    apply_measurements(&mut draft, args.measurements);

    let ctx = shop.save_context();
    let sheet = service::create_drill_sheet(&mut shop.store, draft, &ctx).map_err(save_failed)?;
    let detail = format!(
        "{} ({}, bridge {:.3}\")",
        sheet.name, sheet.grip_style, sheet.bridge.distance
    );
    print_saved(global, "Created", "drill sheet", &sheet.id, &detail);
    Ok(())
}

fn apply_measurements(draft: &mut DrillSheetDraft, m: MeasurementArgs) {
    if let Some(grip) = m.grip {
        draft.grip_style = grip;
    }
    if let Some(span) = m.thumb_middle {
        draft.spans.thumb_to_middle = SpanMeasurement::fit(span);
    }
    if let Some(span) = m.thumb_ring {
        draft.spans.thumb_to_ring = SpanMeasurement::fit(span);
    }
    if m.bridge.is_some() {
        draft.bridge_distance = m.bridge;
    }
    if let Some(size) = m.thumb_size {
        draft.thumb = FingerHole::sized(size);
    }
    if let Some(size) = m.middle_size {
        draft.middle = FingerHole::sized(size);
    }
    if let Some(size) = m.ring_size {
        draft.ring = FingerHole::sized(size);
    }
    if m.no_thumb {
        draft.thumb_enabled = false;
    }
    if m.notes.is_some() {
        draft.notes = m.notes;
    }
}

/// Merge patch equivalent of the measurement flags
fn measurement_patch(name: Option<String>, m: MeasurementArgs) -> Value {
    let mut patch = Map::new();
    let mut holes = Map::new();
    let mut spans = Map::new();

    if let Some(name) = name {
        patch.insert("name".into(), json!(name));
    }
    if let Some(grip) = m.grip {
        patch.insert("grip_style".into(), json!(grip));
    }
    if let Some(span) = m.thumb_middle {
        spans.insert("thumb_to_middle".into(), json!({ "fit_span": span }));
    }
    if let Some(span) = m.thumb_ring {
        spans.insert("thumb_to_ring".into(), json!({ "fit_span": span }));
    }
    if let Some(distance) = m.bridge {
        patch.insert("bridge".into(), json!({ "distance": distance }));
    }
    for (key, size) in [("thumb", m.thumb_size), ("middle", m.middle_size), ("ring", m.ring_size)] {
        if let Some(size) = size {
            holes.insert(key.into(), json!({ "size": { "primary": size } }));
        }
    }
    if m.no_thumb {
        holes.insert("thumb_enabled".into(), json!(false));
    }
    if let Some(notes) = m.notes {
        patch.insert("notes".into(), json!(notes));
    }

    if !spans.is_empty() {
        patch.insert("spans".into(), Value::Object(spans));
    }
    if !holes.is_empty() {
        patch.insert("holes".into(), Value::Object(holes));
    }
    Value::Object(patch)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Drl, Operation::Update)?;
    let id = shop.resolve_id(EntityPrefix::Drl, &args.id)?;

    let mut patch = match &args.patch {
        Some(path) => read_document(path)?,
        None => Value::Object(Map::new()),
    };
    merge_patch(&mut patch, measurement_patch(args.name, args.measurements));

    if patch.as_object().is_some_and(Map::is_empty) {
        return Err(miette::miette!("Nothing to update. Pass --patch or a field flag."));
    }

    let sheet = service::update_drill_sheet(&mut shop.store, &id, patch).map_err(save_failed)?;
    print_saved(global, "Updated", "drill sheet", &sheet.id, &sheet.name);
    Ok(())
}

fn run_migrate(args: MigrateArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    if !args.dry_run {
        shop.authorize(EntityPrefix::Drl, Operation::Update)?;
    }

    let report = service::migrate_drill_sheets(&mut shop.store, args.dry_run).map_err(save_failed)?;

    let verb = if args.dry_run { "Would migrate" } else { "Migrated" };
    for id in &report.migrated {
        println!("  {} {}", style("→").blue(), id);
    }
    for (id, error) in &report.failed {
        println!("  {} {}: {}", style("✗").red(), id, error);
    }
    println!(
        "{} {} {} sheet(s); {} already current",
        style("✓").green(),
        verb,
        style(report.migrated.len()).cyan(),
        report.current
    );

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!("{} drill sheet(s) could not be read", report.failed.len()))
    }
}

fn print_hole(label: &str, hole: &FingerHole) {
    let mut line = format!("  {:<7} {}", label, hole.size.primary);
    if let Some(secondary) = &hole.size.secondary {
        line.push_str(&format!(" / {}", secondary));
    }
    if let Some(depth) = hole.size.depth {
        line.push_str(&format!("  depth {:.3}\"", depth));
    }
    if let Some(forward) = hole.pitch.forward {
        line.push_str(&format!("  fwd {:.3}", forward));
    }
    if let Some(lateral) = hole.pitch.lateral {
        line.push_str(&format!("  lat {:.3}", lateral));
    }
    println!("{}", line);
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let sheet: DrillSheet = shop.load(&args.id)?;
    if print_structured(&sheet, &sheet.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&sheet.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&sheet.name).yellow());
    println!("{}: {}", style("Grip").bold(), sheet.grip_style);
    if sheet.is_template {
        println!("{}: template", style("Owner").bold());
    } else if let Some(owner) = &sheet.customer_id {
        println!("{}: {}", style("Customer").bold(), style(short_ids.display(owner)).cyan());
    }
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{}", style("Spans").bold());
    for (label, span) in [
        ("thumb-middle", &sheet.spans.thumb_to_middle),
        ("thumb-ring", &sheet.spans.thumb_to_ring),
    ] {
        let values: Vec<String> = span.values().map(|(k, v)| format!("{} {:.3}\"", k, v)).collect();
        let text = if values.is_empty() { "-".to_string() } else { values.join(", ") };
        println!("  {:<13} {}", label, text);
    }
    for custom in &sheet.spans.custom {
        let values: Vec<String> =
            custom.span.values().map(|(k, v)| format!("{} {:.3}\"", k, v)).collect();
        println!("  {:<13} {}", custom.label, values.join(", "));
    }
    println!("  {:<13} {:.3}\"", "bridge", sheet.bridge.distance);

    println!();
    println!("{}", style("Holes").bold());
    match &sheet.holes.thumb {
        Some(thumb) if sheet.thumb_enabled() => print_hole("thumb", thumb),
        _ => println!("  {:<7} {}", "thumb", style("none").dim()),
    }
    print_hole("middle", &sheet.holes.middle);
    print_hole("ring", &sheet.holes.ring);
    for extra in &sheet.holes.additional {
        println!(
            "  {:<7} {} at ({:.2}, {:.2})",
            extra.kind, extra.size.primary, extra.position.x, extra.position.y
        );
    }

    if let Some(notes) = &sheet.notes {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", notes);
    }
    println!();
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        sheet.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        sheet.author
    );
    Ok(())
}
