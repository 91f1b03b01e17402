//! `proshop wo` command - Work order management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_money, parse_amount, print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service::{self, WorkOrderChanges};
use crate::core::team::Operation;
use crate::entities::{WorkOrder, WorkType};
use crate::forms::WorkOrderDraft;

#[derive(Subcommand, Debug)]
pub enum WoCommands {
    /// List work orders
    List(ListArgs),

    /// Open a new work order
    New(NewArgs),

    /// Show a work order and its cost breakdown
    Show(ShowArgs),

    /// Edit a work order in your editor
    Edit(ShowArgs),

    /// Record hours, costs, quality check or satisfaction
    Update(UpdateArgs),

    /// Delete a work order
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only orders for this customer (CUST@N or ID)
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Only orders of this type
    #[arg(long, short = 't')]
    pub r#type: Option<WorkType>,

    /// Only orders not yet quality checked
    #[arg(long)]
    pub open: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// What is being done
    #[arg(long, short = 'd')]
    pub description: String,

    /// Customer (CUST@N or ID)
    #[arg(long, short = 'c')]
    pub customer: String,

    /// Ball being worked on (BALL@N or ID)
    #[arg(long)]
    pub ball: Option<String>,

    /// Drill sheet being drilled to (DRL@N or ID)
    #[arg(long)]
    pub drill_sheet: Option<String>,

    /// Employee doing the work (EMP@N or ID)
    #[arg(long, short = 'e')]
    pub employee: Option<String>,

    /// Location (LOC@N or ID)
    #[arg(long)]
    pub location: Option<String>,

    /// drill, plug_and_redrill, resurface, insert_fit or other
    #[arg(long, short = 't', default_value = "drill")]
    pub r#type: WorkType,

    /// Labor hours; with an employee rate this sets the labor cost
    #[arg(long)]
    pub hours: Option<String>,

    /// Labor cost when no rate applies
    #[arg(long)]
    pub labor_cost: Option<String>,

    /// Materials cost
    #[arg(long)]
    pub materials: Option<String>,

    /// Customer satisfaction, 1-5
    #[arg(long)]
    pub satisfaction: Option<u8>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Work order ID or short ID (WO@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Work order ID or short ID (WO@N)
    pub id: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Reassign to another employee (EMP@N or ID)
    #[arg(long, short = 'e')]
    pub employee: Option<String>,

    #[arg(long)]
    pub hours: Option<String>,

    #[arg(long)]
    pub labor_cost: Option<String>,

    #[arg(long)]
    pub materials: Option<String>,

    /// Mark the work as quality checked
    #[arg(long)]
    pub quality_checked: bool,

    /// Customer satisfaction, 1-5
    #[arg(long)]
    pub satisfaction: Option<u8>,

    #[arg(long)]
    pub notes: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("description", "DESCRIPTION", 32),
    ColumnDef::new("type", "TYPE", 16),
    ColumnDef::new("customer", "CUSTOMER", 14),
    ColumnDef::new("total", "TOTAL", 10),
    ColumnDef::new("qc", "QC", 4),
    ColumnDef::new("created", "CREATED", 12),
];

pub fn run(cmd: WoCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WoCommands::List(args) => run_list(args, global),
        WoCommands::New(args) => run_new(args, global),
        WoCommands::Show(args) => run_show(args, global),
        WoCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Wo, &args.id),
        WoCommands::Update(args) => run_update(args, global),
        WoCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Wo, &args.id, false)?;
            print_saved(global, "Deleted", "work order", &id, "");
            Ok(())
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let owner = shop.resolve_opt(EntityPrefix::Cust, args.customer.as_deref())?;
    let mut orders: Vec<WorkOrder> = shop.list(owner)?;

    if let Some(work_type) = args.r#type {
        orders.retain(|o| o.work_type == work_type);
    }
    if args.open {
        orders.retain(|o| !o.quality_checked);
    }
    orders.sort_by(|a, b| b.created.cmp(&a.created));

    if args.count {
        println!("{}", orders.len());
        return Ok(());
    }
    if orders.is_empty() {
        println!("No work orders found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Wo, orders.iter().map(|o| &o.id));

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&orders).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&orders).into_diagnostic()?),
        format => {
            let rows = orders.iter().map(|o| {
                TableRow::new(&o.id, &short_ids)
                    .cell("description", CellValue::Text(o.description.clone()))
                    .cell("type", CellValue::Type(o.work_type.to_string()))
                    .cell("customer", CellValue::reference(Some(&o.customer_id), &short_ids))
                    .cell("total", CellValue::Money(Some(o.total_cost)))
                    .cell("qc", CellValue::Flag(o.quality_checked))
                    .cell("created", CellValue::Date(o.created))
            });
            TableFormatter::new(COLUMNS, "work order", "WO").output(rows.collect(), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Wo, Operation::Create)?;

    let draft = WorkOrderDraft {
        description: args.description,
        customer_id: Some(shop.resolve_id(EntityPrefix::Cust, &args.customer)?),
        ball_id: shop.resolve_opt(EntityPrefix::Ball, args.ball.as_deref())?,
        drill_sheet_id: shop.resolve_opt(EntityPrefix::Drl, args.drill_sheet.as_deref())?,
        employee_id: shop.resolve_opt(EntityPrefix::Emp, args.employee.as_deref())?,
        location_id: shop.resolve_opt(EntityPrefix::Loc, args.location.as_deref())?,
        work_type: args.r#type,
        labor_hours: parse_amount("hours", args.hours.as_deref())?,
        labor_cost: parse_amount("labor cost", args.labor_cost.as_deref())?,
        materials_cost: parse_amount("materials cost", args.materials.as_deref())?,
        quality_checked: false,
        satisfaction: args.satisfaction,
        notes: args.notes,
    };

    let ctx = shop.save_context();
    let wo = service::create_work_order(&mut shop.store, draft, &ctx).map_err(save_failed)?;
    let detail = format!("{} ({}) total ${:.2}", wo.description, wo.work_type, wo.total_cost);
    print_saved(global, "Created", "work order", &wo.id, &detail);
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Wo, Operation::Update)?;
    let id = shop.resolve_id(EntityPrefix::Wo, &args.id)?;

    let changes = WorkOrderChanges {
        description: args.description,
        employee_id: shop.resolve_opt(EntityPrefix::Emp, args.employee.as_deref())?,
        labor_hours: parse_amount("hours", args.hours.as_deref())?,
        labor_cost: parse_amount("labor cost", args.labor_cost.as_deref())?,
        materials_cost: parse_amount("materials cost", args.materials.as_deref())?,
        quality_checked: args.quality_checked.then_some(true),
        satisfaction: args.satisfaction,
        notes: args.notes,
    };

    let wo = service::update_work_order(&mut shop.store, &id, changes).map_err(save_failed)?;
    print_saved(global, "Updated", "work order", &wo.id, &format!("total ${:.2}", wo.total_cost));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let wo: WorkOrder = shop.load(&args.id)?;
    if print_structured(&wo, &wo.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&wo.id).cyan());
    println!("{}: {}", style("Description").bold(), style(&wo.description).yellow());
    println!("{}: {}", style("Type").bold(), wo.work_type);
    println!("{}: {}", style("Customer").bold(), style(short_ids.display(&wo.customer_id)).cyan());
    for (label, reference) in [
        ("Ball", &wo.ball_id),
        ("Drill sheet", &wo.drill_sheet_id),
        ("Employee", &wo.employee_id),
        ("Location", &wo.location_id),
    ] {
        if let Some(id) = reference {
            println!("{}: {}", style(label).bold(), style(short_ids.display(id)).cyan());
        }
    }
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{}", style("Costs").bold());
    if let Some(hours) = wo.labor_hours {
        println!("  {:<10} {:.2}", "hours", hours);
    }
    println!("  {:<10} {}", "labor", format_money(wo.labor_cost));
    println!("  {:<10} {}", "materials", format_money(wo.materials_cost));
    println!("  {:<10} {}", "total", style(format!("${:.2}", wo.total_cost)).bold());

    println!();
    let checked = if wo.quality_checked {
        style("yes").green()
    } else {
        style("no").dim()
    };
    println!("{}: {}", style("Quality checked").bold(), checked);
    if let Some(score) = wo.satisfaction {
        println!("{}: {}/5", style("Satisfaction").bold(), score);
    }
    if let Some(notes) = &wo.notes {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", notes);
    }
    println!();
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        wo.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        wo.author
    );
    Ok(())
}
