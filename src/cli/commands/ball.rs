//! `proshop ball` command - Bowling ball management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_money, print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service;
use crate::core::team::Operation;
use crate::entities::{BallStatus, BowlingBall};
use crate::forms::BallDraft;

#[derive(Subcommand, Debug)]
pub enum BallCommands {
    /// List balls
    List(ListArgs),

    /// Register a new ball
    New(NewArgs),

    /// Show a ball's details
    Show(ShowArgs),

    /// Edit a ball in your editor
    Edit(ShowArgs),

    /// Change a ball's status
    Status(StatusArgs),

    /// Delete a ball
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only balls owned by this customer (CUST@N or ID)
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Only balls with this status
    #[arg(long, short = 's')]
    pub status: Option<BallStatus>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning customer; omit for shop stock
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    #[arg(long)]
    pub brand: String,

    #[arg(long)]
    pub model: String,

    /// Weight in pounds (6-16)
    #[arg(long, short = 'w')]
    pub weight: String,

    #[arg(long)]
    pub serial: Option<String>,

    /// Purchase price in dollars
    #[arg(long)]
    pub price: Option<String>,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    pub purchased: Option<NaiveDate>,

    /// Drill sheet this ball was drilled to
    #[arg(long)]
    pub drill_sheet: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<BallStatus>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Ball ID or short ID (BALL@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Ball ID or short ID (BALL@N)
    pub id: String,

    /// New status (in_stock, active, in_shop, retired, sold)
    pub status: BallStatus,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("ball", "BALL", 30),
    ColumnDef::new("weight", "LB", 4),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("customer", "CUSTOMER", 14),
    ColumnDef::new("sheet", "SHEET", 14),
];

pub fn run(cmd: BallCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BallCommands::List(args) => run_list(args, global),
        BallCommands::New(args) => run_new(args, global),
        BallCommands::Show(args) => run_show(args, global),
        BallCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Ball, &args.id),
        BallCommands::Status(args) => run_status(args, global),
        BallCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Ball, &args.id, false)?;
            print_saved(global, "Deleted", "ball", &id, "");
            Ok(())
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let owner = shop.resolve_opt(EntityPrefix::Cust, args.customer.as_deref())?;
    let mut balls: Vec<BowlingBall> = shop.list(owner)?;

    if let Some(status) = args.status {
        balls.retain(|b| b.status == status);
    }
    balls.sort_by(|a, b| b.created.cmp(&a.created));

    if args.count {
        println!("{}", balls.len());
        return Ok(());
    }
    if balls.is_empty() {
        println!("No balls found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Ball, balls.iter().map(|b| &b.id));

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&balls).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&balls).into_diagnostic()?),
        format => {
            let rows = balls.iter().map(|b| {
                TableRow::new(&b.id, &short_ids)
                    .cell("ball", CellValue::Text(format!("{} {}", b.brand, b.model)))
                    .cell("weight", CellValue::Number(i64::from(b.weight)))
                    .cell("status", CellValue::Status(b.status.to_string()))
                    .cell("customer", CellValue::reference(b.customer_id.as_ref(), &short_ids))
                    .cell("sheet", CellValue::reference(b.drill_sheet_id.as_ref(), &short_ids))
            });
            TableFormatter::new(COLUMNS, "ball", "BALL").output(rows.collect(), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Ball, Operation::Create)?;

    let draft = BallDraft {
        customer_id: shop.resolve_opt(EntityPrefix::Cust, args.customer.as_deref())?,
        brand: args.brand,
        model: args.model,
        weight: args.weight,
        serial_number: args.serial,
        purchase_price: args.price.unwrap_or_default(),
        purchase_date: args.purchased,
        drill_sheet_id: shop.resolve_opt(EntityPrefix::Drl, args.drill_sheet.as_deref())?,
        status: args.status,
    };

    let ctx = shop.save_context();
    let ball = service::create_ball(&mut shop.store, draft, &ctx).map_err(save_failed)?;
    let detail = format!("{} {} {}lb", ball.brand, ball.model, ball.weight);
    print_saved(global, "Created", "ball", &ball.id, &detail);
    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Ball, Operation::Update)?;
    let id = shop.resolve_id(EntityPrefix::Ball, &args.id)?;

    let ball = service::set_ball_status(&mut shop.store, &id, args.status).map_err(save_failed)?;
    print_saved(global, "Updated", "ball", &ball.id, &format!("status: {}", ball.status));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let ball: BowlingBall = shop.load(&args.id)?;
    if print_structured(&ball, &ball.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&ball.id).cyan());
    println!(
        "{}: {} {}",
        style("Ball").bold(),
        style(&ball.brand).yellow(),
        style(&ball.model).yellow()
    );
    println!("{}: {} lb", style("Weight").bold(), ball.weight);
    println!("{}: {}", style("Status").bold(), ball.status);
    if let Some(owner) = &ball.customer_id {
        println!("{}: {}", style("Customer").bold(), style(short_ids.display(owner)).cyan());
    }
    if let Some(serial) = &ball.serial_number {
        println!("{}: {}", style("Serial").bold(), serial);
    }
    if ball.purchase_price.is_some() || ball.purchase_date.is_some() {
        let date = ball.purchase_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{}: {} on {}",
            style("Purchased").bold(),
            format_money(ball.purchase_price),
            date
        );
    }
    if let Some(sheet) = &ball.drill_sheet_id {
        println!("{}: {}", style("Drill sheet").bold(), style(short_ids.display(sheet)).cyan());
    }
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        ball.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        ball.author
    );
    Ok(())
}
