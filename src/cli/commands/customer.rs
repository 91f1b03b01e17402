//! `proshop customer` command - Customer management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service;
use crate::core::team::Operation;
use crate::entities::{BowlingBall, Customer, DrillSheet, WorkOrder};
use crate::forms::CustomerDraft;

#[derive(Subcommand, Debug)]
pub enum CustomerCommands {
    /// List customers
    List(ListArgs),

    /// Create a new customer
    New(NewArgs),

    /// Show a customer with their balls, drill sheets and work orders
    Show(ShowArgs),

    /// Edit a customer in your editor
    Edit(ShowArgs),

    /// Delete a customer
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name, email and phone
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Customer name (required unless --interactive)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Customer ID or short ID (CUST@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Customer ID or short ID (CUST@N)
    pub id: String,

    /// Delete even if balls, sheets or orders still reference the customer
    #[arg(long)]
    pub force: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("email", "EMAIL", 28),
    ColumnDef::new("phone", "PHONE", 16),
    ColumnDef::new("created", "CREATED", 12),
];

pub fn run(cmd: CustomerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CustomerCommands::List(args) => run_list(args, global),
        CustomerCommands::New(args) => run_new(args, global),
        CustomerCommands::Show(args) => run_show(args, global),
        CustomerCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Cust, &args.id),
        CustomerCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Cust, &args.id, args.force)?;
            print_saved(global, "Deleted", "customer", &id, "");
            Ok(())
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let mut customers: Vec<Customer> = shop.list(None)?;

    if let Some(search) = &args.search {
        let needle = search.to_lowercase();
        customers.retain(|c| {
            [Some(&c.name), c.email.as_ref(), c.phone.as_ref()]
                .into_iter()
                .flatten()
                .any(|v| v.to_lowercase().contains(&needle))
        });
    }
    customers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    if let Some(limit) = args.limit {
        customers.truncate(limit);
    }

    if args.count {
        println!("{}", customers.len());
        return Ok(());
    }
    if customers.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Cust, customers.iter().map(|c| &c.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&customers).into_diagnostic()?)
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&customers).into_diagnostic()?),
        format => {
            let rows = customers.iter().map(|c| {
                TableRow::new(&c.id, &short_ids)
                    .cell("name", CellValue::Text(c.name.clone()))
                    .cell("email", CellValue::opt_text(c.email.as_deref()))
                    .cell("phone", CellValue::opt_text(c.phone.as_deref()))
                    .cell("created", CellValue::Date(c.created))
            });
            TableFormatter::new(COLUMNS, "customer", "CUST").output(rows.collect(), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Cust, Operation::Create)?;

    let draft = if args.interactive || args.name.is_none() {
        prompt_draft(args)?
    } else {
        CustomerDraft {
            name: args.name.unwrap_or_default(),
            email: args.email,
            phone: args.phone,
            address: args.address,
            notes: args.notes,
        }
    };

    let ctx = shop.save_context();
    let customer = service::create_customer(&mut shop.store, draft, &ctx).map_err(save_failed)?;
    print_saved(global, "Created", "customer", &customer.id, &customer.name);
    Ok(())
}

fn prompt_draft(args: NewArgs) -> Result<CustomerDraft> {
    let theme = ColorfulTheme::default();
    let optional = |prompt: &str, initial: Option<String>| -> Result<Option<String>> {
        let value: String = Input::with_theme(&theme)
            .with_prompt(prompt)
            .with_initial_text(initial.unwrap_or_default())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        Ok(Some(value).filter(|v| !v.trim().is_empty()))
    };

    let name: String = Input::with_theme(&theme)
        .with_prompt("Name")
        .with_initial_text(args.name.unwrap_or_default())
        .interact_text()
        .into_diagnostic()?;

    Ok(CustomerDraft {
        name,
        email: optional("Email", args.email)?,
        phone: optional("Phone", args.phone)?,
        address: optional("Address", args.address)?,
        notes: optional("Notes", args.notes)?,
    })
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let customer: Customer = shop.load(&args.id)?;
    if print_structured(&customer, &customer.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&customer.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&customer.name).yellow());
    for (label, value) in [
        ("Email", &customer.email),
        ("Phone", &customer.phone),
        ("Address", &customer.address),
    ] {
        if let Some(value) = value {
            println!("{}: {}", style(label).bold(), value);
        }
    }
    println!("{}", style("─".repeat(60)).dim());

    let owner = Some(customer.id.clone());
    let balls: Vec<BowlingBall> = shop.list(owner.clone())?;
    let sheets: Vec<DrillSheet> = shop.list(owner.clone())?;
    let orders: Vec<WorkOrder> = shop.list(owner)?;

    if !balls.is_empty() {
        println!();
        println!("{} ({})", style("Balls").bold(), balls.len());
        for ball in &balls {
            println!(
                "  {} {} {} {}lb [{}]",
                style(short_ids.display(&ball.id)).cyan(),
                ball.brand,
                ball.model,
                ball.weight,
                ball.status
            );
        }
    }
    if !sheets.is_empty() {
        println!();
        println!("{} ({})", style("Drill sheets").bold(), sheets.len());
        for sheet in &sheets {
            println!(
                "  {} {} ({})",
                style(short_ids.display(&sheet.id)).cyan(),
                sheet.name,
                sheet.grip_style
            );
        }
    }
    if !orders.is_empty() {
        println!();
        println!("{} ({})", style("Work orders").bold(), orders.len());
        for order in &orders {
            println!(
                "  {} {} ${:.2}",
                style(short_ids.display(&order.id)).cyan(),
                order.description,
                order.total_cost
            );
        }
    }

    if let Some(notes) = &customer.notes {
        println!();
        println!("{}", style("Notes:").bold());
        println!("{}", notes);
    }
    println!();
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        customer.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        customer.author
    );
    Ok(())
}
