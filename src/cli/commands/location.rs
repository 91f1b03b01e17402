//! `proshop location` command - Shop locations

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service;
use crate::core::team::Operation;
use crate::entities::{Employee, Location};

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// List locations
    List,

    /// Add a location
    New(NewArgs),

    /// Show a location and who works there
    Show(ShowArgs),

    /// Edit a location in your editor
    Edit(ShowArgs),

    /// Delete a location
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Location ID or short ID (LOC@N)
    pub id: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("address", "ADDRESS", 36),
    ColumnDef::new("phone", "PHONE", 16),
];

pub fn run(cmd: LocationCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LocationCommands::List => run_list(global),
        LocationCommands::New(args) => run_new(args, global),
        LocationCommands::Show(args) => run_show(args, global),
        LocationCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Loc, &args.id),
        LocationCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Loc, &args.id, false)?;
            print_saved(global, "Deleted", "location", &id, "");
            Ok(())
        }
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let mut locations: Vec<Location> = shop.list(None)?;
    locations.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    if locations.is_empty() {
        println!("No locations found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Loc, locations.iter().map(|l| &l.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&locations).into_diagnostic()?)
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&locations).into_diagnostic()?),
        format => {
            let rows = locations.iter().map(|l| {
                TableRow::new(&l.id, &short_ids)
                    .cell("name", CellValue::Text(l.name.clone()))
                    .cell("address", CellValue::opt_text(l.address.as_deref()))
                    .cell("phone", CellValue::opt_text(l.phone.as_deref()))
            });
            TableFormatter::new(COLUMNS, "location", "LOC").output(rows.collect(), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Loc, Operation::Create)?;

    let ctx = shop.save_context();
    let mut location = Location::new(args.name, ctx.author.clone());
    location.address = args.address;
    location.phone = args.phone;

    let location = service::create_location(&mut shop.store, location, &ctx).map_err(save_failed)?;
    print_saved(global, "Created", "location", &location.id, &location.name);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let location: Location = shop.load(&args.id)?;
    if print_structured(&location, &location.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&location.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&location.name).yellow());
    for (label, value) in [("Address", &location.address), ("Phone", &location.phone)] {
        if let Some(value) = value {
            println!("{}: {}", style(label).bold(), value);
        }
    }
    println!("{}", style("─".repeat(60)).dim());

    let staff: Vec<Employee> = shop
        .list::<Employee>(None)?
        .into_iter()
        .filter(|e| e.location_id.as_ref() == Some(&location.id))
        .collect();
    if !staff.is_empty() {
        println!();
        println!("{} ({})", style("Staff").bold(), staff.len());
        for employee in &staff {
            println!(
                "  {} {} ({})",
                style(short_ids.display(&employee.id)).cyan(),
                employee.name,
                employee.role
            );
        }
    }
    println!();
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        location.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        location.author
    );
    Ok(())
}
