//! `proshop employee` command - Staff records

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_money, parse_amount, print_saved, print_structured, save_failed, Shop};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::service;
use crate::core::team::{Operation, Role};
use crate::entities::Employee;

#[derive(Subcommand, Debug)]
pub enum EmployeeCommands {
    /// List employees
    List(ListArgs),

    /// Add an employee
    New(NewArgs),

    /// Show an employee
    Show(ShowArgs),

    /// Edit an employee in your editor
    Edit(ShowArgs),

    /// Delete an employee
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only employees with this role
    #[arg(long, short = 'r', value_enum)]
    pub role: Option<Role>,

    /// Include inactive employees
    #[arg(long)]
    pub all: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'r', value_enum, default_value = "drill-technician")]
    pub role: Role,

    /// Hourly rate in dollars, used to price labor on work orders
    #[arg(long)]
    pub rate: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Home location (LOC@N or ID)
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Employee ID or short ID (EMP@N)
    pub id: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("role", "ROLE", 18),
    ColumnDef::new("rate", "RATE", 9),
    ColumnDef::new("location", "LOCATION", 14),
    ColumnDef::new("active", "ACTIVE", 7),
];

pub fn run(cmd: EmployeeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EmployeeCommands::List(args) => run_list(args, global),
        EmployeeCommands::New(args) => run_new(args, global),
        EmployeeCommands::Show(args) => run_show(args, global),
        EmployeeCommands::Edit(args) => Shop::open(global)?.edit(EntityPrefix::Emp, &args.id),
        EmployeeCommands::Delete(args) => {
            let mut shop = Shop::open(global)?;
            let id = shop.delete(EntityPrefix::Emp, &args.id, false)?;
            print_saved(global, "Deleted", "employee", &id, "");
            Ok(())
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let mut employees: Vec<Employee> = shop.list(None)?;

    if let Some(role) = args.role {
        employees.retain(|e| e.role == role);
    }
    if !args.all {
        employees.retain(|e| e.active);
    }
    employees.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    if args.count {
        println!("{}", employees.len());
        return Ok(());
    }
    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }

    let short_ids = shop.remember_listing(EntityPrefix::Emp, employees.iter().map(|e| &e.id));

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&employees).into_diagnostic()?)
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&employees).into_diagnostic()?),
        format => {
            let rows = employees.iter().map(|e| {
                TableRow::new(&e.id, &short_ids)
                    .cell("name", CellValue::Text(e.name.clone()))
                    .cell("role", CellValue::Type(e.role.to_string()))
                    .cell("rate", CellValue::Money(e.hourly_rate))
                    .cell("location", CellValue::reference(e.location_id.as_ref(), &short_ids))
                    .cell("active", CellValue::Flag(e.active))
            });
            TableFormatter::new(COLUMNS, "employee", "EMP").output(rows.collect(), format);
        }
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Emp, Operation::Create)?;

    let ctx = shop.save_context();
    let mut employee = Employee::new(args.name, args.role, ctx.author.clone());
    employee.hourly_rate = parse_amount("rate", args.rate.as_deref())?;
    employee.email = args.email;
    employee.phone = args.phone;
    employee.location_id = shop.resolve_opt(EntityPrefix::Loc, args.location.as_deref())?;

    let employee = service::create_employee(&mut shop.store, employee, &ctx).map_err(save_failed)?;
    let detail = format!("{} ({})", employee.name, employee.role);
    print_saved(global, "Created", "employee", &employee.id, &detail);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let employee: Employee = shop.load(&args.id)?;
    if print_structured(&employee, &employee.id, global.format)? {
        return Ok(());
    }

    let short_ids = shop.short_ids();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&employee.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&employee.name).yellow());
    println!("{}: {}", style("Role").bold(), employee.role);
    println!("{}: {}/h", style("Rate").bold(), format_money(employee.hourly_rate));
    for (label, value) in [("Email", &employee.email), ("Phone", &employee.phone)] {
        if let Some(value) = value {
            println!("{}: {}", style(label).bold(), value);
        }
    }
    if let Some(location) = &employee.location_id {
        println!("{}: {}", style("Location").bold(), style(short_ids.display(location)).cyan());
    }
    if !employee.active {
        println!("{}: {}", style("Status").bold(), style("inactive").dim());
    }
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} {} | {} {}",
        style("Created:").dim(),
        employee.created.format("%Y-%m-%d %H:%M"),
        style("Author:").dim(),
        employee.author
    );
    Ok(())
}
