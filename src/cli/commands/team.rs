//! `proshop team` command - Team roster management

use clap::{Args, Subcommand};
use console::style;
use dialoguer::Confirm;
use miette::{bail, miette, IntoDiagnostic, Result};

use crate::cli::helpers::{truncate_str, Shop};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityPrefix;
use crate::core::team::{Operation, Role, TeamMember, TeamRoster};

#[derive(Debug, Subcommand)]
pub enum TeamCommands {
    /// List team members
    List(TeamListArgs),

    /// Show the current user's roles
    Whoami,

    /// Create a roster template in .proshop/team.yaml
    Init(TeamInitArgs),

    /// Add a team member
    Add(TeamAddArgs),

    /// Remove a team member
    Remove(TeamRemoveArgs),
}

#[derive(Debug, Args)]
pub struct TeamListArgs {
    /// Only members with this role
    #[arg(long, short = 'r')]
    pub role: Option<Role>,
}

#[derive(Debug, Args)]
pub struct TeamInitArgs {
    /// Overwrite an existing team.yaml
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct TeamAddArgs {
    /// Member's full name
    #[arg(long)]
    pub name: String,

    /// Member's email
    #[arg(long, default_value = "")]
    pub email: String,

    /// Username, matched against the configured author
    #[arg(long)]
    pub username: String,

    /// Roles (comma-separated: shop-manager,drill-technician,apprentice)
    #[arg(long, value_delimiter = ',', required = true)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Args)]
pub struct TeamRemoveArgs {
    /// Username to remove
    pub username: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TeamCommands::List(args) => run_list(args, global),
        TeamCommands::Whoami => run_whoami(global),
        TeamCommands::Init(args) => run_init(args, global),
        TeamCommands::Add(args) => run_add(args, global),
        TeamCommands::Remove(args) => run_remove(args, global),
    }
}

fn load_roster(shop: &Shop) -> Result<TeamRoster> {
    TeamRoster::load(&shop.project)
        .map_err(|e| miette!("{}", e))?
        .ok_or_else(|| miette!("No team roster found. Run 'proshop team init' to create one."))
}

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(Role::to_string).collect::<Vec<_>>().join(", ")
}

fn run_list(args: TeamListArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let roster = load_roster(&shop)?;

    let members: Vec<&TeamMember> = roster
        .active_members()
        .filter(|m| args.role.map_or(true, |r| m.has_role(r)))
        .collect();

    if members.is_empty() {
        println!("No team members found.");
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&members).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&members).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for member in members {
                println!("{}", member.username);
            }
        }
        _ => {
            println!(
                "{:<20} {:<25} {:<15} {}",
                style("NAME").bold(),
                style("EMAIL").bold(),
                style("USERNAME").bold(),
                style("ROLES").bold()
            );
            println!("{}", "-".repeat(75));
            for member in members {
                println!(
                    "{:<20} {:<25} {:<15} {}",
                    truncate_str(&member.name, 18),
                    truncate_str(&member.email, 23),
                    truncate_str(&member.username, 13),
                    role_list(&member.roles)
                );
            }
        }
    }
    Ok(())
}

fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let user = shop.config.author();
    let roster = load_roster(&shop)?;

    let Some(member) = roster.find_member(&user) else {
        bail!(
            "You ({}) are not in the team roster.\n\
             A shop manager can add you with: proshop team add --name \"{}\" --username {} --roles apprentice",
            user,
            user,
            user
        );
    };

    println!("{}: {}", style("Name").bold(), member.name);
    println!("{}: {}", style("Username").bold(), member.username);
    println!("{}: {}", style("Roles").bold(), role_list(&member.roles));
    println!();
    println!("{}", style("Permissions").bold());
    for prefix in EntityPrefix::all() {
        let allowed: Vec<&str> = [
            (Operation::Read, "read"),
            (Operation::Create, "create"),
            (Operation::Update, "update"),
            (Operation::Delete, "delete"),
        ]
        .into_iter()
        .filter(|(op, _)| member.can(*prefix, *op))
        .map(|(_, name)| name)
        .collect();
        println!("  {:<12} {}", prefix.label(), allowed.join(", "));
    }
    Ok(())
}

fn run_init(args: TeamInitArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let path = TeamRoster::path(&shop.project);

    if path.exists() && !args.force {
        bail!(
            "Team roster already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if path.exists() {
        shop.authorize(EntityPrefix::Emp, Operation::Update)?;
    }

    std::fs::write(&path, TeamRoster::default_template()).into_diagnostic()?;

    println!("{} Created team roster at {}", style("✓").green(), style(path.display()).cyan());
    println!();
    println!("Add members by editing the file, or with:");
    println!(
        "  {}",
        style("proshop team add --name \"Jane Smith\" --username jsmith --roles shop-manager").yellow()
    );
    Ok(())
}

fn run_add(args: TeamAddArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Emp, Operation::Create)?;

    let mut roster = TeamRoster::load(&shop.project)
        .map_err(|e| miette!("{}", e))?
        .unwrap_or_default();

    if roster.find_member(&args.username).is_some() {
        bail!(
            "User '{}' already exists in the team roster.\n\
             Use 'proshop team remove {}' first to change their roles.",
            args.username,
            args.username
        );
    }

    let roles = role_list(&args.roles);
    roster.add_member(TeamMember {
        name: args.name.clone(),
        email: args.email,
        username: args.username.clone(),
        roles: args.roles,
        active: true,
    });
    roster.save(&shop.project).into_diagnostic()?;
    tracing::info!(username = %args.username, %roles, "added team member");

    println!(
        "{} Added {} ({}) to team roster",
        style("✓").green(),
        style(&args.name).cyan(),
        args.username
    );
    println!("   Roles: {}", roles);

    if roster.find_member(&shop.config.author()).is_none() {
        println!(
            "{} You ({}) are not in the roster yet; add yourself before making further changes.",
            style("!").yellow(),
            shop.config.author()
        );
    }
    Ok(())
}

fn run_remove(args: TeamRemoveArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    shop.authorize(EntityPrefix::Emp, Operation::Delete)?;
    let mut roster = load_roster(&shop)?;

    let name = roster
        .find_member(&args.username)
        .map(|m| m.name.clone())
        .ok_or_else(|| miette!("User '{}' not found in team roster.", args.username))?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove {} ({}) from team roster?", name, args.username))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    if !roster.remove_member(&args.username) {
        bail!("Failed to remove user '{}'.", args.username);
    }
    roster.save(&shop.project).into_diagnostic()?;
    println!("{} Removed {} ({}) from team roster", style("✓").green(), name, args.username);
    Ok(())
}
