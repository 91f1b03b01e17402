//! `proshop config` command - view and change configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Remove a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `proshop config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

const VALID_KEYS: &[(&str, &str)] = &[
    ("author", "Default author for new records, matched against the team roster"),
    ("editor", "Editor command for `edit` subcommands"),
    ("default_format", "Default output format (yaml, json, tsv, etc.)"),
    ("shop_id", "Owning pro-shop id stamped on new records"),
    ("shop_name", "Business name shown on reports"),
    ("shop_phone", "Business phone shown on reports"),
    ("shop_address", "Business address shown on reports"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn discover(global: &GlobalOpts) -> Option<Project> {
    match &global.project {
        Some(path) => Project::discover_from(path).ok(),
        None => Project::discover().ok(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load_for(discover(global).as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&config).into_diagnostic()?),
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            for (key, _) in VALID_KEYS {
                match get_config_value(&config, key) {
                    Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
                    None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
                }
            }
            println!();
            println!("{}", style("Config sources (highest priority first):").dim());
            println!("  1. Environment (PROSHOP_AUTHOR, PROSHOP_EDITOR, PROSHOP_SHOP_ID)");
            println!("  2. Project config (.proshop/config.yaml)");
            println!("  3. Global config (~/.config/proshop/config.yaml)");
        }
    }
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = config_path(args.global, global)?;
    let mut map = read_mapping(&path)?;

    map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );
    write_mapping(&path, map)?;

    println!(
        "{} Set {} = {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style(&args.value).yellow(),
        if args.global { "global" } else { "project" }
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let path = config_path(args.global, global)?;
    if !path.exists() {
        return Err(miette::miette!("Config file does not exist: {}", path.display()));
    }
    let mut map = read_mapping(&path)?;

    if map.remove(&serde_yml::Value::String(args.key.clone())).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&path, map)?;

    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        if args.global { "global" } else { "project" }
    );
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    let global_path = global_config_path()?;
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(global_path.exists());

    println!();
    match discover(global) {
        Some(project) => {
            let path = project.shop_dir().join("config.yaml");
            println!("  {} {}", style("Project:").cyan(), path.display());
            print_exists(path.exists());
        }
        None => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a pro-shop project)").dim()
        ),
    }
    Ok(())
}

fn print_exists(exists: bool) {
    if exists {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), style(description).dim());
    }
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            "Unknown configuration key '{}'. Run 'proshop config keys' to list them.",
            key
        ))
    }
}

fn global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn config_path(use_global: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if use_global {
        return global_config_path();
    }
    discover(global)
        .map(|p| p.shop_dir().join("config.yaml"))
        .ok_or_else(|| miette::miette!("Not in a pro-shop project. Use --global or run 'proshop init'."))
}

fn read_mapping(path: &PathBuf) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content).into_diagnostic()? {
        serde_yml::Value::Mapping(map) => Ok(map),
        serde_yml::Value::Null => Ok(serde_yml::Mapping::new()),
        _ => Err(miette::miette!("{} is not a YAML mapping", path.display())),
    }
}

fn write_mapping(path: &PathBuf, map: serde_yml::Mapping) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&serde_yml::Value::Mapping(map)).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "author" => config.author.clone(),
        "editor" => config.editor.clone(),
        "default_format" => config.default_format.clone(),
        "shop_id" => config.shop_id.clone(),
        "shop_name" => config.shop_name.clone(),
        "shop_phone" => config.shop_phone.clone(),
        "shop_address" => config.shop_address.clone(),
        _ => None,
    }
}
