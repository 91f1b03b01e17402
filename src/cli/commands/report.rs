//! `proshop report` command - Shop activity and fitting reports

use chrono::{Duration, Utc};
use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::Shop;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cache::EntityCache;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Work-order activity over the last N days
    Summary(SummaryArgs),

    /// Average finger spans per grip style
    Grips(GripsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Trailing window in days
    #[arg(long, default_value = "30")]
    pub days: u32,

    /// Only orders recorded by this pro shop (default: all)
    #[arg(long)]
    pub shop: Option<String>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct GripsArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Summary(args) => run_summary(args, global),
        ReportCommands::Grips(args) => run_grips(args, global),
    }
}

fn run_summary(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let cache = EntityCache::open(&shop.project)?;
    let since = Utc::now()
        .checked_sub_signed(Duration::days(i64::from(args.days)))
        .ok_or_else(|| miette::miette!("--days {} reaches too far back", args.days))?;
    let summary = cache.shop_summary(since, args.shop.as_deref())?;

    let output = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary).into_diagnostic()? + "\n",
        OutputFormat::Yaml => serde_yml::to_string(&summary).into_diagnostic()?,
        _ => {
            let mut output = String::new();
            output.push_str(&format!("# Shop Summary (last {} days)\n\n", args.days));

            let mut builder = Builder::default();
            builder.push_record(["Metric", "Value"]);
            builder.push_record([
                "Customers served".to_string(),
                summary.distinct_customers.to_string(),
            ]);
            builder.push_record(["Work orders".to_string(), summary.work_orders.to_string()]);
            builder.push_record([
                "Avg satisfaction".to_string(),
                summary
                    .avg_satisfaction
                    .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v)),
            ]);
            builder.push_record(["Total billed".to_string(), format!("${:.2}", summary.total_cost)]);
            output.push_str(&builder.build().with(Style::markdown()).to_string());
            output.push('\n');
            output
        }
    };

    write_output(&output, args.output)
}

fn run_grips(args: GripsArgs, global: &GlobalOpts) -> Result<()> {
    let shop = Shop::open(global)?;
    let cache = EntityCache::open(&shop.project)?;
    let stats = cache.grip_style_stats()?;

    let output = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&stats).into_diagnostic()? + "\n",
        OutputFormat::Yaml => serde_yml::to_string(&stats).into_diagnostic()?,
        _ => {
            let mut output = String::new();
            output.push_str("# Grip Style Statistics\n\n");
            if stats.is_empty() {
                output.push_str("No customer drill sheets recorded.\n");
                return write_output(&output, args.output);
            }

            let span = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
            let mut builder = Builder::default();
            builder.push_record(["Grip Style", "Avg Thumb-Middle", "Avg Thumb-Ring", "Sheets"]);
            for row in &stats {
                builder.push_record([
                    row.grip_style.clone(),
                    span(row.avg_thumb_to_middle),
                    span(row.avg_thumb_to_ring),
                    row.count.to_string(),
                ]);
            }
            output.push_str(&builder.build().with(Style::markdown()).to_string());
            output.push('\n');

            let total: usize = stats.iter().map(|s| s.count).sum();
            output.push_str(&format!("\n- **Total sheets:** {}\n", total));
            output
        }
    };

    write_output(&output, args.output)
}

fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
