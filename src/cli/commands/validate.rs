//! `proshop validate` command - Check record files against schemas and form rules

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, RECORD_SUFFIX};
use crate::entities::DrillSheetDocument;
use crate::forms;
use crate::schema::validator::Validator;
use crate::yaml::parse_document;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to check (default: every record in the project)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Only check one record type (cust, ball, drl, wo, emp, loc)
    #[arg(long, short = 't')]
    pub entity_type: Option<EntityPrefix>,

    /// Show the summary only
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Result of checking one file
enum Outcome {
    Passed,
    Warnings(Vec<String>),
    Failed(Vec<String>),
    /// A located diagnostic (syntax or schema) already worth printing in full
    Diagnostic(miette::Report, usize),
    Skipped(&'static str),
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let files = if args.paths.is_empty() {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;
        all_record_files(&project)
    } else {
        expand_paths(&args.paths)
    };

    let validator = Validator::default();
    let mut stats = ValidationStats::default();

    if !args.summary && !global.quiet {
        println!("{} Validating {} file(s)...\n", style("→").blue(), files.len());
    }

    for path in &files {
        let prefix = EntityPrefix::from_path(path);
        if let Some(filter) = args.entity_type {
            if prefix != Some(filter) {
                continue;
            }
        }

        let outcome = match prefix {
            Some(prefix) => check_file(&validator, path, prefix),
            None => Outcome::Skipped("unknown record type"),
        };
        tracing::debug!(path = %path.display(), "checked");

        let show = !args.summary && !global.quiet;
        match outcome {
            Outcome::Skipped(reason) => {
                if show {
                    println!("{} {} - {} (skipped)", style("?").yellow(), path.display(), reason);
                }
                continue;
            }
            Outcome::Passed => {
                stats.files_passed += 1;
                if show {
                    println!("{} {}", style("✓").green(), path.display());
                }
            }
            Outcome::Warnings(warnings) => {
                stats.total_warnings += warnings.len();
                if args.strict {
                    stats.files_failed += 1;
                } else {
                    stats.files_passed += 1;
                }
                if show {
                    println!(
                        "{} {} - {} warning(s)",
                        style("!").yellow(),
                        path.display(),
                        warnings.len()
                    );
                    for warning in &warnings {
                        println!("    {}", style(warning).yellow());
                    }
                }
            }
            Outcome::Failed(errors) => {
                stats.files_failed += 1;
                stats.total_errors += errors.len();
                if show {
                    println!(
                        "{} {} - {} error(s)",
                        style("✗").red(),
                        path.display(),
                        errors.len()
                    );
                    for error in &errors {
                        println!("    {}", style(error).red());
                    }
                }
            }
            Outcome::Diagnostic(report, count) => {
                stats.files_failed += 1;
                stats.total_errors += count;
                if show {
                    println!("{} {} - {} error(s)", style("✗").red(), path.display(), count);
                    println!("{:?}", report);
                }
            }
        }
        stats.files_checked += 1;
    }

    if !global.quiet {
        print_summary(&stats);
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Syntax, then schema, then the record's form rules
fn check_file(validator: &Validator, path: &Path, prefix: EntityPrefix) -> Outcome {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Outcome::Failed(vec![e.to_string()]),
    };
    let filename = path.display().to_string();

    let document = match parse_document(&source, &filename) {
        Ok(doc) => doc,
        Err(e) => return Outcome::Diagnostic(miette::Report::new(e), 1),
    };

    if let Err(e) = validator.validate(&document, &source, &filename, prefix) {
        let count = e.violation_count();
        return Outcome::Diagnostic(miette::Report::new(e), count);
    }

    let mut warnings = Vec::new();
    if prefix == EntityPrefix::Drl {
        match DrillSheetDocument::from_value(document.clone()) {
            Ok(doc) if doc.is_legacy() => warnings.push(
                "legacy span layout (spans.middle_to_ring); run 'proshop drill migrate'".to_string(),
            ),
            Ok(_) => {}
            Err(e) => return Outcome::Failed(vec![e.to_string()]),
        }
    }

    match forms::check_document(prefix, document) {
        Ok(errors) if errors.is_empty() => {
            if warnings.is_empty() {
                Outcome::Passed
            } else {
                Outcome::Warnings(warnings)
            }
        }
        Ok(errors) => Outcome::Failed(
            errors
                .iter()
                .map(|(field, message)| format!("{}: {}", field, message))
                .collect(),
        ),
        Err(e) => Outcome::Failed(vec![e.to_string()]),
    }
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    if stats.total_warnings > 0 {
        println!("  Total warnings: {}", style(stats.total_warnings).yellow());
    }
    println!();
}

/// Every record file under the project's entity directories
fn all_record_files(project: &Project) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = EntityPrefix::all()
        .iter()
        .flat_map(|prefix| project.iter_entity_files(*prefix))
        .collect();
    files.sort();
    files
}

/// Explicit files are kept; directories contribute their record files
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| e.path().to_string_lossy().ends_with(RECORD_SUFFIX))
                    .map(|e| e.path().to_path_buf()),
            );
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files
}
