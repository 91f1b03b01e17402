use clap::Parser;
use miette::Result;
use proshop::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => proshop::cli::commands::init::run(args),
        Commands::Customer(cmd) => proshop::cli::commands::customer::run(cmd, &global),
        Commands::Ball(cmd) => proshop::cli::commands::ball::run(cmd, &global),
        Commands::Drill(cmd) => proshop::cli::commands::drill::run(cmd, &global),
        Commands::Wo(cmd) => proshop::cli::commands::wo::run(cmd, &global),
        Commands::Employee(cmd) => proshop::cli::commands::employee::run(cmd, &global),
        Commands::Location(cmd) => proshop::cli::commands::location::run(cmd, &global),
        Commands::Validate(args) => proshop::cli::commands::validate::run(args, &global),
        Commands::Report(cmd) => proshop::cli::commands::report::run(cmd, &global),
        Commands::Team(cmd) => proshop::cli::commands::team::run(cmd, &global),
        Commands::Cache(cmd) => proshop::cli::commands::cache::run(cmd, &global),
        Commands::Config(cmd) => proshop::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => proshop::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `PROSHOP_LOG` wins over `RUST_LOG`, and the flags over both
fn init_tracing(global: &GlobalOpts) {
    let filter = if global.verbose {
        EnvFilter::new("debug")
    } else if global.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env("PROSHOP_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
