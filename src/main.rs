use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use deck::cli::{Cli, Commands};
use deck::commands::show::ShowTarget;
use deck::output::{self, Verbosity};
use deck::{DeckContext, commands};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug);
    if cli.quiet {
        output::set_verbosity(Verbosity::Quiet);
    } else if cli.verbose {
        output::set_verbosity(Verbosity::Verbose);
    }

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let ctx = DeckContext::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { hash, pick } => commands::scan::execute(&ctx, hash, pick)?,
        Commands::Pick { paths } => commands::pick::execute(&ctx, &paths)?,
        Commands::Unpick { all, paths } => commands::unpick::execute(&ctx, all, &paths)?,
        Commands::Commit { package, version } => {
            commands::commit::execute(&ctx, &package, &version)?;
        }
        Commands::List { names_only } => commands::list::execute(&ctx, names_only)?,
        Commands::Show { package, all } => {
            let target = match package.as_deref() {
                Some(name) if !all => ShowTarget::Package(name),
                _ => ShowTarget::All,
            };
            commands::show::execute(&ctx, target)?;
        }
        Commands::Remove { paths } => commands::remove::execute(&ctx, &paths)?,
        Commands::Reset { paths } => commands::reset::execute(&ctx, &paths)?,
        Commands::Uninstall { package, version } => {
            commands::uninstall::execute(&ctx, &package, version.as_deref())?;
        }
        Commands::Which { paths } => commands::which::execute(&ctx, &paths)?,
        Commands::Doctor => commands::doctor::execute(&ctx)?,
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
