use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use ticket_rust::TicketError;
use ticket_rust::cli::commands;
use ticket_rust::cli::{Cli, Commands, parse_exit_code};
use ticket_rust::config;
use ticket_rust::logging::init_logging;
use ticket_rust::util::SystemEnvironment;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand {
                let _ = Cli::command().print_help();
            } else {
                let _ = err.print();
            }
            std::process::exit(parse_exit_code(err.kind()));
        }
    };

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(cli) {
        handle_error(&e);
    }
}

fn run(cli: Cli) -> ticket_rust::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Version => return commands::version::execute(&mut out),
        Commands::Completions(args) => return commands::completions::execute(args),
        _ => {}
    }

    let overrides = config::CliOverrides {
        tickets_dir: cli.dir,
        query_engine: cli.engine,
        jq_path: cli.jq,
    };
    let settings = config::load_config(&overrides)?;
    let mut err = io::stderr();

    match cli.command {
        Commands::Create(args) => {
            commands::create::execute(&args, &settings, &SystemEnvironment, &mut out)
        }
        Commands::Query(args) => commands::query::execute(&args, &settings, &mut out, &mut err),
        Commands::Show { id } => commands::show::execute(&id, &settings, &mut out),
        Commands::Ls(args) => commands::list::execute(&args, &settings, &mut out, &mut err),
        Commands::Closed(args) => commands::closed::execute(&args, &settings, &mut out),
        Commands::Version | Commands::Completions(_) => Ok(()),
    }
}

/// Print the error to stderr and exit.
///
/// Filter failures carry the filter's own diagnostics, which are passed
/// through after a `jq error:` prefix.
fn handle_error(err: &TicketError) -> ! {
    let mut stderr = io::stderr().lock();
    match err {
        TicketError::FilterFailed { stderr: message } => {
            let _ = write!(stderr, "jq error: {message}");
            if !message.ends_with('\n') {
                let _ = writeln!(stderr);
            }
        }
        other => {
            let _ = writeln!(stderr, "Error: {other}");
            if let Some(hint) = other.suggestion() {
                let _ = writeln!(stderr, "Hint: {hint}");
            }
        }
    }
    let _ = stderr.flush();
    std::process::exit(err.exit_code());
}
