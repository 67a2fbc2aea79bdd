use clap::Parser;
use tracing_subscriber::EnvFilter;

use onilock::cli::commands::new::EntryArgs;
use onilock::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            ref master_password,
            ref filepath,
        } => onilock::cli::commands::init::execute(
            &cli,
            master_password.as_deref(),
            filepath.as_deref(),
        ),
        Commands::New {
            ref id,
            ref password,
            ref username,
            ref url,
            ref description,
            force,
        } => onilock::cli::commands::new::execute(
            &cli,
            id,
            EntryArgs {
                password: password.as_deref(),
                username: username.as_deref(),
                url: url.as_deref(),
                description: description.as_deref(),
                force,
            },
        ),
        Commands::List => onilock::cli::commands::list::execute(&cli),
        Commands::Copy { ref entry } => onilock::cli::commands::copy::execute(&cli, entry),
        Commands::Remove {
            ref id,
            ref master_password,
        } => onilock::cli::commands::remove::execute(&cli, id, master_password.as_deref()),
        Commands::Clear {
            ref master_password,
            force,
        } => onilock::cli::commands::clear::execute(&cli, master_password.as_deref(), force),
        Commands::Export {
            ref output,
            ref master_password,
            force,
        } => onilock::cli::commands::export::execute(
            &cli,
            output.as_deref(),
            master_password.as_deref(),
            force,
        ),
        Commands::Generate { length, no_special } => {
            onilock::cli::commands::generate::execute(length, no_special)
        }
        Commands::Keygen => onilock::cli::commands::keygen::execute(),
        Commands::Profiles => onilock::cli::commands::profiles::execute(&cli),
        Commands::Completions { shell } => onilock::cli::commands::completions::execute(shell),
        Commands::ClipboardServe => onilock::cli::clipboard::serve(),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        onilock::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
