//! Depthify - turn a photo into a 3D model and inspect it
//!
//! This is the command-line entry point for conversion, viewing, and the
//! read-only catalog endpoints.

mod commands;
mod phases;
mod session;
mod settings;
mod state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{AccountCommand, CatalogCommand, ConvertArgs, ViewArgs};
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "depthify", version, about = "Turn photos into 3D models")]
struct Cli {
    /// Backend origin, overriding the settings file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image, process it, and download the model
    Convert(ConvertArgs),
    /// Open a GLB model in the viewer
    View(ViewArgs),
    #[command(flatten)]
    Catalog(CatalogCommand),
    #[command(flatten)]
    Account(AccountCommand),
    /// Show the settings file location, optionally writing the current settings to it
    Config {
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let cli = Cli::parse();
    let mut settings = Settings::load();
    if let Some(url) = cli.api_url {
        settings.api.base_url = url;
    }
    info!("Starting Depthify against {}", settings.api.base_url);

    match cli.command {
        Command::Convert(args) => commands::convert::run(&settings, args),
        Command::View(args) => commands::view::run(&settings, args),
        Command::Catalog(command) => commands::catalog::run_catalog(&settings, command),
        Command::Account(command) => commands::catalog::run_account(&settings, command),
        Command::Config { write } => {
            if write {
                let path = settings.save()?;
                println!("Wrote {}", path.display());
            } else {
                match Settings::settings_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("No config directory on this platform"),
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use depthify_integration::{DownloadFormat, ObjectType};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_parses_formats_and_hint() {
        let cli = Cli::parse_from([
            "depthify",
            "convert",
            "apple.jpg",
            "--object-type",
            "fruit",
            "--format",
            "ply,stl",
        ]);
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.object_type, ObjectType::Fruit);
        assert_eq!(args.formats, vec![DownloadFormat::Ply, DownloadFormat::Stl]);
        assert_eq!(args.name, "");
    }

    #[test]
    fn convert_defaults_to_ply() {
        let cli = Cli::parse_from(["depthify", "convert", "apple.jpg"]);
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.formats, vec![DownloadFormat::Ply]);
        assert_eq!(args.object_type, ObjectType::Auto);
    }

    #[test]
    fn convert_login_needs_both_credentials() {
        let cli = Cli::parse_from([
            "depthify",
            "convert",
            "apple.jpg",
            "--email",
            "ada@example.com",
            "--password",
            "secret",
        ]);
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.email.as_deref(), Some("ada@example.com"));
        assert!(Cli::try_parse_from(["depthify", "convert", "apple.jpg", "--email", "ada@example.com"]).is_err());
    }

    #[test]
    fn catalog_commands_are_top_level() {
        let cli = Cli::parse_from(["depthify", "--api-url", "http://backend:5000", "project", "12"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://backend:5000"));
        assert!(matches!(cli.command, Command::Catalog(CatalogCommand::Project { ref id }) if id == "12"));
    }
}
