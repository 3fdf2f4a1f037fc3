use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use matchstats_sql::db::{self, ConnectionConfig, PgIntrospector};
use matchstats_sql::position::{self, catalog};
use matchstats_sql::{CoalesceGenerator, GeneratorConfig, StaticIntrospector};
use std::path::PathBuf;
use tracing::Level;

/// Generate SQL select-list fragments for merged player statistics
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Generator config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a COALESCE select list merging the given source tables
    Coalesce {
        /// Source table, in precedence order (repeatable)
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Read the reference schema from a TOML schema file
        #[arg(long, conflicts_with = "connect")]
        schema_file: Option<PathBuf>,

        /// Read the reference schema through a saved connection
        #[arg(long)]
        connect: Option<String>,

        /// Override the reference table name
        #[arg(long)]
        reference_table: Option<String>,

        /// Override the database schema holding the reference table
        #[arg(long)]
        reference_schema: Option<String>,
    },
    /// Print the select list for a position
    Position { label: String },
    /// List every position with its columns
    Positions {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    // stdout carries only generated SQL
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load_from(path)?,
        None => GeneratorConfig::load()?,
    };

    match cli.command {
        Command::Coalesce {
            tables,
            schema_file,
            connect,
            reference_table,
            reference_schema,
        } => {
            if let Some(table) = reference_table {
                config.reference_table = table;
            }
            if let Some(schema) = reference_schema {
                config.reference_schema = schema;
            }

            let fragment = match (schema_file, connect) {
                (Some(path), _) => {
                    let introspector = StaticIntrospector::load(&path)?;
                    CoalesceGenerator::from_config(introspector, &config)
                        .generate(&tables)
                        .await?
                }
                (None, Some(name)) => {
                    let connection = resolve_connection(&name)?;
                    let client = db::create_client(&connection).await?;
                    let introspector = PgIntrospector::new(client, &config.reference_schema);
                    CoalesceGenerator::from_config(introspector, &config)
                        .generate(&tables)
                        .await?
                }
                (None, None) => bail!("either --schema-file or --connect is required"),
            };
            println!("{fragment}");
        }
        Command::Position { label } => {
            if position::Position::from_label(&label).is_none() {
                tracing::warn!("unknown position {:?}; emitting no columns", label);
            }
            println!("{}", position::generate_position_select(&label));
        }
        Command::Positions { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog())?);
            } else {
                for entry in catalog() {
                    println!("{}: {}", entry.position, entry.columns.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn resolve_connection(name: &str) -> Result<ConnectionConfig> {
    let saved = db::load_saved_connections()?;
    let mut config = match db::find_connection(&saved, name) {
        Some(c) => c.clone(),
        None => {
            let names: Vec<&str> = saved.iter().map(|c| c.name.as_str()).collect();
            bail!(
                "no saved connection named {:?} (saved: {})",
                name,
                names.join(", ")
            );
        }
    };

    // Password: saved config, then PGPASSWORD, then interactive prompt
    if config.password.is_empty() {
        if let Ok(pw) = std::env::var("PGPASSWORD") {
            config.password = pw;
        } else {
            let prompt = format!("Password for {}: ", config.display_string());
            config.password = rpassword::read_password_from_tty(Some(&prompt))
                .context("Failed to read password")?;
        }
    }

    Ok(config)
}
