//! Schema migration CLI
//!
//! Operates the shipped migration chain against the database named by
//! `DATABASE_URL`: upgrade/downgrade walks, pointer inspection, and
//! authoring of new change-set file pairs (hand-written or drafted from the
//! entity-model diff).

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};
use migrate::changeset::Draft;
use migrate::engine::Migrator;
use migrate::model;

#[derive(Parser)]
#[command(name = "migrate", about = "Schema migration tool for the todo backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply change-sets forward up to a revision (default: chain tip)
    Upgrade {
        /// Target revision id
        revision: Option<String>,
    },
    /// Reverse change-sets back down to a revision, or all the way to "base"
    Downgrade {
        /// Target revision id, or "base" for the empty schema
        revision: String,
    },
    /// Print the database's current revision
    Current,
    /// Print the chain with applied revisions and the current one marked
    History,
    /// Author a new change-set file pair
    New {
        /// Human-readable description, e.g. "add email column"
        description: String,
        /// Draft the deltas by diffing the live schema against the model
        #[arg(long)]
        autogenerate: bool,
        /// Directory the .up.sql/.down.sql files are written to
        #[arg(long, default_value = "libs/migrate/src/revisions")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    let migrator = Migrator::shipped(pool.clone())?;

    match cli.command {
        Command::Upgrade { revision } => {
            let applied = migrator.upgrade(revision.as_deref()).await?;
            info!("Applied {} change-set(s)", applied);
            match migrator.current().await? {
                Some(revision) => println!("Database is now at {}", revision),
                None => println!("Database is at base"),
            }
        }
        Command::Downgrade { revision } => {
            let target = if revision == "base" {
                None
            } else {
                Some(revision.as_str())
            };
            let reverted = migrator.downgrade(target).await?;
            info!("Reverted {} change-set(s)", reverted);
            match migrator.current().await? {
                Some(revision) => println!("Database is now at {}", revision),
                None => println!("Database is at base"),
            }
        }
        Command::Current => match migrator.current().await? {
            Some(revision) => println!("{}", revision),
            None => println!("base"),
        },
        Command::History => {
            for entry in migrator.history().await? {
                let marker = if entry.current {
                    "->"
                } else if entry.applied {
                    " x"
                } else {
                    "  "
                };
                println!("{} {}  {}", marker, entry.id, entry.description);
            }
        }
        Command::New {
            description,
            autogenerate,
            out_dir,
        } => {
            let tip = migrator.chain().tip().map(|cs| cs.id);
            let mut draft = Draft::new(Utc::now(), &description, tip);

            if autogenerate {
                let deltas = model::diff(&pool, model::MODEL).await?;
                if deltas.is_empty() {
                    println!("Live schema already matches the model; writing an empty change-set");
                }
                draft.up_sql = deltas
                    .iter()
                    .map(|delta| delta.up_sql(model::MODEL))
                    .collect::<Vec<_>>()
                    .join("\n");
                draft.down_sql = deltas
                    .iter()
                    .rev()
                    .map(|delta| delta.down_sql(model::MODEL))
                    .collect::<Vec<_>>()
                    .join("\n");
            }

            std::fs::create_dir_all(&out_dir)?;
            let up_path = out_dir.join(draft.up_file_name());
            let down_path = out_dir.join(draft.down_file_name());
            std::fs::write(&up_path, draft.up_file())?;
            std::fs::write(&down_path, draft.down_file())?;

            println!("Wrote {}", up_path.display());
            println!("Wrote {}", down_path.display());
            if autogenerate {
                println!("The deltas are a draft; review them before applying.");
            }
            println!("\nRegister the change-set in revisions/mod.rs:\n");
            println!("{}", draft.registration_snippet());
        }
    }

    Ok(())
}
