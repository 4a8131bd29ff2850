//! raceday-cli entry point: operator commands wrapping the ingestion
//! pipeline's building blocks (db, daily init, scheduler loop, backfill).

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "raceday")]
#[command(about = "Pari-mutuel racing-data ingestion CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Run the scheduler loop: acquires the single-instance lock, runs the
    /// daily initializer if today hasn't been seeded yet, then polls races
    /// on their adaptive intervals until the process is stopped.
    Scheduler {
        #[command(subcommand)]
        cmd: SchedulerCmd,
    },

    /// Re-fetch and upsert every finished race for a given NZ calendar date.
    Backfill {
        /// Date to backfill, `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    Migrate,
}

#[derive(Subcommand)]
enum SchedulerCmd {
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = raceday_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = raceday_db::status(&pool).await?;
                    println!("db_ok={} has_races_table={}", s.ok, s.has_races_table);
                }
                DbCmd::Migrate => {
                    raceday_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::Scheduler { cmd } => match cmd {
            SchedulerCmd::Run => commands::scheduler::run().await?,
        },

        Commands::Backfill { date } => commands::backfill::run(&date).await?,
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
