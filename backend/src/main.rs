use anyhow::Result;
use chrono::Local;
use chore_rota::domain::ResetOutcome;
use chore_rota::Backend;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use shared::PointsPeriod;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chore-rota",
    about = "Distribute household chores each week and keep score",
    version
)]
struct Cli {
    /// Data directory (defaults to $CHORE_ROTA_DATA_DIR, then ~/Documents/Chore Rota)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the weekly reset if due, then make sure this week has assignments
    Rollover,
    /// Throw away this week's assignments and distribute them again
    Reassign,
    /// Print the leaderboard
    Points {
        #[arg(long, value_enum, default_value_t = Period::Weekly)]
        period: Period,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Period {
    Weekly,
    Yearly,
}

impl From<Period> for PointsPeriod {
    fn from(period: Period) -> Self {
        match period {
            Period::Weekly => PointsPeriod::Weekly,
            Period::Yearly => PointsPeriod::Yearly,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let backend = Backend::new(cli.data_dir)?;
    info!("Using data directory {}", backend.data_directory().display());

    let now = Local::now().naive_local();
    let mut rng = rand::thread_rng();

    match cli.command {
        Command::Rollover => match backend.rollover(now, &mut rng)? {
            ResetOutcome::Reset { assignments } => {
                println!("New week started: {} assignments created", assignments)
            }
            ResetOutcome::NotDue { last_run } => {
                println!("Week already started (last reset {})", last_run)
            }
        },
        Command::Reassign => {
            let result = backend.assignment_service.reassign_current_week(now, &mut rng)?;
            backend.points_service.refresh_points(now)?;
            println!(
                "Reassigned {}: {} assignments",
                result.week,
                result.assignments.len()
            );
        }
        Command::Points { period } => {
            let period = PointsPeriod::from(period);
            for (rank, entry) in backend
                .points_service
                .leaderboard(period, now)?
                .iter()
                .enumerate()
            {
                println!(
                    "{:>2}. {:<20} {:>5}",
                    rank + 1,
                    entry.name,
                    entry.points_for(period)
                );
            }
        }
    }

    Ok(())
}
