use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use turnover::import::read_rows_csv;
use turnover::model::parse_date;
use turnover::{BookingStore, Config, RuleOverlay, ServiceCycle, ServiceOverlay};

#[derive(Parser)]
#[command(name = "turnover")]
#[command(version)]
#[command(about = "Hotel reservations and daily housekeeping jobs")]
#[command(
    after_help = "Environment: TURNOVER_DATA_DIR, TURNOVER_ROOMS, TURNOVER_RULES, TURNOVER_SERVICES"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace all reservations from a CSV export
    Import {
        /// CSV file with id, room, arrival, departure columns
        rows: PathBuf,
    },

    /// Add a reservation by hand
    Add {
        room: String,
        /// DD/MM/YYYY
        arrival: String,
        /// DD/MM/YYYY
        departure: String,
        /// "n" for no service, or the number of days between services
        #[arg(default_value = "1")]
        cycle: String,
    },

    /// Change the service cycle of a reservation
    Update { id: String, cycle: String },

    /// Show all current reservations
    List,

    /// Jobs for one day, today by default
    Today {
        /// DD/MM/YYYY
        #[arg(value_parser = date_arg)]
        date: Option<NaiveDate>,

        /// Also write the job sheet to jobs.txt in the data directory
        #[arg(long)]
        print: bool,
    },

    /// Jobs for seven days starting at a date, today by default
    Week {
        /// DD/MM/YYYY
        #[arg(value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}' (DD/MM/YYYY)"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    turnover::observability::init();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.data_dir)?;
    info!("data_dir: {}", config.data_dir.display());

    // An unreadable image aborts startup.
    let mut store = BookingStore::open(&config.rooms, config.snapshot_path())?;
    let today = || Local::now().date_naive();

    match cli.command {
        Command::Import { rows } => {
            let rows = read_rows_csv(&rows)?;
            let rules = RuleOverlay::load(&config.rules_path)?;
            let services = ServiceOverlay::load(&config.services_path)?;
            let status = store.bulk_import(rows, &rules, &services)?;
            println!("{status}");
        }
        Command::Add {
            room,
            arrival,
            departure,
            cycle,
        } => match store.add(&room, &arrival, &departure, &cycle) {
            Ok(id) => println!("Booking {id} added successfully"),
            Err(e) => println!("Error: {e}"),
        },
        Command::Update { id, cycle } => {
            match store.update_service(&id, ServiceCycle::normalize(&cycle)) {
                Ok(()) => println!("Service cycle for booking {id} updated successfully"),
                Err(e) => println!("Error: {e}"),
            }
        }
        Command::List => {
            println!("All current bookings:");
            for line in store.list_all() {
                println!("{line}");
            }
        }
        Command::Today { date, print } => {
            let report = store.today_jobs(date.unwrap_or_else(today));
            println!("{report}");
            if print {
                let path = config.jobs_path();
                report.write_to(&path)?;
                info!("job sheet written to {}", path.display());
            }
        }
        Command::Week { date } => {
            println!("{}", store.week_projection(date.unwrap_or_else(today)));
        }
    }

    Ok(())
}
