//! trip-splitter CLI - split a GPS fix log into trips
//!
//! Usage:
//!   trip-splitter <points.csv> [--output <dir>] [--max-distance-km <km>] [--max-gap-min <min>]
//!
//! Writes `rejects.log`, one `trip_<n>.csv` per trip, `summaries.json` and
//! `trips.geojson` into the output directory.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use trip_splitter::{io, process_fixes, TripConfig, TripReport};

#[derive(Parser)]
#[command(name = "trip-splitter")]
#[command(about = "Split a GPS fix log into trips", long_about = None)]
struct Cli {
    /// CSV file with lat, lon and timestamp columns
    input: PathBuf,

    /// Output directory for trip files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Largest jump between consecutive fixes inside a trip, in km
    #[arg(long, default_value = "2")]
    max_distance_km: f64,

    /// Largest time gap between consecutive fixes inside a trip, in minutes
    #[arg(long, default_value = "25")]
    max_gap_min: f64,

    /// Enable verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match run(&cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> trip_splitter::Result<TripReport> {
    // Thresholds are checked before the input is even opened
    let config = TripConfig::new(cli.max_distance_km, cli.max_gap_min)?;

    let raw = io::read_fixes_from_path(&cli.input)?;
    let report = process_fixes(&raw, &config)?;
    io::write_report(&cli.output, &report)?;

    Ok(report)
}

fn print_report(report: &TripReport) {
    println!("\n{}", "=".repeat(60));
    println!(
        "{} fixes: {} in trips, {} rejected",
        report.total_fixes,
        report.valid_fixes(),
        report.rejected.len()
    );
    println!("{}", "=".repeat(60));

    for ((name, summary), trip) in report.named_summaries().zip(&report.trips) {
        println!(
            "  {:<10} {:>5} fixes  {:>9.3} km  {:>8.1} min  avg {:>6.1} km/h  max {:>6.1} km/h",
            name,
            trip.len(),
            summary.distance_km,
            summary.duration_min,
            summary.avg_speed_kmh,
            summary.max_speed_kmh
        );
    }
}
