mod config;

// Standard Library Imports
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

// External Crate Imports
use chrono::Local;
use clap::{Parser, Subcommand};
use export::{export_csv, output_stem, search_banner, text_report, write_outputs};
use glycomod::{CancellationToken, HttpSearchService, Persistence, Pipeline, export_rows};
use miette::{IntoDiagnostic, Result, WrapErr};
use peaks::{ChargeState, ScanType, Session, Spectrum, annotate_view, base_peak_charges, correlate};
use store::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Local Crate Imports
use config::Config;

// Constants ===========================================================================================================

const DEFAULT_DATABASE: &str = "glycofinder.sqlite3";

/// Picks glycan peaks out of mass spectra and searches for the compositions that could explain them
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Log everything down to debug messages (`RUST_LOG` still takes precedence)
    #[arg(long, global = true)]
    debug: bool,
    /// A JSON config file; defaults are used for anything it leaves out
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// The database holding the current selections and the search history
    #[arg(short, long, global = true, default_value = DEFAULT_DATABASE)]
    database: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database tables, if they don't exist yet
    Init,
    /// Select a peak from a peak list, reading its charge from the isotopes between two m/z values
    Pick {
        /// A two-column (m/z, intensity) peak list
        peak_list: PathBuf,
        /// The m/z of the monoisotopic peak
        first: f64,
        /// The m/z of a later isotope of the same analyte
        second: f64,
        /// Start a new peak number before adding this selection
        #[arg(long)]
        next: bool,
    },
    /// Select a mass with a known charge
    Add {
        mass: f64,
        charge: u8,
        /// Start a new peak number before adding this selection
        #[arg(long)]
        next: bool,
    },
    /// List the current selections
    List,
    /// Forget the current selections
    Clear,
    /// List the points of a peak list that deserve a label
    Annotate {
        peak_list: PathBuf,
        /// Only label points in this m/z range
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
        range: Option<Vec<f64>>,
        /// The data was recorded in profile mode
        #[arg(long)]
        continuous: bool,
    },
    /// Read the base-peak charge of every scan in a series of peak lists
    Survey {
        peak_lists: Vec<PathBuf>,
        /// Minutes between consecutive scans
        #[arg(long, default_value_t = 1.0)]
        scan_interval: f64,
    },
    /// Search for compositions matching the current selections
    Search {
        /// Where to write the CSV table and text report
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show past searches, or the stored results of one of them
    History { run_id: Option<i64> },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.debug { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = Config::load(args.config.as_deref())?;
    let mut store = Store::open(&args.database)?;

    match args.command {
        Command::Init => println!("Database ready at {}", args.database.display()),
        Command::Pick {
            peak_list,
            first,
            second,
            next,
        } => {
            let spectrum = read_spectrum(&peak_list, ScanType::Centroid)?;
            let correlation = correlate(&spectrum, first, second)?;
            let mut session = resume(&store, next)?;
            let selection = session.select(correlation);
            store.append_selections(&[selection])?;
            println!(
                "Peak {}: m/z {} with charge {}",
                selection.peak_number, selection.mass, selection.charge
            );
        }
        Command::Add { mass, charge, next } => {
            let charge = ChargeState::new(charge)
                .ok_or_else(|| miette::miette!("a charge of {charge} is outside the supported range of 0 to 4"))?;
            let mut session = resume(&store, next)?;
            let selection = session.push(mass, charge);
            store.append_selections(&[selection])?;
            println!("Peak {}: m/z {mass} with charge {charge}", selection.peak_number);
        }
        Command::List => {
            for selection in store.selections()? {
                println!(
                    "{}\t{}\t{}",
                    selection.peak_number, selection.mass, selection.charge
                );
            }
        }
        Command::Clear => store.clear_selections()?,
        Command::Annotate {
            peak_list,
            range,
            continuous,
        } => {
            let scan_type = if continuous {
                ScanType::Continuous
            } else {
                ScanType::Centroid
            };
            let spectrum = read_spectrum(&peak_list, scan_type)?;
            let range = range.and_then(|range| match range[..] {
                [lo, hi] => Some((lo, hi)),
                _ => None,
            });
            for annotation in annotate_view(&spectrum, range) {
                println!("{annotation}");
            }
        }
        Command::Survey {
            peak_lists,
            scan_interval,
        } => {
            let spectra = peak_lists
                .iter()
                .enumerate()
                .map(|(scan, path)| {
                    let text = read(path)?;
                    let retention_time = scan as f64 * scan_interval;
                    Ok(Spectrum::from_peak_list(&text, ScanType::Centroid, retention_time)?)
                })
                .collect::<Result<Vec<_>>>()?;
            for base_peak in base_peak_charges(&spectra) {
                println!(
                    "{}\t{}\t{}",
                    base_peak.retention_time, base_peak.mz, base_peak.charge
                );
            }
        }
        Command::Search { output_dir } => search(&config, store, &output_dir)?,
        Command::History { run_id: None } => {
            for entry in store.history()? {
                let status = if entry.finished { "finished" } else { "unfinished" };
                println!("{}\t{}\t{status}\t{} peak(s)", entry.id, entry.date, entry.data.len());
            }
        }
        Command::History {
            run_id: Some(run_id),
        } => {
            for result in store.results(run_id)? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    result.peak, result.measured, result.theoretical_mh, result.short_notation, result.tag
                );
            }
        }
    }

    Ok(())
}

// Private Functions ===================================================================================================

fn search(config: &Config, store: Store, output_dir: &Path) -> Result<()> {
    let selections = store.selections()?;
    let params = config.search_parameters();
    let service = HttpSearchService::new(config.service_url.as_str(), &config.user_agent, config.timeout())?;
    let mut pipeline =
        Pipeline::new(Arc::new(service), store, params, config.reducing_end()?).with_timeout(config.timeout());
    let report = pipeline.run(&selections, &CancellationToken::new())?;

    let mismatches = report.reconciliation.mismatches.len();
    if mismatches > 0 {
        eprintln!("{mismatches} result block(s) didn't match their submitted mass and were stored under peak 0");
    }
    if let Persistence::Failed { reason } = &report.persistence {
        eprintln!("The results couldn't be saved to the history: {reason}");
    }

    let text = text_report(&report.response);
    println!("{}", search_banner(report.reconciliation.composition_count()));
    println!("{text}");

    let csv = export_csv(&export_rows(&report.reconciliation.submitted), &config.columns)?;
    let (csv_path, report_path) = write_outputs(output_dir, &output_stem(Local::now()), &csv, &text)?;
    info!("wrote {} and {}", csv_path.display(), report_path.display());
    println!("Results written to {}", csv_path.display());
    Ok(())
}

fn resume(store: &Store, next: bool) -> Result<Session> {
    let mut session = Session::resume(store.selections()?);
    if next {
        session.next_peak();
    }
    Ok(session)
}

fn read_spectrum(path: &Path, scan_type: ScanType) -> Result<Spectrum> {
    let text = read(path)?;
    Ok(Spectrum::from_peak_list(&text, scan_type, 0.0)?)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))
}
