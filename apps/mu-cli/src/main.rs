use clap::{Parser, Subcommand};
use mu_app::{
    AppResult, ChempotService, ChempotsOutcome, FileFormat, IntervalReport, Settings,
    load_entry_store, load_settings, to_text, write_value,
};
use mu_chem::{Composition, Element, EntryStore, InMemoryEntryStore};
use mu_core::units::k;
use mu_reservoir::PressureRange;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mu-cli")]
#[command(about = "Chemical-potential reservoirs for defect calculations", long_about = None)]
struct Cli {
    /// Entry set (YAML or JSON) used as the entry store
    #[arg(short, long, global = true)]
    entries: Option<PathBuf>,
    /// Settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
    /// Write the result here instead of printing JSON to stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stability interval of a phase along one element's potential
    Stability {
        /// Target formula, e.g. BaTiO3
        formula: String,
        /// Open element (defaults to the most electronegative one)
        #[arg(long)]
        element: Option<String>,
    },
    /// Potentials for one condition, e.g. O-rich
    Condition {
        formula: String,
        condition: String,
    },
    /// Poor, middle and rich reservoirs for one element, or a condition
    Reservoirs {
        formula: String,
        /// Element symbol or condition token
        #[arg(long)]
        element: Option<String>,
    },
    /// Reservoirs over an oxygen partial-pressure grid
    Pressure {
        /// Precursor formulas, comma separated (e.g. BaO,TiO2)
        #[arg(long, value_delimiter = ',', required = true)]
        precursors: Vec<String>,
        /// Temperature in K
        #[arg(long)]
        temperature: f64,
        /// μ_O at 1 atm in eV; half the O2 entry energy when omitted
        #[arg(long)]
        oxygen_ref: Option<f64>,
        /// Lowest pressure in atm
        #[arg(long)]
        p_min: Option<f64>,
        /// Highest pressure in atm
        #[arg(long)]
        p_max: Option<f64>,
        #[arg(long)]
        npoints: Option<usize>,
        /// Target formula; elements the precursors miss are reported
        #[arg(long)]
        target: Option<String>,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let service = ChempotService::new(settings);
    let store = match &cli.entries {
        Some(path) => load_entry_store(path)?,
        None => InMemoryEntryStore::default(),
    };
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Stability { formula, element } => {
            cmd_stability(&service, &store, &formula, element.as_deref(), output)
        }
        Commands::Condition { formula, condition } => {
            cmd_condition(&service, &store, &formula, &condition, output)
        }
        Commands::Reservoirs { formula, element } => {
            cmd_reservoirs(&service, &store, &formula, element.as_deref(), output)
        }
        Commands::Pressure {
            precursors,
            temperature,
            oxygen_ref,
            p_min,
            p_max,
            npoints,
            target,
        } => {
            let defaults = service.settings().pressure_range;
            let range = PressureRange::new(
                p_min.unwrap_or(defaults.low()),
                p_max.unwrap_or(defaults.high()),
            )?;
            let precursors = precursors
                .iter()
                .map(|f| f.parse::<Composition>())
                .collect::<Result<Vec<_>, _>>()?;
            let mut request = service.pressure_request(precursors, k(temperature));
            request.oxygen_ref = oxygen_ref;
            request.pressure_range = range;
            if let Some(n) = npoints {
                request.npoints = n;
            }
            request.target = target.as_deref().map(str::parse::<Composition>).transpose()?;

            let reservoirs = service.generate_pressure_reservoirs_from_precursors(&store, &request)?;
            emit(&reservoirs, output)
        }
    }
}

fn cmd_stability(
    service: &ChempotService,
    store: &InMemoryEntryStore,
    formula: &str,
    element: Option<&str>,
    output: Option<&Path>,
) -> AppResult<()> {
    let target: Composition = formula.parse()?;
    let element: Element = match element {
        Some(symbol) => symbol.parse()?,
        None => mu_reservoir::default_element(&target).ok_or_else(|| {
            mu_app::AppError::InvalidInput(format!("{formula} has no elements"))
        })?,
    };
    let entries =
        store.entries_for_chemical_system(&target.chemical_system(), service.settings().thermo_type)?;
    let interval = service.stability_interval(&entries, &target, element)?;
    let report = IntervalReport::new(&interval, service.settings().tolerances());
    emit(&report, output)
}

fn cmd_condition(
    service: &ChempotService,
    store: &InMemoryEntryStore,
    formula: &str,
    condition: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let target: Composition = formula.parse()?;
    let chempots = service.generate_chempots_from_condition(
        store,
        &target,
        condition,
        service.settings().thermo_type,
    )?;
    emit(&chempots, output)
}

fn cmd_reservoirs(
    service: &ChempotService,
    store: &InMemoryEntryStore,
    formula: &str,
    element: Option<&str>,
    output: Option<&Path>,
) -> AppResult<()> {
    let target: Composition = formula.parse()?;
    let outcome =
        service.generate_chempots(store, &target, element, service.settings().thermo_type)?;
    if let ChempotsOutcome::Reservoirs(reservoirs) = &outcome {
        tracing::info!(count = reservoirs.len(), "reservoirs computed");
    }
    emit(&outcome, output)
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> AppResult<()> {
    match output {
        Some(path) => {
            write_value(path, value)?;
            tracing::info!(path = %path.display(), "result written");
        }
        None => println!("{}", to_text(value, FileFormat::Json)?),
    }
    Ok(())
}
