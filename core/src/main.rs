use clap::Parser;
use log::{error, info};
use neurosift_core::cli::report::TextReport;
use neurosift_core::cli::{Cli, Commands, OutputFormat};
use neurosift_core::{infer_modality, Pipeline, RecordFilter, Result};
use serde::Serialize;
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    info!("Using catalog {} ({})", config.catalog_path.display(), config.storage);

    match cli.command {
        Commands::Ingest => {
            let summary = Pipeline::new(config).ingest()?;
            println!("{}", TextReport::Ingest(&summary));
        }
        Commands::ProcessPatient { ref patient_id } => {
            for path in Pipeline::new(config).process_patient(patient_id)? {
                println!("{}", path.display());
            }
        }
        Commands::Label => {
            let summary = Pipeline::new(config).label()?;
            println!("{}", TextReport::Label(&summary));
        }
        Commands::Split { seed, ref output } => {
            let mut config = config.with_seed(seed);
            if let Some(path) = output {
                config = config.with_split_path(path);
            }
            let split = Pipeline::new(config).split()?;
            println!("{}", TextReport::Split(&split));
        }
        Commands::Query {
            ref patients,
            ref modalities,
            unlabeled,
            format,
        } => {
            let mut filter = RecordFilter::default().unlabeled_only(unlabeled);
            if !patients.is_empty() {
                filter = filter.with_patients(patients.iter().cloned());
            }
            if !modalities.is_empty() {
                filter = filter.with_modalities(modalities.iter().copied());
            }
            let records = Pipeline::new(config).query(&filter)?;
            match format {
                OutputFormat::Text => println!("{}", TextReport::Records(&records)),
                OutputFormat::Json => print_json(&records)?,
            }
        }
        Commands::Cohort {
            partition,
            ref classes,
            format,
        } => {
            let cohort = Pipeline::new(config).cohort(partition, classes)?;
            match format {
                OutputFormat::Text => println!("{}", TextReport::Cohort(&cohort)),
                OutputFormat::Json => print_json(&cohort)?,
            }
        }
        Commands::Infer { ref description } => {
            println!("{}", infer_modality(Some(description.as_str())));
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
