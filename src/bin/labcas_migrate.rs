use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use labcas_migrate::app::{Migration, MigrationReport, TracingProgress};
use labcas_migrate::config::{ConfigLoader, ResolvedConfig};
use labcas_migrate::domain::{ProductTypeMetadata, VocabularyKind};
use labcas_migrate::error::MigrationError;
use labcas_migrate::output::{JsonOutput, OutputMode};
use labcas_migrate::store::FsTargetStore;
use labcas_migrate::vocabulary::{Vocabularies, VocabularyMap};

#[derive(Parser)]
#[command(name = "labcas-migrate")]
#[command(about = "Migrate ECAS datasets and metadata into the LabCAS archive")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./labcas-migrate.json)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Migrate the selected dataset directories (default)")]
    Run(RunArgs),
    #[command(about = "Show the collection and dataset records mapped for one dataset")]
    Inspect(InspectArgs),
    #[command(about = "Dump one loaded reference vocabulary")]
    Vocab(VocabArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    /// Only migrate these dataset directories (overrides the config filter)
    #[arg(long = "dataset")]
    datasets: Vec<String>,
}

#[derive(Args)]
struct InspectArgs {
    dataset: String,
}

#[derive(Args)]
struct VocabArgs {
    #[arg(value_enum)]
    kind: VocabularyKind,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<MigrationError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MigrationError) -> u8 {
    match error {
        MigrationError::MissingConfig
        | MigrationError::ConfigRead(_)
        | MigrationError::ConfigParse(_)
        | MigrationError::DatasetNotFound(_) => 2,
        MigrationError::VocabularyLoad { .. } | MigrationError::MetadataParse { .. } => 3,
        MigrationError::SinkWrite { .. } => 4,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            if !args.datasets.is_empty() {
                config.datasets = args.datasets;
            }
            run_migration(&config, output_mode)
        }
        Commands::Inspect(args) => run_inspect(&config, &args.dataset, output_mode),
        Commands::Vocab(args) => run_vocab(&config, args.kind, output_mode),
    }
}

fn run_migration(config: &ResolvedConfig, output_mode: OutputMode) -> miette::Result<()> {
    let vocabularies = Vocabularies::load(&config.vocabularies)?;
    let store = FsTargetStore::new(
        config.target_metadata_dir.clone(),
        config.target_data_dir.clone(),
        config.revision.clone(),
    );
    let migration = Migration::new(config, &vocabularies, store);
    let report = migration.run(&TracingProgress)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_report(&report).into_diagnostic()?,
        OutputMode::Human => print_summary(&report),
    }
    Ok(())
}

fn run_inspect(
    config: &ResolvedConfig,
    dataset: &str,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let vocabularies = Vocabularies::load(&config.vocabularies)?;
    let store = FsTargetStore::new(
        config.target_metadata_dir.clone(),
        config.target_data_dir.clone(),
        config.revision.clone(),
    );
    let metadata = Migration::new(config, &vocabularies, store).inspect(dataset)?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_metadata(&metadata).into_diagnostic()?,
        OutputMode::Human => print_metadata(&metadata),
    }
    Ok(())
}

fn run_vocab(
    config: &ResolvedConfig,
    kind: VocabularyKind,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let vocabulary = VocabularyMap::load(kind, config.vocabularies.path(kind))?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_vocabulary(&vocabulary).into_diagnostic()?,
        OutputMode::Human => {
            for (title, id) in vocabulary.forward() {
                println!("{id}\t{title}");
            }
        }
    }
    Ok(())
}

fn print_summary(report: &MigrationReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}LabCAS migration summary{reset}");
    println!(
        "{cyan}archive files indexed: {}{reset}",
        report.archive_files_indexed
    );
    for dataset in &report.datasets {
        let clean =
            dataset.files_missing.is_empty() && dataset.files_without_filename.is_empty();
        let color = if clean {
            green
        } else {
            yellow
        };
        println!(
            "{color}{} -> {}/{} copied={} missing={} without_filename={}{reset}",
            dataset.name,
            dataset.collection_id,
            dataset.dataset_id,
            dataset.files_copied,
            dataset.files_missing.len(),
            dataset.files_without_filename.len()
        );
        println!("{color}   config: {}{reset}", dataset.config_path);
        for missing in &dataset.files_missing {
            println!("{yellow}   not found: {missing}{reset}");
        }
    }
}

fn print_metadata(metadata: &ProductTypeMetadata) {
    print!("{}", labcas_migrate::store::render_collection_config(metadata));
}
