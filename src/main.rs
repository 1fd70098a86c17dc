use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use samply::config::SamplyConfig;
use samply::ncbi;
use samply::database::{establish_connection, get_database_url, reset_database, setup_database};
use samply::services::{ExportService, ImportService};
use samply::EntityKind;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Database URL or SQLite file path
    #[clap(long, global = true, env = "SAMPLY_DB")]
    db: Option<String>,
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate all tables
    Init,
    /// Import one TSV file in a single transaction
    Add {
        entity: String,
        /// Input file, or `-` for stdin
        file: String,
    },
    /// Export every row of an entity type as TSV
    Dump {
        entity: String,
        /// Output file; stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// List supported entity types and their columns
    Tables,
    /// Convert NCBI nodes.dmp and names.dmp into a taxon TSV
    NcbiTaxon {
        #[clap(short, long)]
        nodes: PathBuf,
        #[clap(short = 'a', long)]
        names: PathBuf,
        /// Extra taxa with negative taxids, in the taxon TSV layout
        #[clap(long)]
        custom: Option<PathBuf>,
        /// Output file; stdout when omitted
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => SamplyConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => SamplyConfig::default(),
    };
    setup_logging(args.log_level.as_ref().or(config.log_level.as_ref()));

    match args.command {
        Commands::Init => {
            let db = connect(&args.db, &config).await?;
            info!("Recreating all tables");
            reset_database(&db).await?;
        }
        Commands::Add { entity, file } => {
            let kind: EntityKind = entity.parse()?;
            let db = connect(&args.db, &config).await?;
            setup_database(&db).await?;

            let service = ImportService::with_options(db, config.import_options());
            let result = if file == "-" {
                service.import_reader(kind, io::stdin().lock()).await?
            } else {
                service.import_file(kind, &PathBuf::from(&file)).await?
            };
            info!(
                "Added {} {} records from {} rows",
                result.records_inserted, kind, result.rows_read
            );
        }
        Commands::Dump { entity, output } => {
            let kind: EntityKind = entity.parse()?;
            let db = connect(&args.db, &config).await?;
            setup_database(&db).await?;

            let service = ExportService::new(db);
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    service.export_to_writer(kind, BufWriter::new(file)).await?
                }
                None => service.export_to_writer(kind, io::stdout().lock()).await?,
            };
            info!("Dumped {} {} rows", written, kind);
        }
        Commands::Tables => {
            for kind in EntityKind::ALL {
                let columns: Vec<String> = kind
                    .columns()
                    .iter()
                    .map(|column| {
                        if kind.required().contains(column) {
                            format!("{}*", column)
                        } else {
                            column.to_string()
                        }
                    })
                    .collect();
                println!(
                    "{} ({})\n    {}",
                    kind,
                    kind.aliases().join(", "),
                    columns.join("\t")
                );
            }
        }
        Commands::NcbiTaxon {
            nodes,
            names,
            custom,
            output,
        } => {
            let nodes = open(&nodes)?;
            let names = open(&names)?;
            let custom = custom.as_deref().map(open).transpose()?;
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    ncbi::convert(nodes, names, custom, BufWriter::new(file))?
                }
                None => ncbi::convert(nodes, names, custom, io::stdout().lock())?,
            };
            info!("Wrote {} taxa", written);
        }
    }

    Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

async fn connect(db: &Option<String>, config: &SamplyConfig) -> Result<DatabaseConnection> {
    let database = db
        .as_ref()
        .or(config.database.as_ref())
        .context("Please provide the database with --db, SAMPLY_DB or the config file")?;
    let url = get_database_url(database);
    Ok(establish_connection(&url).await?)
}

fn setup_logging(log_level: Option<&String>) {
    let log_level = match log_level
        .map(|level| level.to_lowercase())
        .unwrap_or_else(|| "info".to_string())
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .with_writer(io::stderr)
        .without_time()
        .init();
}
