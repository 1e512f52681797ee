use clap::{Parser, Subcommand};
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stat_region_store::config::Config;
use stat_region_store::db::{connect_pool, RegionRef, TableKind};
use stat_region_store::services::{IngestService, StatService};

#[derive(Parser)]
#[command(name = "stat-region-store")]
#[command(about = "Normalize the regional statistics workbook and query it", long_about = None)]
struct Cli {
    /// Check numeric region codes against the registry (overrides VERIFY_REGION_CODES)
    #[arg(long)]
    verify_region_codes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the store contents with the given workbook
    Ingest {
        /// Path to the .xlsx workbook (defaults to WORKBOOK_PATH)
        #[arg(long)]
        file: Option<String>,
    },
    /// Value of one data point for one region and year
    Lookup {
        /// household or person
        #[arg(long)]
        table: String,
        #[arg(long)]
        year: i32,
        /// Region code (digits) or region name
        #[arg(long)]
        region: String,
        #[arg(long)]
        data_point: String,
    },
    /// Mean of a data point over the listed years
    Average {
        #[arg(long)]
        table: String,
        /// Comma-separated years, e.g. 2018,2022
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,
        #[arg(long)]
        region: String,
        #[arg(long)]
        data_point: String,
    },
    /// Data point value for every stored year, ascending
    AllYears {
        #[arg(long)]
        table: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        data_point: String,
    },
    /// Name of the region with the given code
    RegionName {
        #[arg(long)]
        code: i64,
    },
    /// List the region registry
    Regions,
    /// Per-region means of two data points, sorted by the comparator
    CompareRegions {
        #[arg(long)]
        table: String,
        #[arg(long)]
        comparator: String,
        #[arg(long)]
        data_point: String,
    },
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stat_region_store=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Starting with config: {:?}", config);

    let pool = connect_pool(&config.database_url).await?;
    let stats = StatService::new(
        pool.clone(),
        cli.verify_region_codes || config.verify_region_codes,
    );

    match cli.command {
        Command::Ingest { file } => {
            let path = file
                .or(config.workbook_path.clone())
                .ok_or("--file or WORKBOOK_PATH is required for ingest")?;
            let service = IngestService::new(pool.clone(), config.layout.clone());
            let summary = service.ingest_workbook(&path).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Lookup {
            table,
            year,
            region,
            data_point,
        } => {
            let kind: TableKind = table.parse()?;
            let value = stats
                .lookup(kind, year, &RegionRef::parse(&region), &data_point)
                .await?;
            println!("{value}");
        }
        Command::Average {
            table,
            years,
            region,
            data_point,
        } => {
            let kind: TableKind = table.parse()?;
            let value = stats
                .average(kind, &years, &RegionRef::parse(&region), &data_point)
                .await?;
            println!("{value}");
        }
        Command::AllYears {
            table,
            region,
            data_point,
        } => {
            let kind: TableKind = table.parse()?;
            let series = stats
                .all_years(kind, &RegionRef::parse(&region), &data_point)
                .await?;
            for entry in series {
                match entry.value {
                    Ok(value) => println!("{}\t{}", entry.year, value),
                    Err(e) => println!("{}\t({})", entry.year, e),
                }
            }
        }
        Command::RegionName { code } => {
            println!("{}", stats.resolve_region_name(code).await?);
        }
        Command::Regions => {
            let regions = stats.list_regions().await?;
            println!("{}", serde_json::to_string_pretty(&regions)?);
        }
        Command::CompareRegions {
            table,
            comparator,
            data_point,
        } => {
            let kind: TableKind = table.parse()?;
            let comparisons = stats.compare_regions(kind, &comparator, &data_point).await?;
            println!("{}", serde_json::to_string_pretty(&comparisons)?);
        }
    }

    Ok(())
}
