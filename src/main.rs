//! Binary entry point: open the configured database, then either initialize
//! it, print schedule views, or export a report.
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use troupe_ledger::report::DATETIME_FORMAT;
use troupe_ledger::{
    build_report, build_section_report, db, default_destination, export_with, Config,
    DatabaseLocation, ExportFormat, ExportOptions, PdfFont, ReportKind, Section,
};

#[derive(Parser)]
#[command(name = "troupe-ledger")]
#[command(about = "Manage a theatre troupe's productions and export reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables if they do not exist yet
    Init,

    /// Export a statistical or detailed report
    Export {
        /// Report kind: statistical or detailed
        kind: ReportKind,

        /// Output format: pdf or xlsx
        #[arg(short, long, default_value = "pdf")]
        format: ExportFormat,

        /// Destination file (defaults to a timestamped file in the reports directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export a single detailed table (e.g. actors, performances, cast)
        #[arg(short, long)]
        section: Option<Section>,
    },

    /// Print the rehearsals and performances of a production
    Schedule {
        production_id: i64,
    },

    /// Print the next rehearsals from now on
    Upcoming {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let conn = db::open(&config).context("failed to open the troupe database")?;

    match cli.command {
        Commands::Init => {
            if let DatabaseLocation::File(path) = &config.database {
                println!("Database ready at {}", path.display());
            }
        }
        Commands::Export {
            kind,
            format,
            output,
            section,
        } => {
            let generated_at = now();
            let dataset = db::load_dataset(&conn).context("failed to load data for the report")?;
            let (report, stem) = match section {
                Some(section) if kind == ReportKind::Detailed => (
                    build_section_report(section, &dataset, generated_at),
                    format!("{}_{}", kind.file_stem(), section.label().to_lowercase()),
                ),
                Some(_) => anyhow::bail!("--section only applies to the detailed report"),
                None => (
                    build_report(kind, &dataset, generated_at),
                    kind.file_stem().to_string(),
                ),
            };
            let destination = output.unwrap_or_else(|| {
                default_destination(&config.reports_dir, &stem, format, generated_at)
            });
            let options = ExportOptions {
                pdf_font: config
                    .pdf_font
                    .clone()
                    .map(PdfFont::File)
                    .unwrap_or_default(),
            };
            export_with(&report, format, &destination, &options)
                .with_context(|| format!("failed to export {kind} report"))?;
            println!("Report written to {}", destination.display());
        }
        Commands::Schedule { production_id } => {
            let production = db::fetch_production(&conn, production_id)
                .with_context(|| format!("failed to load production {production_id}"))?;
            let schedule = db::production_schedule(&conn, production_id)
                .context("failed to load the production schedule")?;
            println!("{} ({} events)", production.title, schedule.len());
            for entry in schedule {
                println!(
                    "  {}  {:<11}  {} / {}",
                    entry.datetime.format(DATETIME_FORMAT),
                    entry.kind.to_string(),
                    entry.theatre_name,
                    entry.hall_name
                );
            }
        }
        Commands::Upcoming { limit } => {
            let rehearsals = db::upcoming_rehearsals(&conn, now(), limit)
                .context("failed to load upcoming rehearsals")?;
            info!("{} upcoming rehearsal(s)", rehearsals.len());
            for rehearsal in rehearsals {
                println!(
                    "  {}  {} ({}), dir. {}  at {} / {}",
                    rehearsal.datetime.format(DATETIME_FORMAT),
                    rehearsal.production_title,
                    rehearsal.play_title,
                    rehearsal.director_name,
                    rehearsal.theatre_name,
                    rehearsal.hall_name
                );
            }
        }
    }

    Ok(())
}
