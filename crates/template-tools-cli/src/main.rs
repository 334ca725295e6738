mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use template_compose::{
    Category, CsvCatalog, ExportJob, ExportPipeline, FileFetcher, FontProvider, FontRegistry,
    RetryingFetcher, TemplateCatalog, calculate_statistics, fields, to_display,
};

use logger::CliLogger;

#[derive(Parser)]
#[command(name = "tplt", about = "Template composition CLI", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the templates of a job file into a paginated PDF
    Export {
        /// Job file (JSON: options + templates with field overrides)
        #[arg(short, long)]
        job: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory that relative asset URLs resolve against
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Directory of .ttf/.otf files named Family-Style
        #[arg(long)]
        fonts_dir: Option<PathBuf>,

        /// Times to retry a failed asset load
        #[arg(long, default_value = "3")]
        retries: usize,

        /// Only render the first N pages
        #[arg(long)]
        preview_pages: Option<usize>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// List the templates of a category from a catalog CSV
    Catalog {
        /// Catalog file (columns: id, name, url, category)
        #[arg(long)]
        csv: PathBuf,

        #[arg(long, value_enum)]
        category: CategoryArg,
    },

    /// Show the editable fields of a category and their defaults
    Fields {
        #[arg(long, value_enum)]
        category: CategoryArg,

        /// Also show positions in editor display pixels
        #[arg(long)]
        display: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Smartphone,
    Square,
    Rectangular,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Smartphone => Self::Smartphone,
            CategoryArg::Square => Self::Square,
            CategoryArg::Rectangular => Self::Rectangular,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(cli.verbose)
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Export {
            job,
            output,
            assets_dir,
            fonts_dir,
            retries,
            preview_pages,
            stats_only,
        } => {
            let export_job = ExportJob::load(&job)
                .await
                .with_context(|| format!("Failed to load job {}", job.display()))?;
            let (session, options) = export_job.into_session()?;

            // Calculate and show statistics
            let stats = calculate_statistics(&session.selection().categories());
            println!("Export Statistics:");
            println!("  Templates: {}", stats.instances);
            println!("  Pages: {}", stats.pages);
            println!("  Blank cells: {}", stats.blank_cells);
            for (category, count) in &stats.per_category {
                println!("  {}: {}", category, count);
            }

            if stats_only {
                return Ok(());
            }

            let fonts = match fonts_dir {
                Some(dir) => FontRegistry::load_dir(&dir)
                    .await
                    .with_context(|| format!("Failed to load fonts from {}", dir.display()))?,
                None => FontRegistry::new(),
            };
            if fonts.default_face().is_none() {
                log::warn!("No fallback font loaded; text in unavailable families will be skipped");
            }

            let fetcher = match assets_dir {
                Some(dir) => FileFetcher::with_root(dir),
                None => FileFetcher::new(),
            };
            let fetcher = RetryingFetcher::with_policy(fetcher, retries, Duration::from_millis(500));

            let pipeline = ExportPipeline::new(Arc::new(fetcher), Arc::new(fonts), options)
                .context("Invalid export options")?;
            let (instances, snapshot) = session.snapshot();
            let outcome = match preview_pages {
                Some(max_pages) => pipeline.preview(&instances, &snapshot, max_pages).await,
                None => pipeline.export(&instances, &snapshot).await,
            };

            if outcome.document.is_empty() {
                bail!("Export produced no document");
            }
            tokio::fs::write(&output, &outcome.document)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "Exported {} page(s) → {}",
                outcome.page_count,
                output.display()
            );
            if outcome.failure_count > 0 {
                println!(
                    "  {} template(s) could not be rendered as intended",
                    outcome.failure_count
                );
            }
        }

        Commands::Catalog { csv, category } => {
            let catalog = CsvCatalog::load(&csv)
                .await
                .with_context(|| format!("Failed to read catalog {}", csv.display()))?;
            for asset in catalog.templates(category.into())? {
                println!("{:>6}  {:<32} {}", asset.id, asset.name, asset.url);
            }
        }

        Commands::Fields { category, display } => {
            let category: Category = category.into();
            for def in fields::definitions(category) {
                if display {
                    println!(
                        "{:<10} ({:>4}, {:>4}) display ({:>7.1}, {:>7.1})  {:>5.0}px  {}",
                        def.name,
                        def.default_x,
                        def.default_y,
                        to_display(def.default_x, category),
                        to_display(def.default_y, category),
                        def.default_font_size,
                        def.default_color
                    );
                } else {
                    println!(
                        "{:<10} ({:>4}, {:>4})  {:>5.0}px  {}",
                        def.name, def.default_x, def.default_y, def.default_font_size, def.default_color
                    );
                }
            }
        }
    }

    Ok(())
}
