use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_directory::{DirectoryOptions, MeasurementSystem};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfdir", about = "Directory booklet PDF generator", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a directory PDF from a spreadsheet
    Generate {
        /// Input workbook (xlsx, xls, ods) or CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file [default: out_<timestamp>.pdf]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cover title
        #[arg(long)]
        title: Option<String>,

        /// Cards per page
        #[arg(long)]
        per_page: Option<usize>,

        /// Skip the table of contents
        #[arg(long)]
        no_toc: bool,

        /// Skip the section header on each page
        #[arg(long)]
        no_header: bool,

        /// Skip page numbers
        #[arg(long)]
        no_page_numbers: bool,

        /// Keep the same card orientation on every page
        #[arg(long)]
        no_symmetric: bool,

        /// Put the photo on the right of the first page
        #[arg(long)]
        no_reverse: bool,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,

        /// Units for the page size in the statistics (in, mm, pt)
        #[arg(long, default_value = "in")]
        units: MeasurementSystem,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Input workbook
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "out_{}.pdf",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            title,
            per_page,
            no_toc,
            no_header,
            no_page_numbers,
            no_symmetric,
            no_reverse,
            stats_only,
            units,
        } => {
            let mut options = match &config {
                Some(path) => DirectoryOptions::load(path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => DirectoryOptions::default(),
            };

            if let Some(title) = title {
                options.title = title;
            }
            if let Some(per_page) = per_page {
                options.items_per_page = per_page;
            }
            options.generate_toc &= !no_toc;
            options.generate_header &= !no_header;
            options.generate_page_numbers &= !no_page_numbers;
            options.symmetric_layout &= !no_symmetric;
            options.reverse_layout &= !no_reverse;
            options.validate()?;
            log::debug!("Effective options: {:?}", options);

            let sections = pdf_directory::load_sections(&input, &options)
                .await
                .with_context(|| format!("reading {}", input.display()))?;

            let stats = pdf_directory::calculate_statistics(&sections, &options)?;
            println!("Directory Statistics:");
            println!("  Records: {}", stats.records);
            println!(
                "  Page size: {:.2} x {:.2} {}",
                units.from_inches(stats.page_width_in),
                units.from_inches(stats.page_height_in),
                units.name()
            );
            println!("  Front matter pages: {}", stats.front_matter_pages);
            for (spec, pages) in options.sections.iter().zip(&stats.pages_per_section) {
                println!(
                    "  {}: {} pages",
                    spec.title.as_deref().unwrap_or("<untitled>"),
                    pages
                );
            }
            println!("  Total pages: {}", stats.total_pages);

            if stats_only {
                return Ok(());
            }

            let output = output.unwrap_or_else(default_output);
            pdf_directory::generate_pdf(&sections, &options, &output).await?;
            println!("Generated {} entries → {}", stats.records, output.display());
        }

        Commands::InitConfig { output } => {
            DirectoryOptions::default().save(&output).await?;
            println!("Wrote default configuration → {}", output.display());
        }

        Commands::Sheets { input } => {
            for name in pdf_directory::sheet_names(&input).await? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
