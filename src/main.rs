//! zipdiff CLI
//!
//! Compares two ZIP archives by member name and content hash.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use zipdiff_compare::{ArchiveDiff, LoadOptions, OutputFormat, ReportConfig, Reporter, ZipReader};
use zipdiff_core::{ReferenceSide, ReportCategory};
use zipdiff_parsers::logging::{self, TracingConfig};

/// zipdiff - diff ZIP files by content
#[derive(Parser)]
#[command(name = "zipdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First archive (A)
    archive_a: PathBuf,

    /// Second archive (B)
    archive_b: PathBuf,

    /// Use archive A as reference (default)
    #[arg(short = 'a')]
    reference_a: bool,

    /// Use archive B as reference
    #[arg(short = 'b')]
    reference_b: bool,

    /// List reference entries missing or changed in the other archive
    #[arg(long)]
    deleted: bool,

    /// List added entries (not implemented yet)
    #[arg(long)]
    added: bool,

    /// List changed entries (not implemented yet)
    #[arg(long)]
    changed: bool,

    /// List renamed entries (not implemented yet)
    #[arg(long)]
    renamed: bool,

    /// List reference entries present unchanged in both archives
    #[arg(long)]
    same: bool,

    /// Enable every category
    #[arg(long)]
    all: bool,

    /// Skip directory members
    #[arg(long)]
    files_only: bool,

    /// Do not verify member CRC32 checksums
    #[arg(long)]
    no_crc: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let options = LoadOptions::default().with_crc_verification(!self.no_crc);
        if self.files_only {
            options.files_only()
        } else {
            options
        }
    }

    fn report_config(&self) -> ReportConfig {
        let mut config = ReportConfig::new(ReferenceSide::from_flags(self.reference_a, self.reference_b))
            .with_format(self.format);

        if self.all {
            return config.with_all();
        }

        let requested = [
            (self.deleted, ReportCategory::Deleted),
            (self.added, ReportCategory::Added),
            (self.changed, ReportCategory::Changed),
            (self.renamed, ReportCategory::Renamed),
            (self.same, ReportCategory::Same),
        ];
        for (enabled, category) in requested {
            if enabled {
                if !category.is_implemented() {
                    info!("--{} is not implemented and produces no output", category);
                }
                config = config.with_category(category);
            }
        }

        config
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_with_config(TracingConfig::from_verbosity(cli.verbose));

    info!("Comparing archives...");
    info!(" A: {:?}", cli.archive_a);
    info!(" B: {:?}", cli.archive_b);

    let reader = ZipReader::new(cli.load_options());
    let diff = ArchiveDiff::compare(&cli.archive_a, &cli.archive_b, &reader);

    let config = cli.report_config();
    let reporter = Reporter::new(&diff, &config);

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            reporter.write(&mut out).context("Failed to write report")?;
            out.flush()?;
            info!("Report written to {:?}", path);
        }
        None => {
            let mut out = io::stdout().lock();
            reporter.write(&mut out).context("Failed to write report")?;
            out.flush()?;
        }
    }

    if let Err(e) = diff.ensure_loaded() {
        error!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
