//! varanno - VCF to HGVS annotation tool

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use varanno_annotate::{pipeline, Alignment, AnnotateConfig};
use varanno_common::logging::{init_logging, LogConfig, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "varanno")]
#[command(author, version, about = "Annotate VCF variants with HGVS notation and Ensembl VEP data")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand, annotate through VEP and write a CSV
    Annotate {
        /// Input VCF
        input: PathBuf,

        /// Output CSV
        output: PathBuf,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Expand a VCF into single-allele records without annotation
    Expand {
        /// Input VCF
        input: PathBuf,

        /// Output CSV
        output: PathBuf,
    },

    /// Print the HGVS notation of every expanded record
    Hgvs {
        /// Input VCF
        input: PathBuf,
    },
}

/// Annotation service settings; unset flags fall back to `VARANNO_*` variables
#[derive(Args, Debug)]
struct ServiceArgs {
    /// Annotation server base URL
    #[arg(long, env = "VARANNO_SERVER_URL")]
    server_url: Option<String>,

    /// Batch endpoint path on the server
    #[arg(long, env = "VARANNO_ENDPOINT_PATH")]
    endpoint_path: Option<String>,

    /// Notations per request
    #[arg(short, long, env = "VARANNO_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "VARANNO_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Extra attempts for a failed batch
    #[arg(long, env = "VARANNO_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// How payloads are matched to notations (positional, echo)
    #[arg(long, env = "VARANNO_ALIGNMENT")]
    alignment: Option<Alignment>,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

impl ServiceArgs {
    fn into_config(self) -> Result<AnnotateConfig> {
        let mut config = AnnotateConfig::from_env()?;

        if let Some(url) = self.server_url {
            config.server_url = url;
        }
        if let Some(path) = self.endpoint_path {
            config.endpoint_path = path;
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(retries) = self.max_retries {
            config.max_retries = retries;
        }
        if let Some(alignment) = self.alignment {
            config.alignment = alignment;
        }
        config.show_progress = !self.no_progress;

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("varanno")
        .filter_directives("reqwest=warn,hyper=warn")
        .build()
        // Environment variables take precedence
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Annotate {
            input,
            output,
            service,
        } => {
            let config = service.into_config()?;
            let summary = pipeline::annotate_vcf(&input, &output, config).await?;
            info!(
                lines = summary.expansion.lines,
                skipped_lines = summary.expansion.skipped_lines,
                records = summary.expansion.records,
                annotated = summary.annotation.annotated,
                "Done"
            );
        },
        Command::Expand { input, output } => {
            pipeline::expand_vcf(&input, &output)?;
        },
        Command::Hgvs { input } => {
            let stdout = std::io::stdout();
            pipeline::write_notations(&input, stdout.lock())?;
        },
    }

    Ok(())
}
