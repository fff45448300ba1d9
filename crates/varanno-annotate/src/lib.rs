//! varanno Annotate Library
//!
//! Turns VCF variant calls into HGVS-annotated CSV rows.
//!
//! # Pipeline
//!
//! - **[`vcf`]**: read VCF lines and expand each alternate allele into a record with read
//!   percentages
//! - **[`hgvs`]**: build the HGVS genomic notation of a record
//! - **[`annotate`]**: send notations to the annotation service in batches and merge the
//!   results back
//! - **[`vep`]**: Ensembl VEP client and response parsing
//! - **[`output`]**: CSV writer
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use varanno_annotate::{config::AnnotateConfig, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AnnotateConfig::from_env()?;
//!     let summary =
//!         pipeline::annotate_vcf(Path::new("calls.vcf"), Path::new("calls.csv"), config).await?;
//!     println!("{} records annotated", summary.annotation.annotated);
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod config;
pub mod hgvs;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod vcf;
pub mod vep;

pub use annotate::{AnnotationReport, BatchAnnotator};
pub use config::{Alignment, AnnotateConfig};
pub use hgvs::{construct, HgvsNotation, MutationKind};
