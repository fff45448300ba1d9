//! varanno Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the varanno workspace.
//!
//! # Overview
//!
//! - **Types**: expanded variant records and the annotation fields merged onto them
//! - **Error Handling**: the workspace error type and result alias
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use varanno_common::{Result, VariantRecord};
//!
//! fn describe(record: &VariantRecord) -> Result<String> {
//!     Ok(format!("{}:{} {}>{}", record.chrom, record.pos, record.reference, record.alt))
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, VarannoError};
pub use types::{AnnotationFields, VariantRecord};
