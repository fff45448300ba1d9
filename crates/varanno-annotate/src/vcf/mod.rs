//! VCF input
//!
//! [`VcfReader`] reads a VCF with noodles-vcf into [`VariantLine`]s and
//! [`expand`] splits each line into single-allele
//! [`VariantRecord`](varanno_common::VariantRecord)s with read percentages.

pub mod expand;
pub mod reader;

pub use expand::{expand, expand_all, read_percentages, round2, ExpansionSummary};
pub use reader::{VariantLine, VcfReader};
