//! Common types used across varanno

use serde::{Deserialize, Serialize};

/// One single-allele variant observation expanded from a VCF line.
///
/// A VCF line with N alternate alleles yields N records sharing
/// `chrom`, `pos`, `reference` and `depth`. Annotation fields start empty and
/// are filled at most once by the annotation merge.
///
/// # Examples
///
/// ```rust
/// use varanno_common::types::VariantRecord;
///
/// let record = VariantRecord {
///     chrom: "1".to_string(),
///     pos: 1158631,
///     reference: "A".to_string(),
///     alt: "G".to_string(),
///     depth: 200,
///     alt_reads: 50,
///     percent_alt_reads: 25.0,
///     percent_ref_reads: 75.0,
///     annotation: Default::default(),
/// };
/// assert!(!record.is_annotated());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Chromosome name as written in the VCF
    pub chrom: String,

    /// 1-based position
    pub pos: u64,

    /// Reference allele
    #[serde(rename = "ref")]
    pub reference: String,

    /// The single alternate allele of this record
    pub alt: String,

    /// Total read coverage at the position (INFO/TC)
    pub depth: u64,

    /// Reads supporting this alternate allele (INFO/TR)
    pub alt_reads: u64,

    /// `alt_reads / depth * 100`, rounded to two decimals
    pub percent_alt_reads: f64,

    /// `100 - percent_alt_reads`, rounded to two decimals
    pub percent_ref_reads: f64,

    /// Fields merged from the annotation service
    #[serde(default)]
    pub annotation: AnnotationFields,
}

impl VariantRecord {
    /// Whether any annotation field has been filled
    pub fn is_annotated(&self) -> bool {
        !self.annotation.is_empty()
    }
}

/// Annotation fields extracted from one annotation payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFields {
    /// Gene symbol of the first transcript consequence that carries one
    pub gene_name: String,

    /// Most severe consequence term
    pub variant_effect: String,

    /// Minor allele reported by a co-located variant
    pub minor_allele: String,

    /// Frequency of the minor allele
    pub minor_allele_frequency: Option<f64>,

    /// Whether the identifier comes from a somatic (COSMIC) co-located variant
    pub somatic: bool,

    /// Co-located variant identifier (COSMIC or dbSNP)
    pub id: String,
}

impl AnnotationFields {
    /// True when nothing was extracted
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
