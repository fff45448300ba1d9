//! HGVS genomic notation for single-allele VCF variants
//!
//! Classifies a `(ref, alt)` pair into one of five mutation shapes and renders
//! the corresponding `g.` notation. Classification depends only on allele
//! lengths and the prefix relationship between the alleles.

use std::fmt;

use varanno_common::{Result, VarannoError};

/// Mutation shape of a `(ref, alt)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Substitution,
    Deletion,
    Insertion,
    Duplication,
    Delins,
}

impl MutationKind {
    /// Classify a `(ref, alt)` pair; `None` when no shape applies. Alleles
    /// must be ASCII.
    ///
    /// Guards are tried in order and the first match wins. Duplication is
    /// tested before the generic delins so that an alt extending the ref gets
    /// the more specific description.
    pub fn classify(reference: &str, alt: &str) -> Option<Self> {
        if !reference.is_ascii() || !alt.is_ascii() {
            return None;
        }
        let (r, a) = (reference.len(), alt.len());
        match (r, a) {
            (1, 1) => Some(Self::Substitution),
            (r, 1) if r > 1 => Some(Self::Deletion),
            (1, a) if a > 1 => Some(Self::Insertion),
            (r, a) if r > 1 && a > r && alt.starts_with(reference) => Some(Self::Duplication),
            (r, a) if r > 1 && a > 1 => Some(Self::Delins),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substitution => "substitution",
            Self::Deletion => "deletion",
            Self::Insertion => "insertion",
            Self::Duplication => "duplication",
            Self::Delins => "delins",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered HGVS genomic notation, e.g. `1:g.1158631A>G`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HgvsNotation {
    kind: MutationKind,
    text: String,
}

impl HgvsNotation {
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for HgvsNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for HgvsNotation {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Build the HGVS notation for one single-allele variant.
///
/// Returns [`VarannoError::Classification`] when the alleles match no shape
/// (an empty allele, for instance).
///
/// The deletion end position is `pos + len(alt) - 1`, which is relative to
/// the anchor base rather than the deleted span. Existing outputs depend on
/// it, so it is kept as is.
pub fn construct(chrom: &str, pos: u64, reference: &str, alt: &str) -> Result<HgvsNotation> {
    let kind = MutationKind::classify(reference, alt)
        .ok_or_else(|| VarannoError::classification(chrom, pos, reference, alt))?;

    let text = match kind {
        MutationKind::Substitution => format!("{chrom}:g.{pos}{reference}>{alt}"),
        MutationKind::Deletion => {
            let end = pos + alt.len() as u64 - 1;
            format!("{chrom}:g.{pos}_{end}del{}", &reference[1..])
        }
        MutationKind::Insertion => format!("{chrom}:g.{pos}_{}ins{}", pos + 1, &alt[1..]),
        MutationKind::Duplication => {
            let duplicated = &alt[reference.len()..];
            let end = pos + duplicated.len() as u64 - 1;
            format!("{chrom}:g.{pos}_{end}dup{duplicated}")
        }
        MutationKind::Delins => {
            let end = pos + reference.len() as u64 - 1;
            format!("{chrom}:g.{pos}_{end}delins{alt}")
        }
    };

    Ok(HgvsNotation { kind, text })
}
