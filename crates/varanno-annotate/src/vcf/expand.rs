//! Expansion of multi-allelic VCF lines into single-allele records

use tracing::{debug, warn};
use varanno_common::{AnnotationFields, Result, VarannoError, VariantRecord};

use super::reader::VariantLine;

/// Counters from one expansion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionSummary {
    /// Data lines read
    pub lines: usize,
    /// Records produced
    pub records: usize,
    /// Lines skipped because their total coverage was zero
    pub skipped_lines: usize,
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Alt and ref read percentages for `alt_reads` out of `depth`.
///
/// Both values are rounded to two decimals and always sum to 100.
pub fn read_percentages(alt_reads: u64, depth: u64) -> Option<(f64, f64)> {
    if depth == 0 {
        return None;
    }
    let percent_alt = round2(alt_reads as f64 / depth as f64 * 100.0);
    Some((percent_alt, round2(100.0 - percent_alt)))
}

/// Expand one VCF line into one record per `(ALT, TR)` pair, in allele order.
///
/// Pairs past the shorter of `ALT` and `TR` are dropped. A total coverage of
/// zero fails the whole line with [`VarannoError::DivisionByZero`].
pub fn expand(line: &VariantLine) -> Result<Vec<VariantRecord>> {
    if line.alts.len() != line.total_reads.len() {
        debug!(
            line = line.line,
            alts = line.alts.len(),
            tr = line.total_reads.len(),
            "ALT and TR lengths differ, extra values ignored"
        );
    }

    line.alts
        .iter()
        .zip(&line.total_reads)
        .map(|(alt, &alt_reads)| {
            let (percent_alt_reads, percent_ref_reads) =
                read_percentages(alt_reads, line.total_coverage).ok_or_else(|| {
                    VarannoError::DivisionByZero {
                        chrom: line.chrom.clone(),
                        pos: line.pos,
                    }
                })?;

            Ok(VariantRecord {
                chrom: line.chrom.clone(),
                pos: line.pos,
                reference: line.reference.clone(),
                alt: alt.clone(),
                depth: line.total_coverage,
                alt_reads,
                percent_alt_reads,
                percent_ref_reads,
                annotation: AnnotationFields::default(),
            })
        })
        .collect()
}

/// Expand every line from a reader.
///
/// Lines failing with a recoverable error (zero coverage) are logged and
/// skipped; any other error (a malformed line, an I/O failure) stops the pass.
pub fn expand_all<I>(lines: I) -> Result<(Vec<VariantRecord>, ExpansionSummary)>
where
    I: IntoIterator<Item = Result<VariantLine>>,
{
    let mut records = Vec::new();
    let mut summary = ExpansionSummary::default();

    for line in lines {
        let line = line?;
        summary.lines += 1;

        match expand(&line) {
            Ok(expanded) => records.extend(expanded),
            Err(err) if err.is_recoverable() => {
                warn!(line = line.line, error = %err, "Skipping VCF line");
                summary.skipped_lines += 1;
            }
            Err(err) => return Err(err),
        }
    }

    summary.records = records.len();
    Ok((records, summary))
}
