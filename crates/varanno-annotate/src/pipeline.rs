//! End-to-end runs: VCF in, CSV (or notation table) out

use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};
use varanno_common::{Result, VariantRecord};

use crate::annotate::{AnnotationReport, BatchAnnotator};
use crate::config::AnnotateConfig;
use crate::hgvs;
use crate::output;
use crate::vcf::{expand_all, ExpansionSummary, VcfReader};
use crate::vep::{AnnotationService, VepClient};

/// Outcome of a full annotation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub expansion: ExpansionSummary,
    pub annotation: AnnotationReport,
}

/// Read and expand every record of a VCF file
pub fn load_records(input: &Path) -> Result<(Vec<VariantRecord>, ExpansionSummary)> {
    let reader = VcfReader::from_path(input)?;
    let (records, summary) = expand_all(reader)?;
    info!(
        lines = summary.lines,
        records = summary.records,
        skipped_lines = summary.skipped_lines,
        "Expanded VCF records"
    );
    Ok((records, summary))
}

/// Expand, annotate through the VEP REST service and write the CSV
pub async fn annotate_vcf(
    input: &Path,
    output: &Path,
    config: AnnotateConfig,
) -> Result<RunSummary> {
    let client = VepClient::new(&config)?;
    info!(endpoint = %client.endpoint(), "Using VEP endpoint");
    annotate_vcf_with(input, output, client, config).await
}

/// Same as [`annotate_vcf`] with a caller-provided annotation service
#[instrument(skip_all, fields(input = %input.display()))]
pub async fn annotate_vcf_with<S: AnnotationService>(
    input: &Path,
    output: &Path,
    service: S,
    config: AnnotateConfig,
) -> Result<RunSummary> {
    let annotator = BatchAnnotator::new(service, config)?;
    let (mut records, expansion) = load_records(input)?;

    let annotation = annotator.annotate(&mut records).await;
    output::write_csv(output, &records)?;

    info!(
        output = %output.display(),
        records = records.len(),
        annotated = annotation.annotated,
        unfilled = annotation.unfilled,
        failed_batches = annotation.failed_batches,
        unclassified = annotation.unclassified,
        "Annotation complete"
    );

    Ok(RunSummary {
        expansion,
        annotation,
    })
}

/// Expand a VCF and write the records without annotation
pub fn expand_vcf(input: &Path, output: &Path) -> Result<ExpansionSummary> {
    let (records, summary) = load_records(input)?;
    output::write_csv(output, &records)?;
    info!(output = %output.display(), records = records.len(), "Expanded records written");
    Ok(summary)
}

/// Write `chrom pos ref alt notation` for every expanded record, tab-separated.
///
/// Unclassifiable records get `.` in place of the notation.
pub fn write_notations<W: Write>(input: &Path, mut writer: W) -> Result<ExpansionSummary> {
    let (records, summary) = load_records(input)?;
    for record in &records {
        let notation = hgvs::construct(&record.chrom, record.pos, &record.reference, &record.alt)
            .map(hgvs::HgvsNotation::into_string)
            .unwrap_or_else(|_| ".".to_string());
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            record.chrom, record.pos, record.reference, record.alt, notation
        )?;
    }
    writer.flush()?;
    Ok(summary)
}
