//! CSV output of annotated records

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use varanno_common::{Result, VariantRecord};

/// Column order of the output file
pub const COLUMNS: [&str; 14] = [
    "chrom",
    "pos",
    "ref",
    "alt",
    "depth",
    "alt_reads",
    "percent_alt_reads",
    "percent_ref_reads",
    "gene_name",
    "variant_effect",
    "minor_allele",
    "minor_allele_frequency",
    "somatic",
    "id",
];

/// Flat row view of a record; field order matches [`COLUMNS`]
#[derive(Serialize)]
struct Row<'a> {
    chrom: &'a str,
    pos: u64,
    #[serde(rename = "ref")]
    reference: &'a str,
    alt: &'a str,
    depth: u64,
    alt_reads: u64,
    percent_alt_reads: f64,
    percent_ref_reads: f64,
    gene_name: &'a str,
    variant_effect: &'a str,
    minor_allele: &'a str,
    minor_allele_frequency: Option<f64>,
    somatic: bool,
    id: &'a str,
}

impl<'a> From<&'a VariantRecord> for Row<'a> {
    fn from(record: &'a VariantRecord) -> Self {
        let annotation = &record.annotation;
        Self {
            chrom: &record.chrom,
            pos: record.pos,
            reference: &record.reference,
            alt: &record.alt,
            depth: record.depth,
            alt_reads: record.alt_reads,
            percent_alt_reads: record.percent_alt_reads,
            percent_ref_reads: record.percent_ref_reads,
            gene_name: &annotation.gene_name,
            variant_effect: &annotation.variant_effect,
            minor_allele: &annotation.minor_allele,
            minor_allele_frequency: annotation.minor_allele_frequency,
            somatic: annotation.somatic,
            id: &annotation.id,
        }
    }
}

/// Write records with a header row to any writer
pub fn write_records<W: Write>(writer: W, records: &[VariantRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // written explicitly so an empty run still gets a header
    csv_writer.write_record(COLUMNS)?;

    for record in records {
        csv_writer.serialize(Row::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records to a CSV file, replacing it if it exists
pub fn write_csv(path: impl AsRef<Path>, records: &[VariantRecord]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_records(std::io::BufWriter::new(file), records)
}
