//! VCF reading using noodles-vcf
//!
//! Reads CHROM, POS, REF and ALT of each record plus the `TR`/`TC` INFO
//! fields. The input must start with a valid VCF header.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use noodles_vcf as nvcf;
use nvcf::variant::record::AlternateBases;
use nvcf::variant::record_buf::info::field::{value::Array, Value};
use varanno_common::{Result, VarannoError};

/// INFO key of the per-allele supporting read counts
const TOTAL_READS: &str = "TR";

/// INFO key of the total coverage
const TOTAL_COVERAGE: &str = "TC";

/// One multi-allelic VCF data line, reduced to what expansion needs
#[derive(Debug, Clone, PartialEq)]
pub struct VariantLine {
    /// 1-based line number in the source file
    pub line: usize,
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    /// Alternate alleles in file order
    pub alts: Vec<String>,
    /// Per-allele supporting read counts (INFO/TR)
    pub total_reads: Vec<u64>,
    /// Total coverage at the position (INFO/TC)
    pub total_coverage: u64,
}

/// Buffered reader that counts the lines consumed through it
struct LineCounter<R> {
    inner: R,
    lines: usize,
}

impl<R: BufRead> Read for LineCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.lines += bytecount(&buf[..n]);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for LineCounter<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        // the buffer is already filled, so this does no I/O
        if let Ok(buf) = self.inner.fill_buf() {
            self.lines += bytecount(&buf[..amt.min(buf.len())]);
        }
        self.inner.consume(amt);
    }
}

fn bytecount(buf: &[u8]) -> usize {
    buf.iter().filter(|&&b| b == b'\n').count()
}

/// VCF reader yielding [`VariantLine`]s
pub struct VcfReader<R> {
    inner: nvcf::io::Reader<LineCounter<R>>,
    header: nvcf::Header,
}

impl VcfReader<BufReader<File>> {
    /// Open a VCF file from a path and read its header
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> VcfReader<R> {
    /// Create a reader and parse the VCF header
    pub fn new(reader: R) -> Result<Self> {
        let mut inner = nvcf::io::Reader::new(LineCounter {
            inner: reader,
            lines: 0,
        });
        let header = inner.read_header().map_err(|e| {
            let line = inner.get_ref().lines + 1;
            VarannoError::vcf_parse(line, format!("invalid VCF header: {e}"))
        })?;

        Ok(Self { inner, header })
    }

    pub fn header(&self) -> &nvcf::Header {
        &self.header
    }

    /// Read the next data line, `Ok(None)` at end of input
    pub fn read_line(&mut self) -> Result<Option<VariantLine>> {
        let line = self.inner.get_ref().lines + 1;
        let mut record = nvcf::variant::RecordBuf::default();

        match self.inner.read_record_buf(&self.header, &mut record) {
            Ok(0) => Ok(None),
            Ok(_) => convert_record(&record, line).map(Some),
            Err(e) => Err(VarannoError::vcf_parse(line, e.to_string())),
        }
    }

    /// Read every remaining data line
    pub fn read_all(mut self) -> Result<Vec<VariantLine>> {
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            lines.push(line);
        }
        Ok(lines)
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

fn convert_record(record: &nvcf::variant::RecordBuf, line: usize) -> Result<VariantLine> {
    let chrom = record.reference_sequence_name().to_string();
    let pos = record
        .variant_start()
        .map(|p| p.get() as u64)
        .ok_or_else(|| VarannoError::vcf_parse(line, "missing POS"))?;
    let reference = record.reference_bases().to_string();

    let alts = record
        .alternate_bases()
        .iter()
        .map(|allele| {
            allele
                .map(str::to_string)
                .map_err(|e| VarannoError::vcf_parse(line, format!("invalid ALT: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut total_reads = None;
    let mut total_coverage = None;
    for (key, value) in record.info().as_ref() {
        match key.as_str() {
            TOTAL_READS => total_reads = Some(info_integers(key, value.as_ref(), line)?),
            TOTAL_COVERAGE => {
                total_coverage = match info_integers(key, value.as_ref(), line)?[..] {
                    [coverage] => Some(coverage),
                    _ => {
                        return Err(VarannoError::vcf_parse(line, "TC must hold one value"));
                    },
                }
            },
            _ => {},
        }
    }

    Ok(VariantLine {
        line,
        chrom,
        pos,
        reference,
        alts,
        total_reads: total_reads
            .ok_or_else(|| VarannoError::vcf_parse(line, "missing INFO/TR"))?,
        total_coverage: total_coverage
            .ok_or_else(|| VarannoError::vcf_parse(line, "missing INFO/TC"))?,
    })
}

/// Non-negative integers of an INFO value.
///
/// Keys missing from the header come back as strings and are parsed here.
fn info_integers(key: &str, value: Option<&Value>, line: usize) -> Result<Vec<u64>> {
    let invalid =
        |detail: String| VarannoError::vcf_parse(line, format!("invalid {key}: {detail}"));
    let from_int =
        |n: i32| u64::try_from(n).map_err(|_| invalid(format!("negative value {n}")));
    let from_str = |s: &str| {
        s.split(',')
            .map(|v| v.trim().parse::<u64>().map_err(|e| invalid(format!("'{v}': {e}"))))
            .collect::<Result<Vec<_>>>()
    };
    let missing = || invalid("missing value".to_string());

    match value {
        Some(Value::Integer(n)) => Ok(vec![from_int(*n)?]),
        Some(Value::Array(Array::Integer(values))) => values
            .iter()
            .map(|v| v.ok_or_else(missing).and_then(from_int))
            .collect(),
        Some(Value::String(s)) => from_str(s.as_str()),
        Some(Value::Array(Array::String(values))) => values
            .iter()
            .map(|v| v.as_deref().ok_or_else(missing))
            .map(|v| v.and_then(from_str))
            .collect::<Result<Vec<_>>>()
            .map(|parts| parts.concat()),
        Some(other) => Err(invalid(format!("unexpected value {other:?}"))),
        None => Err(invalid("flag without value".to_string())),
    }
}
