//! Batch annotation of expanded variant records
//!
//! Records are split into contiguous batches. Each batch becomes one request
//! carrying the HGVS notation of every classifiable record; the payloads that
//! come back are parsed and merged onto their records in place. A failed
//! batch leaves its records unfilled and the run moves on to the next one.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tracing::{debug, info, warn};
use varanno_common::{Result, VariantRecord};

use crate::config::{Alignment, AnnotateConfig};
use crate::hgvs;
use crate::progress::batch_progress;
use crate::vep::{self, AnnotationService, VepAnnotation};

/// Counters from one annotation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Batches processed
    pub batches: usize,
    /// Batches whose request failed as a whole
    pub failed_batches: usize,
    /// Records without a notation, never sent
    pub unclassified: usize,
    /// Records left with non-empty annotation fields
    pub annotated: usize,
    /// Records left without annotation, matching `!VariantRecord::is_annotated()`
    pub unfilled: usize,
}

/// Annotates records batch by batch through an [`AnnotationService`]
pub struct BatchAnnotator<S> {
    service: S,
    config: AnnotateConfig,
}

impl<S: AnnotationService> BatchAnnotator<S> {
    /// Create an annotator; fails on an invalid configuration
    pub fn new(service: S, config: AnnotateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Annotate `records` in place, keeping their order.
    ///
    /// Batches run one after another with a single request in flight.
    pub async fn annotate(&self, records: &mut [VariantRecord]) -> AnnotationReport {
        let mut report = AnnotationReport::default();
        let batch_count = records.len().div_ceil(self.config.batch_size);
        let pb = batch_progress(batch_count as u64, self.config.show_progress);

        info!(
            records = records.len(),
            batches = batch_count,
            batch_size = self.config.batch_size,
            "Starting annotation"
        );

        for (index, batch) in records.chunks_mut(self.config.batch_size).enumerate() {
            report.batches += 1;
            self.annotate_batch(index, batch, &mut report).await;
            pb.inc(1);
        }
        pb.finish_and_clear();

        report.unfilled = records.len() - report.annotated;
        report
    }

    async fn annotate_batch(
        &self,
        index: usize,
        batch: &mut [VariantRecord],
        report: &mut AnnotationReport,
    ) {
        // slots[i] is the position in `batch` of the record behind notations[i]
        let mut slots = Vec::with_capacity(batch.len());
        let mut notations = Vec::with_capacity(batch.len());

        for (slot, record) in batch.iter().enumerate() {
            match hgvs::construct(&record.chrom, record.pos, &record.reference, &record.alt) {
                Ok(notation) => {
                    slots.push(slot);
                    notations.push(notation.into_string());
                }
                Err(err) => {
                    warn!(batch = index, error = %err, "No HGVS notation, record not sent");
                    report.unclassified += 1;
                }
            }
        }

        if notations.is_empty() {
            debug!(batch = index, "Nothing to send");
            return;
        }

        let payloads = match self.request(index, &notations).await {
            Ok(payloads) => payloads,
            Err(err) => {
                warn!(
                    batch = index,
                    records = notations.len(),
                    error = %err,
                    "Annotation batch failed, records left unfilled"
                );
                report.failed_batches += 1;
                return;
            }
        };

        if payloads.len() != notations.len() {
            warn!(
                batch = index,
                sent = notations.len(),
                received = payloads.len(),
                "Response size differs from request"
            );
        }

        let pairs: Vec<(usize, Value)> = match self.config.alignment {
            Alignment::Positional => slots.into_iter().zip(payloads).collect(),
            Alignment::Echo => align_by_echo(&slots, &notations, payloads),
        };

        for (slot, payload) in pairs {
            match serde_json::from_value::<VepAnnotation>(payload) {
                Ok(annotation) => {
                    let fields = vep::parse(&annotation);
                    if fields.is_empty() {
                        debug!(batch = index, slot, "Payload carried no annotation fields");
                    } else {
                        report.annotated += 1;
                    }
                    batch[slot].annotation = fields;
                }
                Err(err) => {
                    let record = &batch[slot];
                    warn!(
                        batch = index,
                        chrom = %record.chrom,
                        pos = record.pos,
                        error = %err,
                        "Malformed annotation payload"
                    );
                }
            }
        }
    }

    /// Send one batch, retrying up to `max_retries` times
    async fn request(&self, index: usize, notations: &[String]) -> Result<Vec<Value>> {
        let mut attempt = 0;
        loop {
            match self.service.annotate_batch(notations).await {
                Ok(payloads) => return Ok(payloads),
                Err(err) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(batch = index, attempt, error = %err, "Retrying annotation batch");
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Pair payloads with slots through the notation echoed in `input`.
///
/// Repeated notations are matched in request order. Payloads without a
/// known `input` are dropped.
fn align_by_echo(
    slots: &[usize],
    notations: &[String],
    payloads: Vec<Value>,
) -> Vec<(usize, Value)> {
    let mut pending: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (slot, notation) in slots.iter().zip(notations) {
        pending.entry(notation.as_str()).or_default().push_back(*slot);
    }

    payloads
        .into_iter()
        .filter_map(|payload| {
            let slot = payload
                .get("input")
                .and_then(Value::as_str)
                .and_then(|input| pending.get_mut(input))
                .and_then(VecDeque::pop_front);
            if slot.is_none() {
                debug!(input = ?payload.get("input"), "Payload matches no pending notation");
            }
            slot.map(|slot| (slot, payload))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use varanno_common::{AnnotationFields, VarannoError};

    /// Replays scripted responses and records every request it sees
    struct ScriptedService {
        responses: Mutex<VecDeque<Result<Vec<Value>>>>,
        requests: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedService {
        fn new(responses: Vec<Result<Vec<Value>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<Vec<String>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnnotationService for ScriptedService {
        async fn annotate_batch(&self, notations: &[String]) -> Result<Vec<Value>> {
            self.requests.lock().unwrap().push(notations.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VarannoError::batch_transport("no scripted response")))
        }
    }

    fn record(pos: u64, reference: &str, alt: &str) -> VariantRecord {
        VariantRecord {
            chrom: "1".to_string(),
            pos,
            reference: reference.to_string(),
            alt: alt.to_string(),
            depth: 10,
            alt_reads: 5,
            percent_alt_reads: 50.0,
            percent_ref_reads: 50.0,
            annotation: AnnotationFields::default(),
        }
    }

    fn gene(symbol: &str) -> Value {
        json!({ "transcript_consequences": [{ "gene_symbol": symbol }] })
    }

    fn config(batch_size: usize) -> AnnotateConfig {
        AnnotateConfig {
            batch_size,
            retry_delay_ms: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_partial_response_leaves_trailing_records_unfilled() {
        let service = ScriptedService::new(vec![Ok(vec![gene("SDF4"), gene("B3GALT6")])]);
        let annotator = BatchAnnotator::new(service, config(3)).unwrap();
        let mut records = vec![record(1, "A", "G"), record(2, "C", "T"), record(3, "G", "A")];

        let report = annotator.annotate(&mut records).await;

        assert_eq!(records[0].annotation.gene_name, "SDF4");
        assert_eq!(records[1].annotation.gene_name, "B3GALT6");
        assert!(!records[2].is_annotated());
        assert_eq!(report.annotated, 2);
        assert_eq!(report.unfilled, 1);
        assert_eq!(report.failed_batches, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_is_isolated() {
        let service = ScriptedService::new(vec![
            Err(VarannoError::batch_transport("503 Service Unavailable")),
            Ok(vec![gene("SDF4"), gene("GNB1")]),
        ]);
        let annotator = BatchAnnotator::new(service, config(2)).unwrap();
        let mut records = vec![
            record(1, "A", "G"),
            record(2, "C", "T"),
            record(3, "G", "A"),
            record(4, "T", "C"),
        ];

        let report = annotator.annotate(&mut records).await;

        assert!(!records[0].is_annotated());
        assert!(!records[1].is_annotated());
        assert_eq!(records[2].annotation.gene_name, "SDF4");
        assert_eq!(records[3].annotation.gene_name, "GNB1");
        assert_eq!(report.batches, 2);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.unfilled, 2);
    }

    #[tokio::test]
    async fn test_unclassifiable_record_does_not_consume_a_slot() {
        let service = ScriptedService::new(vec![Ok(vec![gene("FIRST"), gene("SECOND")])]);
        let annotator = BatchAnnotator::new(service, config(10)).unwrap();
        let mut records = vec![record(1, "A", "G"), record(2, "", "T"), record(3, "G", "A")];

        let report = annotator.annotate(&mut records).await;

        assert_eq!(
            annotator.service().requests(),
            vec![vec!["1:g.1A>G".to_string(), "1:g.3G>A".to_string()]]
        );
        assert_eq!(records[0].annotation.gene_name, "FIRST");
        assert!(!records[1].is_annotated());
        assert_eq!(records[2].annotation.gene_name, "SECOND");
        assert_eq!(report.unclassified, 1);
    }

    #[tokio::test]
    async fn test_batches_are_contiguous_and_ordered() {
        let service = ScriptedService::new(vec![
            Ok(vec![gene("A"), gene("B")]),
            Ok(vec![gene("C"), gene("D")]),
            Ok(vec![gene("E")]),
        ]);
        let annotator = BatchAnnotator::new(service, config(2)).unwrap();
        let mut records: Vec<_> = (1..=5).map(|pos| record(pos, "A", "G")).collect();

        let report = annotator.annotate(&mut records).await;

        let requests = annotator.service().requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2], vec!["1:g.5A>G".to_string()]);

        let genes: Vec<_> = records.iter().map(|r| r.annotation.gene_name.as_str()).collect();
        assert_eq!(genes, vec!["A", "B", "C", "D", "E"]);
        let positions: Vec<_> = records.iter().map(|r| r.pos).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.annotated, 5);
    }

    #[tokio::test]
    async fn test_batch_without_notations_sends_nothing() {
        let service = ScriptedService::new(vec![]);
        let annotator = BatchAnnotator::new(service, config(5)).unwrap();
        let mut records = vec![record(1, "", "G")];

        let report = annotator.annotate(&mut records).await;

        assert!(annotator.service().requests().is_empty());
        assert_eq!(report.failed_batches, 0);
        assert_eq!(report.unfilled, 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_only_affects_its_record() {
        let service = ScriptedService::new(vec![Ok(vec![
            json!({ "transcript_consequences": "not-a-list" }),
            gene("SDF4"),
        ])]);
        let annotator = BatchAnnotator::new(service, config(5)).unwrap();
        let mut records = vec![record(1, "A", "G"), record(2, "C", "T")];

        let report = annotator.annotate(&mut records).await;

        assert!(!records[0].is_annotated());
        assert_eq!(records[1].annotation.gene_name, "SDF4");
        assert_eq!(report.annotated, 1);
    }

    #[tokio::test]
    async fn test_retries_recover_a_batch() {
        let service = ScriptedService::new(vec![
            Err(VarannoError::batch_transport("timed out")),
            Ok(vec![gene("SDF4")]),
        ]);
        let annotator = BatchAnnotator::new(
            service,
            AnnotateConfig {
                max_retries: 1,
                ..config(5)
            },
        )
        .unwrap();
        let mut records = vec![record(1, "A", "G")];

        let report = annotator.annotate(&mut records).await;

        assert_eq!(annotator.service().requests().len(), 2);
        assert_eq!(records[0].annotation.gene_name, "SDF4");
        assert_eq!(report.failed_batches, 0);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let service = ScriptedService::new(vec![
            Err(VarannoError::batch_transport("timed out")),
            Ok(vec![gene("SDF4")]),
        ]);
        let annotator = BatchAnnotator::new(service, config(5)).unwrap();
        let mut records = vec![record(1, "A", "G")];

        let report = annotator.annotate(&mut records).await;

        assert_eq!(annotator.service().requests().len(), 1);
        assert_eq!(report.failed_batches, 1);
    }

    #[tokio::test]
    async fn test_echo_alignment_matches_on_input() {
        let service = ScriptedService::new(vec![Ok(vec![
            json!({ "input": "1:g.2C>T", "most_severe_consequence": "second" }),
            json!({ "input": "1:g.999A>G", "most_severe_consequence": "unknown" }),
            json!({ "input": "1:g.1A>G", "most_severe_consequence": "first" }),
        ])]);
        let annotator = BatchAnnotator::new(
            service,
            AnnotateConfig {
                alignment: Alignment::Echo,
                ..config(5)
            },
        )
        .unwrap();
        let mut records = vec![record(1, "A", "G"), record(2, "C", "T")];

        let report = annotator.annotate(&mut records).await;

        assert_eq!(records[0].annotation.variant_effect, "first");
        assert_eq!(records[1].annotation.variant_effect, "second");
        assert_eq!(report.annotated, 2);
    }

    #[tokio::test]
    async fn test_empty_payload_counts_as_unfilled() {
        let service = ScriptedService::new(vec![Ok(vec![json!({}), gene("SDF4")])]);
        let annotator = BatchAnnotator::new(service, config(5)).unwrap();
        let mut records = vec![record(1, "A", "G"), record(2, "C", "T")];

        let report = annotator.annotate(&mut records).await;

        assert!(!records[0].is_annotated());
        assert!(records[1].is_annotated());
        assert_eq!(report.annotated, 1);
        assert_eq!(report.unfilled, 1);
        let unfilled = records.iter().filter(|r| !r.is_annotated()).count();
        assert_eq!(report.unfilled, unfilled);
    }

    #[test]
    fn test_echo_alignment_with_repeated_notations() {
        let notations = vec!["1:g.1A>G".to_string(), "1:g.1A>G".to_string()];
        let payloads = vec![
            json!({ "input": "1:g.1A>G", "id": "a" }),
            json!({ "input": "1:g.1A>G", "id": "b" }),
            json!({ "input": "1:g.1A>G", "id": "c" }),
        ];
        let pairs = align_by_echo(&[0, 3], &notations, payloads);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, 0);
        assert_eq!(pairs[0].1["id"], "a");
        assert_eq!(pairs[1].0, 3);
        assert_eq!(pairs[1].1["id"], "b");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let service = ScriptedService::new(vec![]);
        assert!(BatchAnnotator::new(service, config(0)).is_err());
    }
}
