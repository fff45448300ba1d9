//! Extraction of annotation fields from one VEP annotation object

use varanno_common::AnnotationFields;

use super::types::VepAnnotation;

const COSMIC_PREFIX: &str = "COS";
const DBSNP_PREFIX: &str = "rs";

/// Extract the annotation fields of one payload.
///
/// Co-located variants are walked in order:
/// - an entry with a minor allele overwrites the minor allele and frequency
/// - a somatic entry with a COSMIC id sets `id`, marks the record somatic and
///   ends the walk
/// - a germline entry with a dbSNP id sets `id` and the walk continues, so a
///   later COSMIC entry still wins
pub fn parse(payload: &VepAnnotation) -> AnnotationFields {
    let mut fields = AnnotationFields {
        gene_name: payload
            .transcript_consequences
            .iter()
            .find_map(|tc| tc.gene_symbol.clone())
            .unwrap_or_default(),
        variant_effect: payload.most_severe_consequence.clone().unwrap_or_default(),
        ..AnnotationFields::default()
    };

    for variant in &payload.colocated_variants {
        if let Some(ref minor_allele) = variant.minor_allele {
            fields.minor_allele = minor_allele.clone();
            fields.minor_allele_frequency = variant.minor_allele_freq;
        }

        let id = variant.id.as_deref().unwrap_or_default();
        if variant.somatic && id.starts_with(COSMIC_PREFIX) {
            fields.id = id.to_string();
            fields.somatic = true;
            break;
        } else if !variant.somatic && id.starts_with(DBSNP_PREFIX) {
            fields.id = id.to_string();
        }
    }

    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn annotation(value: serde_json::Value) -> VepAnnotation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_payload_gives_defaults() {
        assert_eq!(parse(&VepAnnotation::default()), AnnotationFields::default());
    }

    #[test]
    fn test_first_gene_symbol_wins() {
        let payload = annotation(json!({
            "most_severe_consequence": "missense_variant",
            "transcript_consequences": [
                { "transcript_id": "ENST1" },
                { "gene_symbol": "SDF4" },
                { "gene_symbol": "B3GALT6" }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.gene_name, "SDF4");
        assert_eq!(fields.variant_effect, "missense_variant");
    }

    #[test]
    fn test_cosmic_before_rs_short_circuits() {
        let payload = annotation(json!({
            "colocated_variants": [
                { "id": "COS123", "somatic": 1 },
                { "id": "rs307348", "minor_allele": "T", "minor_allele_freq": 0.2 }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.id, "COS123");
        assert!(fields.somatic);
        // the walk stopped before the rs entry
        assert_eq!(fields.minor_allele, "");
        assert_eq!(fields.minor_allele_frequency, None);
    }

    #[test]
    fn test_later_cosmic_overrides_rs() {
        let payload = annotation(json!({
            "colocated_variants": [
                { "id": "rs307348", "minor_allele": "C", "minor_allele_freq": 0.0481 },
                { "id": "COSM4000", "somatic": true }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.id, "COSM4000");
        assert!(fields.somatic);
        assert_eq!(fields.minor_allele, "C");
        assert_eq!(fields.minor_allele_frequency, Some(0.0481));
    }

    #[test]
    fn test_rs_only() {
        let payload = annotation(json!({
            "colocated_variants": [
                { "id": "rs307348", "minor_allele": "G", "minor_allele_freq": 0.1 }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.id, "rs307348");
        assert!(!fields.somatic);
    }

    #[test]
    fn test_last_minor_allele_wins() {
        let payload = annotation(json!({
            "colocated_variants": [
                { "id": "rs1", "minor_allele": "A", "minor_allele_freq": 0.3 },
                { "id": "rs2", "minor_allele": "G", "minor_allele_freq": 0.05 }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.minor_allele, "G");
        assert_eq!(fields.minor_allele_frequency, Some(0.05));
        assert_eq!(fields.id, "rs2");
    }

    #[test]
    fn test_mismatched_prefixes_are_ignored() {
        let payload = annotation(json!({
            "colocated_variants": [
                { "id": "rs99", "somatic": 1 },
                { "id": "COSV555" },
                { "id": "CM000001" }
            ]
        }));
        let fields = parse(&payload);
        assert_eq!(fields.id, "");
        assert!(!fields.somatic);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let payload = annotation(json!({
            "most_severe_consequence": "intron_variant",
            "transcript_consequences": [{ "gene_symbol": "SDF4" }],
            "colocated_variants": [
                { "id": "rs1", "minor_allele": "A", "minor_allele_freq": 0.3 },
                { "id": "COS1", "somatic": 1 }
            ]
        }));
        let before = payload.clone();
        assert_eq!(parse(&payload), parse(&payload));
        assert_eq!(payload, before);
    }
}
