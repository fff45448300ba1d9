//! VEP REST request and response types
//!
//! Only the fields the parser reads are modelled; everything else in the
//! response is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /vep/:species/hgvs`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HgvsRequest {
    pub hgvs_notations: Vec<String>,
}

/// One annotation object of the response array
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VepAnnotation {
    /// The notation this object answers, echoed back by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_severe_consequence: Option<String>,

    #[serde(default)]
    pub transcript_consequences: Vec<TranscriptConsequence>,

    #[serde(default)]
    pub colocated_variants: Vec<ColocatedVariant>,
}

/// A transcript-level consequence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranscriptConsequence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_symbol: Option<String>,
}

/// A catalogued variant at the same position
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColocatedVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_allele: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_allele_freq: Option<f64>,

    /// VEP sends `1` for somatic entries; booleans are accepted as well
    #[serde(default, deserialize_with = "truthy")]
    pub somatic: bool,
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}
