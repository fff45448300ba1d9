//! Ensembl VEP annotation service
//!
//! HTTP client, response types and the field extraction applied to each
//! returned annotation object.

pub mod client;
pub mod parser;
pub mod types;

pub use client::{AnnotationService, VepClient};
pub use parser::parse;
pub use types::*;
