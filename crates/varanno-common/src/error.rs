//! Error types for varanno

use thiserror::Error;

/// Result type alias for varanno operations
pub type Result<T> = std::result::Result<T, VarannoError>;

/// Main error type for varanno
#[derive(Error, Debug)]
pub enum VarannoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The (ref, alt) pair matches none of the known mutation shapes
    #[error("Cannot classify variant {chrom}:{pos} {reference}>{alt}")]
    Classification {
        chrom: String,
        pos: u64,
        reference: String,
        alt: String,
    },

    /// Total coverage of zero makes the read percentages undefined
    #[error("Total coverage is zero at {chrom}:{pos}")]
    DivisionByZero { chrom: String, pos: u64 },

    /// A whole annotation batch failed (transport, timeout or server status)
    #[error("Annotation batch failed: {0}")]
    BatchTransport(String),

    #[error("VCF parse error at line {line}: {message}")]
    VcfParse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VarannoError {
    /// Create a classification error
    pub fn classification(
        chrom: impl Into<String>,
        pos: u64,
        reference: impl Into<String>,
        alt: impl Into<String>,
    ) -> Self {
        Self::Classification {
            chrom: chrom.into(),
            pos,
            reference: reference.into(),
            alt: alt.into(),
        }
    }

    /// Create a batch transport error
    pub fn batch_transport(msg: impl Into<String>) -> Self {
        Self::BatchTransport(msg.into())
    }

    /// Create a VCF parse error
    pub fn vcf_parse(line: usize, message: impl Into<String>) -> Self {
        Self::VcfParse {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error only affects a single record or batch and the run can go on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Classification { .. } | Self::DivisionByZero { .. } | Self::BatchTransport(_)
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VarannoError::classification("1", 100, "", "A");
        assert_eq!(err.to_string(), "Cannot classify variant 1:100 >A");

        let err = VarannoError::DivisionByZero {
            chrom: "2".to_string(),
            pos: 42,
        };
        assert_eq!(err.to_string(), "Total coverage is zero at 2:42");

        let err = VarannoError::vcf_parse(7, "missing TC");
        assert_eq!(err.to_string(), "VCF parse error at line 7: missing TC");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(VarannoError::batch_transport("503").is_recoverable());
        assert!(VarannoError::classification("1", 1, "A", "").is_recoverable());
        assert!(VarannoError::DivisionByZero {
            chrom: "1".to_string(),
            pos: 1
        }
        .is_recoverable());
        assert!(!VarannoError::config("bad").is_recoverable());
        assert!(!VarannoError::vcf_parse(1, "bad").is_recoverable());
    }
}
