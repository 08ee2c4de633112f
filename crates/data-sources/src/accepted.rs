//! Accepted upload file kinds.

use crate::error::{UploadError, UploadResult};

/// A file kind the analytics service can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptedKind {
    Csv,
}

impl AcceptedKind {
    /// Extension without the dot. Matching is case-sensitive.
    pub fn extension(&self) -> &'static str {
        match self {
            AcceptedKind::Csv => "csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AcceptedKind::Csv => "CSV",
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.extension())
    }
}

/// The set of kinds an upload may have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    accepted: Vec<AcceptedKind>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(vec![AcceptedKind::Csv])
    }
}

impl UploadPolicy {
    pub fn new(accepted: Vec<AcceptedKind>) -> Self {
        Self { accepted }
    }

    pub fn accepted(&self) -> &[AcceptedKind] {
        &self.accepted
    }

    /// The kind `filename` matches, if any.
    pub fn classify(&self, filename: &str) -> Option<AcceptedKind> {
        self.accepted.iter().copied().find(|kind| kind.matches(filename))
    }

    /// Validate `filename` or return the message to show the user.
    pub fn validate(&self, filename: &str) -> UploadResult<AcceptedKind> {
        self.classify(filename).ok_or_else(|| {
            let labels: Vec<&str> = self.accepted.iter().map(|k| k.label()).collect();
            let expected = match labels.as_slice() {
                [] => "supported".to_string(),
                [only] => (*only).to_string(),
                many => many.join(" or "),
            };
            UploadError::Validation(format!("Please select a {expected} file"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_accepted() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.classify("report.csv"), Some(AcceptedKind::Csv));
        assert_eq!(policy.classify("q1.sales.csv"), Some(AcceptedKind::Csv));
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.classify("report.CSV"), None);
        assert_eq!(policy.classify("report.Csv"), None);
    }

    #[test]
    fn test_other_names_rejected() {
        let policy = UploadPolicy::default();
        for name in ["report.txt", "report", "csv", "report.csv.gz", "reportcsv", ""] {
            assert!(policy.validate(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_validation_message() {
        let err = UploadPolicy::default().validate("report.txt").unwrap_err();
        assert_eq!(err.to_string(), "Please select a CSV file");
    }

    #[test]
    fn test_empty_policy_accepts_nothing() {
        let policy = UploadPolicy::new(Vec::new());
        assert!(policy.validate("report.csv").is_err());
    }
}
