use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    NotFound,
    ValidationError,
    /// The catalog client returned an error.
    Failed,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::ValidationError => "validation_error",
            OutcomeKind::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Result of one migration operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub operation: &'static str,
    pub kind: OutcomeKind,
    pub detail: String,
}

impl MigrationOutcome {
    pub fn new(operation: &'static str, kind: OutcomeKind, detail: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            detail: detail.into(),
        }
    }

    pub fn success(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(operation, OutcomeKind::Success, detail)
    }

    pub fn not_found(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(operation, OutcomeKind::NotFound, detail)
    }

    pub fn validation_error(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(operation, OutcomeKind::ValidationError, detail)
    }

    pub fn failed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(operation, OutcomeKind::Failed, detail)
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.operation, self.detail)
    }
}

/// Outcomes of a file-driven run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub documents: usize,
    pub outcomes: Vec<MigrationOutcome>,
}

impl MigrationReport {
    pub fn push(&mut self, outcome: MigrationOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(OutcomeKind::Failed) > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} documents, {} operations: {} succeeded, {} not found, {} invalid, {} failed",
            self.documents,
            self.outcomes.len(),
            self.count(OutcomeKind::Success),
            self.count(OutcomeKind::NotFound),
            self.count(OutcomeKind::ValidationError),
            self.count(OutcomeKind::Failed)
        )
    }
}
