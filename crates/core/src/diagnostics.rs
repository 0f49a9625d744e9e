//! Structured diagnostics for non-fatal conditions.
//!
//! Data problems (missing attributes, unsupported geometries, degenerate
//! denominators) never abort an analysis. They are recorded here and
//! mirrored to `tracing` at warn level so a subscriber can pick them up.

use serde::Serialize;

/// Category of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Feature has no geometry at all.
    MissingGeometry,
    /// Geometry exists but yields no centroid (unsupported type or empty).
    UnsupportedGeometry,
    /// Attribute absent or null; defaulted to 0.
    MissingValue,
    /// Attribute present but not a finite number; defaulted to 0.
    InvalidValue,
    /// Zero sum of squares or zero weight total; statistic reported as 0.
    DegenerateDenominator,
    /// Entity with no neighbours.
    Island,
    /// Halved join counts computed from a non-symmetric adjacency.
    AsymmetricJoins,
}

/// One recorded warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Feature the warning is about, when it concerns a single feature.
    pub feature_id: Option<String>,
    pub message: String,
}

/// Collected warnings for one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning that is not tied to a specific feature.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Diagnostic {
            kind,
            feature_id: None,
            message: message.into(),
        });
    }

    /// Record a warning about one feature.
    pub fn warn_feature(
        &mut self,
        kind: DiagnosticKind,
        feature_id: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            kind,
            feature_id: Some(feature_id.into()),
            message: message.into(),
        });
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match &diagnostic.feature_id {
            Some(id) => {
                tracing::warn!(kind = ?diagnostic.kind, feature = %id, "{}", diagnostic.message)
            }
            None => tracing::warn!(kind = ?diagnostic.kind, "{}", diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of warnings of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
