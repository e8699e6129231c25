use serde::Serialize;
use std::fmt;

/// Why a record failed. Per-record only; fatal problems are `SourceError`s.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Text did not match the expected grammar.
    InputMalformed,
    /// A required row or document node is absent.
    LookupMiss,
    /// More than one candidate where exactly one was expected.
    AmbiguousMatch,
    /// No numeric id could be derived for the lookup.
    Unresolved,
    /// The node was found but lacks the structural feature its case requires.
    StructuralMismatch,
    /// Bookkeeping and commentary contradict each other.
    Inconsistent,
    CountMismatch,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::InputMalformed => "input malformed",
            FailureKind::LookupMiss => "lookup miss",
            FailureKind::AmbiguousMatch => "ambiguous match",
            FailureKind::Unresolved => "unresolved",
            FailureKind::StructuralMismatch => "structural mismatch",
            FailureKind::Inconsistent => "inconsistent",
            FailureKind::CountMismatch => "count mismatch",
        };
        write!(f, "{}", label)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
}

impl Failure {
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// A lookup that matched nothing. The reason always reads "... not found".
    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::new(FailureKind::LookupMiss, format!("{} not found", what))
    }

    /// A lookup that matched too much. The reason lists every candidate.
    pub fn ambiguous<I, S>(what: impl fmt::Display, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        let candidates: Vec<String> = candidates.into_iter().map(|c| c.to_string()).collect();
        Self::new(
            FailureKind::AmbiguousMatch,
            format!(
                "ambiguous {}: {} candidates [{}]",
                what,
                candidates.len(),
                candidates.join(", ")
            ),
        )
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail(Failure),
}

/// The result of checking one subject (a log row, a connection, a diagram).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub subject: String,
    pub verdict: Verdict,
}

impl ValidationOutcome {
    pub fn pass(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            verdict: Verdict::Pass,
        }
    }

    pub fn fail(subject: impl Into<String>, failure: Failure) -> Self {
        Self {
            subject: subject.into(),
            verdict: Verdict::Fail(failure),
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Pass)
    }

    /// Present exactly when the outcome failed.
    pub fn reason(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Pass => None,
            Verdict::Fail(failure) => Some(&failure.reason),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.verdict {
            Verdict::Pass => None,
            Verdict::Fail(failure) => Some(failure.kind),
        }
    }
}
