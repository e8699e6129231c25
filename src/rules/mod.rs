//! The reconciliation rules and the `Validator` that runs them.
//!
//! Every rule reads rows and documents through the source traits, judges each
//! record on its own and returns a `RuleReport`. Per-record problems become
//! failing outcomes; only `SourceError`s abort a rule.

use crate::error::SourceError;
use crate::outcome::ValidationOutcome;
use crate::source::{DiagramSource, RelationalSource};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

pub mod block_count;
pub mod log_consistency;
pub mod negation;

pub use block_count::{COMPOUND_GENERATION_TYPE, COMPOUND_VARIANT_SUFFIX};
pub use log_consistency::PORT_UNAVAILABLE_SENTINEL;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    LogConsistency,
    NegationWiring,
    BlockCount,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleKind::LogConsistency => "log consistency",
            RuleKind::NegationWiring => "negation wiring",
            RuleKind::BlockCount => "block/compound count",
        };
        write!(f, "{}", label)
    }
}

/// Outcomes of one rule for one subject (a run id or a diagram name).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub rule: RuleKind,
    pub subject: String,
    pub outcomes: Vec<ValidationOutcome>,
    /// The run was interrupted between records; `outcomes` holds what was checked.
    pub interrupted: bool,
}

impl RuleReport {
    pub fn new(rule: RuleKind, subject: impl Into<String>) -> Self {
        Self {
            rule,
            subject: subject.into(),
            outcomes: Vec::new(),
            interrupted: false,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ValidationOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    pub(crate) fn finish(self) -> Self {
        let failed = self.failures().count();
        info!(
            rule = %self.rule,
            subject = %self.subject,
            checked = self.outcomes.len(),
            failed,
            interrupted = self.interrupted,
            "rule finished"
        );
        self
    }
}

/// Cooperative stop signal, polled between records.
///
/// Clones share the same flag, so a caller can keep one clone and cancel
/// from another thread while the rules run.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_budget(self, budget: Duration) -> Self {
        self.with_deadline(Instant::now() + budget)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Runs the rules against one relational source and one diagram source.
pub struct Validator<'a> {
    relational: &'a dyn RelationalSource,
    diagrams: &'a dyn DiagramSource,
    interrupt: Interrupt,
}

impl<'a> Validator<'a> {
    pub fn new(relational: &'a dyn RelationalSource, diagrams: &'a dyn DiagramSource) -> Self {
        Self {
            relational,
            diagrams,
            interrupt: Interrupt::default(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Log descriptions must flag exactly the ports that have no function mapping.
    pub fn check_log_consistency(&self, run_id: &str) -> Result<RuleReport, SourceError> {
        log_consistency::check(self.relational, run_id, &self.interrupt)
    }

    /// Every negation interconnection of the diagram must be wired as its case requires.
    pub fn check_negation_wiring(&self, diagram: &str) -> Result<RuleReport, SourceError> {
        negation::check(self.relational, self.diagrams, diagram, &self.interrupt)
    }

    /// Block and compound node counts of the diagram must match the database.
    pub fn check_block_counts(&self, diagram: &str) -> Result<RuleReport, SourceError> {
        block_count::check(self.relational, self.diagrams, diagram, &self.interrupt)
    }

    /// Runs the log rule for `run_id` (if any) and both diagram rules for every
    /// diagram. Rules not yet started when the interrupt fires are skipped.
    pub fn check_all(
        &self,
        run_id: Option<&str>,
        diagrams: &[String],
    ) -> Result<Vec<RuleReport>, SourceError> {
        let mut reports = Vec::new();
        if let Some(run_id) = run_id {
            reports.push(self.check_log_consistency(run_id)?);
        }
        for diagram in diagrams {
            if self.interrupt.is_triggered() {
                break;
            }
            reports.push(self.check_negation_wiring(diagram)?);
            if self.interrupt.is_triggered() {
                break;
            }
            reports.push(self.check_block_counts(diagram)?);
        }
        Ok(reports)
    }
}
