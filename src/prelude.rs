//! Prelude module for convenient imports
//!
//! Re-exports the types needed to open the sources, run the rules and render
//! the results.
//!
//! ```rust,no_run
//! use shogo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let relational = MemoryRelational::new();
//! let diagrams = MemoryDiagrams::new().with_diagram("=A1", "<diagram/>")?;
//!
//! let report = Validator::new(&relational, &diagrams).check_block_counts("=A1")?;
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

// Running the rules
pub use crate::rules::{Interrupt, RuleKind, RuleReport, Validator};

// Outcomes
pub use crate::outcome::{Failure, FailureKind, ValidationOutcome, Verdict};

// Sources
pub use crate::source::{
    DiagramArchive, DiagramSource, MemoryDiagrams, MemoryRelational, MitoDatabase,
    RelationalSource,
};

// Configuration
pub use crate::config::{InputPaths, RunConfig};

// Error types
pub use crate::error::{ConfigError, InterconnectionError, SourceError};

// Report formatting
pub use crate::report::{ReportFormatter, RunSummary};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
