//! # Shogo - MITO Reconciliation Engine
//!
//! **Shogo** cross-checks what the MITO diagram generator recorded in its
//! relational database against the diagram documents it packaged into the
//! output archive. It reads both sides, never writes either, and reports one
//! pass/fail outcome per checked record.
//!
//! ## Rules
//!
//! 1.  **Log consistency**: a log row's description must say "port not
//!     available" exactly when the port has no function mapping.
//! 2.  **Negation wiring**: every negated interconnection must appear in the
//!     diagram either as a direct connection (Case II) or as a signal-definition
//!     connector (Case I), depending on what the mapping tables say.
//! 3.  **Block/compound count**: the diagram holds as many block and compound
//!     nodes as the database says it should.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shogo::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let database = MitoDatabase::open("mito.db")?;
//!     let archive = DiagramArchive::open("diagrams.jar")?;
//!
//!     let validator = Validator::new(&database, &archive);
//!     let diagrams = archive.diagram_names()?;
//!     let reports = validator.check_all(Some("Import PCS7 Diagram-24-12-2025, 05:32 PM"), &diagrams)?;
//!
//!     println!("{}", ReportFormatter::format_text(&reports));
//!     Ok(())
//! }
//! ```
//!
//! Tests and dry runs use `MemoryRelational` and `MemoryDiagrams` in place of
//! the database and the archive.

pub mod assertion;
pub mod classify;
pub mod config;
pub mod data;
pub mod diagram;
pub mod error;
pub mod outcome;
pub mod parsing;
pub mod prelude;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod source;
