//! Structural inference over the individual workbook sheets.
//!
//! Each parser is a pure function of one sheet. Only the questionnaire parser
//! can fail the ingestion; the others degrade to defaults.

pub mod instructions;
pub mod levels;
pub mod questions;
pub mod recommendations;
pub mod thresholds;
