//! Core library for the autodiag-tools command line application.
//!
//! The library ingests the self-assessment questionnaire workbook and
//! reconstructs a normalized [`model::DataBundle`] from its loosely laid out
//! sheets. Workbook access lives under [`io`], the per-sheet structural
//! inference under [`parse`], positional conventions in [`layout`], the export
//! layout in [`flatten`], and the orchestration in [`bundle`].

pub mod bundle;
pub mod error;
pub mod flatten;
pub mod io;
pub mod layout;
pub mod logging;
pub mod model;
pub mod parse;

pub use bundle::{load_data, load_data_from_excel};
pub use error::{Result, ToolError};
pub use layout::WorkbookLayout;
