//! File-backed collaborators for running against a content export.

mod export;
mod json_ledger;

pub use export::{load_export, ContentExport};
pub use json_ledger::JsonFileLedger;
