mod export;
mod summary;
pub mod views;

pub use export::{export_csv, CsvExport, ExportError};
pub use summary::{summarize, ALL_DEPARTMENTS};
