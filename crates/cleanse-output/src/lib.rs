//! Output artifacts.
//!
//! - **atomic**: write-then-rename helpers shared by every writer
//! - **loader**: cleaned dataset (parquet + CSV) and its summary
//! - **report**: execution reports and error records

pub mod atomic;
pub mod loader;
pub mod report;

pub use atomic::{ensure_dir, write_atomically, write_json};
pub use loader::{ColumnProfile, DatasetSummary, Loader, summarize};
pub use report::{error_file_name, report_file_name, write_document};
