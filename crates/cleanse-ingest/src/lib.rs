//! Extraction phase: read a delimited source file into a frame.

pub mod csv_table;
pub mod extract;
pub mod frame;
pub mod hash;

pub use csv_table::{CsvTable, read_csv_table};
pub use extract::{Extractor, missing_columns};
pub use frame::build_frame;
pub use hash::compute_file_hash;
