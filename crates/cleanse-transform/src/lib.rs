//! Transform phase: column-scoped cleaning rules.
//!
//! - **identifiers**: integer coercion and foreign-key patterns
//! - **amount**: sign correction and quantile capping
//! - **datetime**: timestamp parsing with format fallback
//! - **dedupe**: keep-last de-duplication and null-key filtering
//! - **transformer**: the ordered rule set tying the steps together

pub mod amount;
pub mod datetime;
pub mod dedupe;
pub mod identifiers;
pub mod transformer;

pub use amount::{AmountOutcome, normalize_amount};
pub use datetime::{DateOutcome, parse_dates};
pub use dedupe::{dedupe_keep_last, drop_null_rows};
pub use identifiers::{coerce_identifier, enforce_pattern};
pub use transformer::{TransformOutput, Transformer};
