//! Console presentation of classification results.
//!
//! - [`table`]: kept and duplicate tables shown before confirmation

pub mod table;

pub use table::{format_timestamp, TableOutput};
