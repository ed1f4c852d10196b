//! Plain-text tables for operator review.
//!
//! Two tables are rendered before the confirmation prompt: the kept records
//! of every duplicate group, then every duplicate record. Each row shows the
//! path, the size in bytes and the creation and modification timestamps in
//! local time.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::DuplicateFinder;
//! use dupsweep::output::table::TableOutput;
//! use std::path::Path;
//!
//! let (classification, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! TableOutput::new(&classification)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

use std::io;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use yansi::Paint;

use crate::duplicates::Classification;
use crate::scanner::FileRecord;

/// Timestamp layout used in table cells.
pub const TABLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADERS: [&str; 4] = ["Path", "Size (bytes)", "Creation Date", "Modification Date"];

const KEPT_TITLE: &str = "The following files will be kept (most recent versions):";
const DELETE_TITLE: &str = "The following files are selected for deletion:";

/// Format a timestamp for a table cell.
#[must_use]
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TABLE_TIMESTAMP_FORMAT)
        .to_string()
}

/// Renders the kept and duplicate tables of a classification.
pub struct TableOutput<'a> {
    classification: &'a Classification,
    color: bool,
}

impl<'a> TableOutput<'a> {
    /// Create a formatter with bold headers.
    #[must_use]
    pub fn new(classification: &'a Classification) -> Self {
        Self {
            classification,
            color: true,
        }
    }

    /// Enable or disable header styling.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write both tables.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if writing fails.
    pub fn write_to(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        let kept: Vec<&FileRecord> = self.classification.kept().collect();
        let duplicates: Vec<&FileRecord> = self.classification.duplicates().collect();

        self.write_table(writer, KEPT_TITLE, &kept)?;
        writeln!(writer)?;
        self.write_table(writer, DELETE_TITLE, &duplicates)
    }

    fn write_table(
        &self,
        writer: &mut dyn io::Write,
        title: &str,
        records: &[&FileRecord],
    ) -> io::Result<()> {
        let rows: Vec<[String; 4]> = records.iter().map(|r| row_for(r)).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        if self.color {
            writeln!(writer, "{}", title.bold())?;
        } else {
            writeln!(writer, "{}", title)?;
        }

        let header = format_row(&HEADERS.map(str::to_string), &widths);
        if self.color {
            writeln!(writer, "{}", header.bold())?;
        } else {
            writeln!(writer, "{}", header)?;
        }

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(writer, "{}", rule.join("  "))?;

        for row in &rows {
            writeln!(writer, "{}", format_row(row, &widths))?;
        }
        Ok(())
    }
}

fn row_for(record: &FileRecord) -> [String; 4] {
    [
        record.path.display().to_string(),
        record.size.to_string(),
        format_timestamp(record.created),
        format_timestamp(record.modified),
    ]
}

fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let [path, size, created, modified] = cells;
    format!(
        "{:<pw$}  {:>sw$}  {:<cw$}  {}",
        path,
        size,
        created,
        modified,
        pw = widths[0],
        sw = widths[1],
        cw = widths[2],
    )
    .trim_end()
    .to_string()
}
