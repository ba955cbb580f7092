use crate::{
    schedule::{entry, EntryDefaults, ScheduleEntry},
    Error,
};

const HEADER: &str = "day, start, hours, cpus, mem_gb";

/// An ordered collection of schedule entries.
///
/// Entries keep the order they appeared in the parsed file; duplicate slots
/// are legal and independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleTable {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleTable {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        ScheduleTable { entries }
    }

    /// Parse the persisted schedule format.
    ///
    /// Lines starting with `#` are comments. The first remaining non-blank
    /// line is a header and is skipped unconditionally; columns are matched
    /// by position, not by header name, so a file without a header loses its
    /// first data row. Parsing is fail-fast: the first bad row aborts with
    /// its field error and no table is produced.
    pub fn parse(text: &str, defaults: &EntryDefaults) -> Result<Self, Error> {
        let mut rows = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .filter(|line| !line.trim().is_empty());

        let _header = rows.next();

        let mut entries = vec![];

        for row in rows {
            let fields = row.split(',').collect::<Vec<_>>();
            entries.push(entry::parse_row(&fields, defaults)?);
        }

        Ok(ScheduleTable { entries })
    }

    /// Render the table in the persisted format, header line included.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');

        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }

        out
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
