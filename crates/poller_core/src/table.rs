//! Rendering surface the reconciler writes into.

use shared::domain::RecordValue;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub title: String,
    pub value: RecordValue,
}

/// Two-column table addressed by row index.
///
/// Rows are only ever appended or have their value cell overwritten.
pub trait TableView: Send {
    fn row_count(&self) -> usize;
    fn title_at(&self, index: usize) -> Option<&str>;
    fn append_row(&mut self, title: &str, value: &RecordValue);
    fn set_value(&mut self, index: usize, value: &RecordValue);
    fn rows(&self) -> Vec<TableRow>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    rows: Vec<TableRow>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with rows, as if a page shipped them in its markup.
    pub fn with_rows(rows: impl IntoIterator<Item = TableRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn value_of(&self, title: &str) -> Option<&RecordValue> {
        self.rows
            .iter()
            .find(|row| row.title == title)
            .map(|row| &row.value)
    }
}

impl TableView for MemoryTable {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn title_at(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(|row| row.title.as_str())
    }

    fn append_row(&mut self, title: &str, value: &RecordValue) {
        self.rows.push(TableRow {
            title: title.to_string(),
            value: value.clone(),
        });
    }

    fn set_value(&mut self, index: usize, value: &RecordValue) {
        if let Some(row) = self.rows.get_mut(index) {
            row.value = value.clone();
        }
    }

    fn rows(&self) -> Vec<TableRow> {
        self.rows.clone()
    }
}
