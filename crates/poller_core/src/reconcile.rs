use std::collections::HashMap;

use shared::{domain::Payload, error::PayloadError, protocol::parse_payload};
use tracing::debug;

use crate::table::TableView;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub first_render: bool,
    pub appended: usize,
    pub updated: usize,
    pub dropped: usize,
}

/// Mirrors payloads into a table view.
///
/// The first successful call appends one row per distinct title. Every later
/// call only overwrites rows whose title matches; unknown titles are dropped
/// and rows are never removed.
#[derive(Debug)]
pub struct Reconciler {
    first_render: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self { first_render: true }
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_first_render(&self) -> bool {
        self.first_render
    }

    /// Parses `payload_text` and applies it. A parse failure leaves both the
    /// view and the first-render flag untouched.
    pub fn reconcile<V>(
        &mut self,
        view: &mut V,
        payload_text: &str,
    ) -> Result<ReconcileReport, PayloadError>
    where
        V: TableView + ?Sized,
    {
        let payload = parse_payload(payload_text)?;
        Ok(self.apply(view, payload))
    }

    pub fn apply<V>(&mut self, view: &mut V, payload: Payload) -> ReconcileReport
    where
        V: TableView + ?Sized,
    {
        let report = if self.first_render {
            initial_render(view, payload)
        } else {
            update_rows(view, payload)
        };
        self.first_render = false;
        report
    }
}

fn initial_render<V>(view: &mut V, payload: Payload) -> ReconcileReport
where
    V: TableView + ?Sized,
{
    let mut report = ReconcileReport {
        first_render: true,
        ..ReconcileReport::default()
    };
    let mut appended_at: HashMap<String, usize> = HashMap::new();

    for record in payload {
        if let Some(&index) = appended_at.get(&record.title) {
            view.set_value(index, &record.value);
            report.updated += 1;
            continue;
        }
        let index = view.row_count();
        view.append_row(&record.title, &record.value);
        appended_at.insert(record.title, index);
        report.appended += 1;
    }

    report
}

fn update_rows<V>(view: &mut V, payload: Payload) -> ReconcileReport
where
    V: TableView + ?Sized,
{
    let mut report = ReconcileReport::default();

    for record in payload {
        let matching: Vec<usize> = (0..view.row_count())
            .filter(|&index| view.title_at(index) == Some(record.title.as_str()))
            .collect();

        if matching.is_empty() {
            debug!(title = %record.title, "dropping record with no matching row");
            report.dropped += 1;
            continue;
        }
        for index in matching {
            view.set_value(index, &record.value);
            report.updated += 1;
        }
    }

    report
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
