//! List reconciliation: identifier dedup plus search/sort re-application.
//!
//! # Invariants
//! - Output never holds two records with the same resolved `RecordId`.
//! - On duplicates the first record in input order wins.
//! - Records without a resolvable id are dropped.
//! - Reconciling an already reconciled list returns it unchanged.

use crate::model::record::{AdminRecord, Identified, RecordId};
use log::warn;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Counters describing what reconciliation discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub kept: usize,
    pub duplicates: usize,
    pub missing_id: usize,
    /// Payload elements the decoder could not read at all.
    pub malformed: usize,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.missing_id == 0 && self.malformed == 0
    }

    /// Rows the backend sent that are not displayed.
    pub fn dropped(&self) -> usize {
        self.duplicates + self.missing_id + self.malformed
    }
}

/// Deduplicates by resolved id, first occurrence wins.
pub fn reconcile<R, I>(records: I) -> Vec<R>
where
    R: Identified,
    I: IntoIterator<Item = R>,
{
    reconcile_with_report(records).0
}

pub fn reconcile_with_report<R, I>(records: I) -> (Vec<R>, ReconcileReport)
where
    R: Identified,
    I: IntoIterator<Item = R>,
{
    let mut seen: HashSet<RecordId> = HashSet::new();
    let mut kept = Vec::new();
    let mut report = ReconcileReport::default();

    for record in records {
        let Some(id) = record.record_id() else {
            report.missing_id += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            report.duplicates += 1;
            continue;
        }
        kept.push(record);
    }

    report.kept = kept.len();
    if !report.is_clean() {
        warn!(
            "event=reconcile module=reconcile status=dirty kept={} duplicates={} missing_id={}",
            report.kept, report.duplicates, report.missing_id
        );
    }
    (kept, report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Search box and column sort of a list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub sort: Option<(SortField, SortDirection)>,
}

impl ListFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            sort: None,
        }
    }

    pub fn sorted_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = Some((field, direction));
        self
    }

    pub fn is_active(&self) -> bool {
        self.needle().is_some() || self.sort.is_some()
    }

    /// Filters and sorts, then re-runs the id dedup on the result.
    pub fn apply<R: AdminRecord>(&self, records: &[R]) -> Vec<R> {
        if !self.is_active() {
            return reconcile(records.iter().cloned());
        }

        let needle = self.needle();
        let mut matched: Vec<R> = records
            .iter()
            .filter(|record| needle.as_deref().map_or(true, |needle| matches(*record, needle)))
            .cloned()
            .collect();

        if let Some((field, direction)) = self.sort {
            matched.sort_by(|left, right| {
                let ordering = compare(left, right, field);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        reconcile(matched)
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches<R: AdminRecord>(record: &R, needle: &str) -> bool {
    record
        .search_text()
        .iter()
        .any(|text| text.to_lowercase().contains(needle))
}

fn compare<R: AdminRecord>(left: &R, right: &R, field: SortField) -> Ordering {
    match field {
        SortField::Name => left
            .display_name()
            .to_lowercase()
            .cmp(&right.display_name().to_lowercase()),
        SortField::Id => compare_ids(left.record_id(), right.record_id()),
    }
}

/// Canonical numeric ids first in numeric order, then textual ids in text
/// order, then records without an id.
fn compare_ids(left: Option<&RecordId>, right: Option<&RecordId>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => left.cmp(right),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile, reconcile_with_report, ListFilter, SortDirection, SortField};
    use crate::model::customer::Customer;
    use crate::model::record::RecordId;

    fn customer(id: Option<&str>, name: &str) -> Customer {
        let mut customer = Customer::draft(name);
        customer.id = id.and_then(RecordId::parse);
        customer
    }

    fn names(records: &[Customer]) -> Vec<&str> {
        records.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn first_occurrence_wins() {
        let output = reconcile(vec![
            customer(Some("7"), "Ana"),
            customer(Some("8"), "Beto"),
            customer(Some("7"), "Ana (stale)"),
        ]);
        assert_eq!(names(&output), ["Ana", "Beto"]);
    }

    #[test]
    fn legacy_and_primary_ids_collide() {
        let mut legacy = Customer::draft("Legacy");
        legacy.legacy_id = RecordId::parse("7");
        let (output, report) = reconcile_with_report(vec![legacy, customer(Some("7"), "New")]);
        assert_eq!(names(&output), ["Legacy"]);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn missing_ids_are_dropped_and_counted() {
        let (output, report) =
            reconcile_with_report(vec![customer(None, "Ghost"), customer(Some("1"), "Ana")]);
        assert_eq!(names(&output), ["Ana"]);
        assert_eq!(report.missing_id, 1);
        assert_eq!(report.kept, 1);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(reconcile(Vec::<Customer>::new()).is_empty());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let once = reconcile(vec![
            customer(Some("2"), "Beto"),
            customer(Some("1"), "Ana"),
            customer(Some("2"), "Beto again"),
        ]);
        let twice = reconcile(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn search_is_case_insensitive_over_search_text() {
        let mut with_email = customer(Some("3"), "Carla");
        with_email.email = Some("carla@CAFE.example".to_string());
        let records = vec![customer(Some("1"), "Ana"), with_email];
        let output = ListFilter::search("cafe.EXAMPLE").apply(&records);
        assert_eq!(names(&output), ["Carla"]);
    }

    #[test]
    fn sort_by_id_is_numeric() {
        let records = vec![
            customer(Some("10"), "Diez"),
            customer(Some("9"), "Nueve"),
            customer(Some("100"), "Cien"),
        ];
        let filter = ListFilter::default().sorted_by(SortField::Id, SortDirection::Ascending);
        assert_eq!(names(&filter.apply(&records)), ["Nueve", "Diez", "Cien"]);
    }

    #[test]
    fn padded_ids_sort_after_numeric_ids() {
        let records = vec![
            customer(Some("1x"), "Texto"),
            customer(Some("007"), "Bond"),
            customer(Some("10"), "Diez"),
            customer(Some("7"), "Siete"),
            customer(Some("2"), "Dos"),
        ];
        let filter = ListFilter::default().sorted_by(SortField::Id, SortDirection::Ascending);
        assert_eq!(
            names(&filter.apply(&records)),
            ["Dos", "Siete", "Diez", "Bond", "Texto"]
        );
    }

    #[test]
    fn malformed_rows_make_the_report_dirty() {
        let (_, mut report) = reconcile_with_report(vec![customer(Some("1"), "Ana")]);
        assert!(report.is_clean());
        report.malformed = 2;
        assert!(!report.is_clean());
        assert_eq!(report.dropped(), 2);
    }

    #[test]
    fn filter_output_is_deduplicated() {
        let records = vec![
            customer(Some("5"), "ana"),
            customer(Some("5"), "Ana"),
            customer(Some("6"), "Zoe"),
        ];
        let filter = ListFilter::search("a").sorted_by(SortField::Name, SortDirection::Descending);
        let output = filter.apply(&records);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].id, RecordId::parse("5"));
    }
}
