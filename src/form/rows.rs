use indexmap::IndexMap;

use crate::domain::{CellValue, RowValues};

/// Synthetic identity of one row. Assigned once at append time and never
/// reused or reassigned, so removals shift indices but never ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// One editable row: its id plus the field-to-value mapping in column order.
#[derive(Debug, Clone)]
pub struct RowRecord {
    pub id: RowId,
    pub values: IndexMap<String, CellValue>,
}

impl RowRecord {
    pub fn value(&self, field: &str) -> &CellValue {
        self.values.get(field).unwrap_or(&CellValue::Null)
    }

    pub fn view(&self) -> RowValues<'_> {
        RowValues::new(&self.values)
    }
}

/// Ordered collection of row records, the single source of truth every
/// derived projection is recomputed from.
///
/// Observers follow a pull-on-notify contract: each mutation bumps
/// [`revision`](Self::revision), and a consumer holding a stale revision
/// re-reads the records instead of receiving a diff. Committed values are
/// always current at read time.
#[derive(Debug, Clone, Default)]
pub struct RowArray {
    records: Vec<RowRecord>,
    next_id: u64,
    revision: u64,
}

impl RowArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RowRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&RowRecord> {
        self.records.get(index)
    }

    /// Current revision; bumped by every mutating call that changed data.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// View of one row's values for predicate evaluation. Out-of-range
    /// indices read as a row with no values.
    pub fn row_values(&self, index: usize) -> RowValues<'_> {
        match self.records.get(index) {
            Some(record) => RowValues::new(&record.values),
            None => RowValues::empty(),
        }
    }

    /// Append a row with the given initial values and a fresh id.
    pub fn append(&mut self, values: IndexMap<String, CellValue>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.records.push(RowRecord { id, values });
        self.revision += 1;
        id
    }

    /// Remove the row at `index`, keeping the order and ids of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<RowRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        self.revision += 1;
        Some(record)
    }

    /// Swap out the whole value mapping of the row at `index`. The row
    /// keeps its id.
    pub fn replace_at(&mut self, index: usize, values: IndexMap<String, CellValue>) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                if record.values != values {
                    record.values = values;
                    self.revision += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Write one cell. Returns whether anything actually changed; no-op
    /// writes leave the revision alone.
    pub fn set_value(&mut self, index: usize, field: &str, value: CellValue) -> bool {
        let Some(record) = self.records.get_mut(index) else {
            return false;
        };
        if record.values.get(field) == Some(&value) {
            return false;
        }
        record.values.insert(field.to_string(), value);
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> IndexMap<String, CellValue> {
        let mut values = IndexMap::new();
        values.insert("name".to_string(), CellValue::text(name));
        values
    }

    #[test]
    fn append_assigns_fresh_ids() {
        let mut rows = RowArray::new();
        let first = rows.append(row("a"));
        let second = rows.append(row("b"));
        assert_eq!(rows.len(), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn removal_keeps_surviving_ids_and_order() {
        let mut rows = RowArray::new();
        let a = rows.append(row("a"));
        let b = rows.append(row("b"));
        let c = rows.append(row("c"));

        let removed = rows.remove_at(1).unwrap();
        assert_eq!(removed.id, b);
        let ids: Vec<RowId> = rows.records().iter().map(|record| record.id).collect();
        assert_eq!(ids, [a, c]);

        // Ids are never recycled, not even after a removal.
        let d = rows.append(row("d"));
        assert!(d > c);
    }

    #[test]
    fn out_of_range_removal_is_refused() {
        let mut rows = RowArray::new();
        rows.append(row("a"));
        assert!(rows.remove_at(5).is_none());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn set_value_bumps_revision_only_on_change() {
        let mut rows = RowArray::new();
        rows.append(row("a"));
        let before = rows.revision();

        assert!(rows.set_value(0, "name", CellValue::text("b")));
        assert_eq!(rows.revision(), before + 1);

        assert!(!rows.set_value(0, "name", CellValue::text("b")));
        assert_eq!(rows.revision(), before + 1);
    }

    #[test]
    fn replace_at_keeps_the_row_id() {
        let mut rows = RowArray::new();
        let id = rows.append(row("a"));
        assert!(rows.replace_at(0, row("z")));
        assert_eq!(rows.record(0).unwrap().id, id);
        assert_eq!(rows.record(0).unwrap().value("name"), &CellValue::text("z"));
        assert!(!rows.replace_at(9, row("x")));
    }

    #[test]
    fn missing_rows_read_as_empty_views() {
        let rows = RowArray::new();
        assert!(rows.row_values(0).is_blank("name"));
    }
}
