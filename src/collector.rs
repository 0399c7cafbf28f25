use crate::models::ListingRecord;

/// Append-only sink of records in encounter order.
#[derive(Debug, Default, Clone)]
pub struct RecordCollector {
    records: Vec<ListingRecord>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ListingRecord> {
        self.records
    }
}

impl Extend<ListingRecord> for RecordCollector {
    fn extend<I: IntoIterator<Item = ListingRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<ListingRecord> for RecordCollector {
    fn from_iter<I: IntoIterator<Item = ListingRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn titled(title: &str) -> ListingRecord {
        ListingRecord {
            title: Some(title.to_string()),
            ..ListingRecord::empty(Local::now().naive_local())
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let mut collector = RecordCollector::new();
        collector.push(titled("f1"));
        collector.push(titled("f2"));
        collector.extend([titled("f3")]);

        let titles: Vec<_> = collector
            .records()
            .iter()
            .map(|r| r.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["f1", "f2", "f3"]);
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn keeps_duplicates() {
        let collector: RecordCollector = [titled("same"), titled("same")].into_iter().collect();
        assert_eq!(collector.into_records().len(), 2);
    }
}
