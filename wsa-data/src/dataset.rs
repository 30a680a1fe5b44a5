use crate::record::{distinct_numeric_metrics, Record};
use crate::series::SeriesTable;
use crate::temporal::{parse_date, DatePolicy, TemporalIndex};
use crate::DataError;

/// A loaded record collection together with its date axis.
///
/// The two are always rebuilt together; a dataset is never mutated after
/// assembly, a reload replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    temporal: TemporalIndex,
    dropped: usize,
}

impl Dataset {
    /// Assemble a dataset, applying `policy` to unparseable dates.
    ///
    /// Records with no date at all are dropped under either policy.
    pub fn assemble(records: Vec<Record>, policy: DatePolicy) -> Result<Self, DataError> {
        let total = records.len();
        let mut kept = Vec::with_capacity(total);

        for record in records {
            let Some(raw) = record.date.as_deref() else {
                continue;
            };
            match parse_date(raw) {
                Ok(_) => kept.push(record),
                Err(err) => match policy {
                    DatePolicy::RejectLoad => return Err(err),
                    DatePolicy::DropRecord => log::warn!("dataset: dropping record: {}", err),
                },
            }
        }

        let temporal =
            TemporalIndex::build_sorted_unique(kept.iter().filter_map(|r| r.date.as_deref()))?;
        let dropped = total - kept.len();
        log::info!(
            "dataset: Assembled {} records over {} dates, dropped {}",
            kept.len(),
            temporal.len(),
            dropped
        );
        Ok(Self {
            records: kept,
            temporal,
            dropped,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn temporal(&self) -> &TemporalIndex {
        &self.temporal
    }

    /// Number of input records discarded during assembly.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Numeric metrics discovered from the first record.
    pub fn metrics(&self) -> Vec<String> {
        self.records
            .first()
            .map(distinct_numeric_metrics)
            .unwrap_or_default()
    }

    pub fn series(&self, metric: &str) -> SeriesTable {
        SeriesTable::build_index(&self.records, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::records_from_csv;
    use crate::record::RecordSchema;

    const CSV_DATA: &str = "\
WATERSHED_ID,date,Precipitation,Runoff
W1,01.02.2020,1,2
W1,01.01.2020,3,4
W2,sometime,5,6
W3,,7,8
";

    #[test]
    fn test_drop_record_policy() {
        let records = records_from_csv(CSV_DATA, &RecordSchema::default()).unwrap();
        let dataset = Dataset::assemble(records, DatePolicy::DropRecord).unwrap();
        assert_eq!(dataset.records().len(), 2);
        assert_eq!(dataset.dropped(), 2);
        assert_eq!(dataset.temporal().len(), 2);
        assert_eq!(dataset.temporal().label(0), Some("01.01.2020"));
        assert_eq!(dataset.metrics(), vec!["Precipitation", "Runoff"]);
    }

    #[test]
    fn test_reject_load_policy() {
        let records = records_from_csv(CSV_DATA, &RecordSchema::default()).unwrap();
        let result = Dataset::assemble(records, DatePolicy::RejectLoad);
        assert!(matches!(result, Err(DataError::DateFormat { raw }) if raw == "sometime"));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::assemble(Vec::new(), DatePolicy::DropRecord).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.metrics().is_empty());
        assert!(dataset.temporal().is_empty());
    }
}
