use std::collections::HashMap;

/// One row of the metadata table: field name to field value.
pub type MetadataRecord = HashMap<String, String>;

/// Field that joins metadata rows to tree leaves.
pub const ACCESSION_FIELD: &str = "accessionVersion";

/// Lookup from accession key to its metadata record.
///
/// Rebuilt wholesale whenever the metadata set changes; records without an
/// `accessionVersion` are dropped, duplicate keys are last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    records: HashMap<String, MetadataRecord>,
}

impl MetadataIndex {
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MetadataRecord>,
    {
        let mut index = HashMap::new();
        for record in records {
            if let Some(key) = record.get(ACCESSION_FIELD) {
                index.insert(key.clone(), record);
            }
        }
        Self { records: index }
    }

    pub fn lookup(&self, accession: &str) -> Option<&MetadataRecord> {
        self.records.get(accession)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
