use crate::annotate::label::extract_accession_version;
use crate::metadata::MetadataIndex;

/// Case-insensitive substring search over all metadata fields of the leaf's
/// matched record. Empty queries and unmatched leaves never match, so
/// highlighting stays opt-in.
pub fn matches(node_id: &str, index: &MetadataIndex, query: &str) -> bool {
    if query.is_empty() {
        return false;
    }

    let accession = extract_accession_version(node_id);
    let record = match index.lookup(accession) {
        Some(record) => record,
        None => return false,
    };

    let needle = query.to_lowercase();
    record
        .values()
        .any(|value| value.to_lowercase().contains(&needle))
}
