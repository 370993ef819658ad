use crate::metadata::MetadataIndex;

/// The accession key is everything before the first `|` in a node id, or
/// the whole id when no delimiter is present.
pub fn extract_accession_version(node_id: &str) -> &str {
    match node_id.find('|') {
        Some(pos) => &node_id[..pos],
        None => node_id,
    }
}

/// Compose a leaf's display label: the accession, followed by the values of
/// `label_fields` (caller order, empty and missing values skipped), joined
/// with `|`. Without a matching metadata record the accession stands alone.
pub fn build_label(node_id: &str, index: &MetadataIndex, label_fields: &[String]) -> String {
    let accession = extract_accession_version(node_id);
    let mut parts = vec![accession.to_string()];

    if let Some(record) = index.lookup(accession) {
        for field in label_fields {
            if let Some(value) = record.get(field) {
                if !value.is_empty() {
                    parts.push(value.clone());
                }
            }
        }
    }

    parts.join("|")
}
