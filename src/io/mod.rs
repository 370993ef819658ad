use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use phylotree::tree::Tree as PhyloTree;

use crate::metadata::MetadataRecord;
use crate::tree::Tree;

/// Load the Newick text returned by the tree-builder service. Multiple
/// `;`-terminated trees in one file are all parsed.
pub fn load_trees(path: &Path) -> Result<Vec<Tree>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree file: {}", path.display()))?;

    let trees = parse_newick(&raw)?;
    if trees.is_empty() {
        bail!("tree file did not contain any trees");
    }
    Ok(trees)
}

fn parse_newick(raw: &str) -> Result<Vec<Tree>> {
    let mut trees = Vec::new();

    for chunk in raw.split_inclusive(';') {
        let candidate = chunk.trim();
        if candidate.is_empty() || !candidate.ends_with(';') {
            continue;
        }

        let phylo = PhyloTree::from_newick(candidate)
            .map_err(|err| anyhow!("failed to parse newick tree: {err}"))?;
        trees.push(Tree::new(candidate.to_string(), phylo));
    }

    Ok(trees)
}

/// Load the metadata table: tab-separated, header row giving field names,
/// one record per row. Presence of `accessionVersion` is not enforced here;
/// the index drops keyless records.
pub fn load_metadata(path: &Path) -> Result<Vec<MetadataRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("failed to read metadata file: {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize::<MetadataRecord>() {
        let record =
            row.with_context(|| format!("malformed metadata row in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

/// Prepare aligned sequences for tree-builder submission: strip any
/// `|`-suffixed extra fields from FASTA headers so the ids in the returned
/// tree are bare accessions. Sequence lines pass through untouched.
pub fn strip_header_fields(fasta: &str) -> String {
    let mut out = String::with_capacity(fasta.len());
    for line in fasta.lines() {
        if let Some(header) = line.strip_prefix('>') {
            out.push('>');
            match header.find('|') {
                Some(pos) => out.push_str(&header[..pos]),
                None => out.push_str(header),
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataIndex;
    use std::io::Write;

    #[test]
    fn parses_simple_newick() {
        let trees = parse_newick("(A1:0.1,A2:0.2);").unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaf_count(), 2);
        assert!(trees[0].root.is_some());
    }

    #[test]
    fn parses_multiple_newick() {
        let trees = parse_newick("(A1:0.1,A2:0.2);\n(A3:0.3,A4:0.4);\n").unwrap();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_newick("").unwrap().is_empty());
    }

    #[test]
    fn loads_tab_separated_metadata() {
        let file = tempfile_with(
            "accessionVersion\tCountry\tSampleID\nA1\tUSA\tS1\nA2\tCanada\t\n\tNowhere\tS3\n",
        );
        let records = load_metadata(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("Country"), Some(&"USA".to_string()));
        assert_eq!(records[1].get("SampleID"), Some(&"".to_string()));

        // The row with an empty accession indexes under "" and the index
        // keeps it; only rows missing the column entirely are dropped.
        let index = MetadataIndex::build(records);
        assert!(index.lookup("A1").is_some());
        assert!(index.lookup("A2").is_some());
    }

    #[test]
    fn strips_header_fields_for_submission() {
        let fasta = ">A1|sample one|2021\nACGT\n>A2\nTTGA\n";
        assert_eq!(strip_header_fields(fasta), ">A1\nACGT\n>A2\nTTGA\n");
    }

    #[test]
    fn strip_leaves_sequence_lines_with_pipes_alone() {
        // '|' in a sequence line is invalid FASTA but must not be treated
        // as a header delimiter.
        let fasta = ">A1|x\nAC|GT\n";
        assert_eq!(strip_header_fields(fasta), ">A1\nAC|GT\n");
    }

    fn tempfile_with(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }
}
