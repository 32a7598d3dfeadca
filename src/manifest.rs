//! Manifest parsing: the text files that name which corpus records belong to
//! each dataset split.
//!
//! A manifest holds one record per line. The first whitespace-delimited field
//! is the record ID; anything after it (conference names, durations, other
//! annotations) is ignored. Record IDs are relative paths without extension,
//! so `6300370419826092098/00001` is a valid ID.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Load the record IDs listed in one split manifest.
///
/// Order and duplicates are preserved as written; callers that need the
/// combined unique set go through [`dedup_records`]. Blank lines contribute
/// nothing. A missing or unreadable manifest is an error, not an empty split.
pub fn load_manifest(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open manifest '{}'", path.display()))?;

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line =
            line.with_context(|| format!("failed to read manifest '{}'", path.display()))?;
        if let Some(id) = line.split_whitespace().next() {
            records.push(id.to_owned());
        }
    }
    Ok(records)
}

/// Combine split record lists into one deduplicated set.
///
/// Records appearing in several splits are processed once. The set iterates in
/// lexicographic ID order, which keeps run output and on-disk artifacts stable
/// across runs.
pub fn dedup_records(splits: &[&[String]]) -> BTreeSet<String> {
    let mut records = BTreeSet::new();
    for split in splits {
        for id in *split {
            records.insert(id.clone());
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn takes_first_field_per_line() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("train.txt");
        fs::write(
            &path,
            "6300370419826092098/00001 conference_a\n6300370419826092098/00002\n",
        )?;

        let records = load_manifest(&path)?;
        assert_eq!(
            records,
            vec![
                "6300370419826092098/00001".to_owned(),
                "6300370419826092098/00002".to_owned(),
            ]
        );
        Ok(())
    }

    #[test]
    fn skips_blank_lines() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("val.txt");
        fs::write(&path, "a\n\n   \nb extra\n")?;

        let records = load_manifest(&path)?;
        assert_eq!(records, vec!["a".to_owned(), "b".to_owned()]);
        Ok(())
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let err = load_manifest(Path::new("does/not/exist.txt")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.txt"));
    }

    #[test]
    fn dedup_unions_overlapping_splits() {
        let train = vec!["a".to_owned(), "b".to_owned()];
        let val = vec!["a".to_owned()];

        let records = dedup_records(&[&train, &val]);
        assert_eq!(records.len(), 2);
        assert!(records.contains("a"));
        assert!(records.contains("b"));
    }

    #[test]
    fn dedup_iterates_in_sorted_order() {
        let train = vec!["b".to_owned(), "a".to_owned()];
        let test = vec!["c".to_owned()];

        let ordered: Vec<_> = dedup_records(&[&train, &test]).into_iter().collect();
        assert_eq!(ordered, vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);
    }
}
