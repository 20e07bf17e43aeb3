//! Link source: reads image links out of a CSV file.
//!
//! Every field of every row is a link, and rows are flattened in order, so
//! `a,b\nc,d` yields `[a, b, c, d]`. The file has no header row. As with
//! most CSV readers, every row must have the same number of fields as the
//! first one; a mismatch is treated as malformed input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::LinkSourceError;
use crate::types::Link;

/// Read all links from the CSV file at `path`.
pub fn read_links(path: &Path) -> Result<Vec<Link>, LinkSourceError> {
    let file = File::open(path).map_err(|source| LinkSourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let links = parse_links(file)?;
    tracing::debug!("Read {} link(s) from {:?}", links.len(), path);
    Ok(links)
}

/// Parse links from any CSV byte source.
///
/// Fields are trimmed; empty fields (e.g. from a trailing comma) are skipped.
pub fn parse_links<R: Read>(reader: R) -> Result<Vec<Link>, LinkSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Empty fields are dropped before ids are assigned, so a link's id is its
    // position among non-empty fields only.
    let mut links = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(malformed)?;
        links.extend(
            record
                .iter()
                .filter(|field| !field.is_empty())
                .map(Link::from),
        );
    }
    Ok(links)
}

fn malformed(err: csv::Error) -> LinkSourceError {
    let line = err.position().map(|pos| pos.line()).unwrap_or(0);
    LinkSourceError::Malformed {
        line,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Vec<Link>, LinkSourceError> {
        parse_links(input.as_bytes())
    }

    #[test]
    fn test_single_column() {
        let links = parse("http://a/1.jpg\nhttp://a/2.jpg\n").unwrap();
        assert_eq!(links, vec![Link::from("http://a/1.jpg"), Link::from("http://a/2.jpg")]);
    }

    #[test]
    fn test_rows_are_flattened_in_order() {
        let links = parse("a,b\nc,d\n").unwrap();
        let links: Vec<&str> = links.iter().map(Link::as_str).collect();
        assert_eq!(links, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let links = parse("x\nx\n").unwrap();
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_and_empty_fields() {
        let links = parse("  http://a/1.jpg ,\n http://a/2.jpg,\n").unwrap();
        let links: Vec<&str> = links.iter().map(Link::as_str).collect();
        assert_eq!(links, vec!["http://a/1.jpg", "http://a/2.jpg"]);
    }

    #[test]
    fn test_quoted_field_with_comma() {
        let links = parse("\"http://a/x.jpg?q=1,2\"\n").unwrap();
        assert_eq!(links[0].as_str(), "http://a/x.jpg?q=1,2");
    }

    #[test]
    fn test_inconsistent_row_length_is_malformed() {
        let err = parse("a,b\nc\n").unwrap_err();
        match err {
            LinkSourceError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_links(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LinkSourceError::Open { .. }));
    }

    #[test]
    fn test_read_links_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        std::fs::write(&path, "http://a/1.jpg\n").unwrap();
        assert_eq!(read_links(&path).unwrap().len(), 1);
    }
}
