//! Merging a folder of release listings into one CSV.

use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, ReleaseResult};
use crate::row::{RawRow, read_rows, write_rows};

const CSV_EXTENSION: &str = "csv";

/// Find every `.csv` file under `folder`, recursively.
///
/// Entries are visited in file-name order; a directory's own files come
/// before its subdirectories. Fails if nothing is found.
pub fn discover_csv_files(folder: &Path) -> ReleaseResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_csv_files(folder, &mut found)?;

    if found.is_empty() {
        return Err(ReleaseError::NoCsvFiles(folder.to_path_buf()));
    }

    Ok(found)
}

fn collect_csv_files(dir: &Path, found: &mut Vec<PathBuf>) -> ReleaseResult<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    entries.sort();

    let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|path| path.is_dir());

    found.extend(
        files
            .into_iter()
            .filter(|path| path.extension().is_some_and(|e| e == CSV_EXTENSION)),
    );

    for subdir in dirs {
        collect_csv_files(&subdir, found)?;
    }

    Ok(())
}

/// Concatenate listings that share a header.
///
/// Returns the header and all data rows in file order. The first file sets
/// the header; any file whose header differs stops the merge.
pub fn merge_listings(paths: &[PathBuf]) -> ReleaseResult<(RawRow, Vec<RawRow>)> {
    let mut header: Option<RawRow> = None;
    let mut merged = Vec::new();

    for path in paths {
        let mut rows = read_rows(path)?.into_iter();
        let Some(file_header) = rows.next() else {
            return Err(ReleaseError::MissingHeader(path.clone()));
        };

        match &header {
            None => header = Some(file_header),
            Some(expected) if expected.fields() != file_header.fields() => {
                return Err(ReleaseError::HeaderMismatch {
                    path: path.clone(),
                    expected: expected.fields().to_vec(),
                    found: file_header.fields().to_vec(),
                });
            }
            Some(_) => {}
        }

        let before = merged.len();
        merged.extend(rows);
        tracing::debug!(path = %path.display(), rows = merged.len() - before, "Merged listing");
    }

    let header = header.ok_or_else(|| ReleaseError::NoCsvFiles(PathBuf::new()))?;
    Ok((header, merged))
}

/// Merge every listing under `folder` into a single CSV at `merged_path`.
///
/// Nothing is written unless every header matches. Returns the number of
/// data rows written.
pub fn merge_folder(folder: &Path, merged_path: &Path) -> ReleaseResult<usize> {
    let files = discover_csv_files(folder)?;
    tracing::info!(files = files.len(), folder = %folder.display(), "Merging release listings");

    let (header, rows) = merge_listings(&files)?;
    write_rows(merged_path, &header, &rows)?;

    tracing::info!(rows = rows.len(), path = %merged_path.display(), "Wrote merged listing");

    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Column, read_release_rows};
    use tempfile::TempDir;

    const HEADER: &str = "name,date,description,agency_name,url,contact_name,contact_email";

    fn listing(rows: &[String]) -> String {
        let mut content = format!("{HEADER}\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        content
    }

    fn release(name: &str) -> String {
        format!("{name},2016-01-01,desc,Agency,http://example.gov/{name}.csv,Jane Doe,jane@example.gov")
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn titles(rows: &[RawRow]) -> Vec<String> {
        rows.iter().map(|r| r.title().to_string()).collect()
    }

    #[test]
    fn test_discover_csv_files_recursive_and_ordered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.csv", "");
        write(dir.path(), "a.csv", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), "upper.CSV", "");
        write(dir.path(), "a_sub/c.csv", "");
        write(dir.path(), "a_sub/deeper/d.csv", "");

        let found = discover_csv_files(dir.path()).unwrap();

        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            [
                PathBuf::from("a.csv"),
                PathBuf::from("b.csv"),
                PathBuf::from("a_sub/c.csv"),
                PathBuf::from("a_sub/deeper/d.csv"),
            ]
        );
    }

    #[test]
    fn test_discover_csv_files_empty_folder_is_no_input() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "readme.md", "");

        let err = discover_csv_files(dir.path()).unwrap_err();

        assert!(matches!(err, ReleaseError::NoCsvFiles(_)), "got {err:?}");
    }

    #[test]
    fn test_discover_csv_files_missing_folder_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_csv_files(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, ReleaseError::Io(_)), "got {err:?}");
    }

    #[test]
    fn test_merge_folder_three_listings() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        write(&input, "1.csv", &listing(&[release("a1"), release("a2")]));
        write(&input, "2.csv", &listing(&[release("b1"), release("b2"), release("b3")]));
        write(&input, "3.csv", &listing(&[release("c1")]));
        let merged = dir.path().join("merged.csv");

        let count = merge_folder(&input, &merged).unwrap();

        assert_eq!(count, 6);
        let all = read_rows(&merged).unwrap();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].fields().join(","), HEADER);
        assert_eq!(
            titles(&all[1..]),
            ["a1", "a2", "b1", "b2", "b3", "c1"]
        );
    }

    #[test]
    fn test_merge_folder_matches_single_listing_byte_for_byte() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        write(&input, "1.csv", &listing(&[release("a1"), "\"Quoted, title\",2016-01-01,\"say \"\"hi\"\"\",A,http://x.gov/q,B,c@x.gov".to_string()]));
        write(&input, "2.csv", &listing(&[release("b1")]));
        let merged = dir.path().join("merged.csv");

        merge_folder(&input, &merged).unwrap();

        let expected_path = dir.path().join("expected.csv");
        let mut rows = read_release_rows(&input.join("1.csv")).unwrap();
        rows.extend(read_release_rows(&input.join("2.csv")).unwrap());
        write_rows(&expected_path, &Column::header_row(), &rows).unwrap();

        assert_eq!(
            std::fs::read(&merged).unwrap(),
            std::fs::read(&expected_path).unwrap()
        );
        assert_eq!(
            titles(&read_release_rows(&merged).unwrap()),
            ["a1", "Quoted, title", "b1"]
        );
    }

    #[test]
    fn test_merge_folder_header_mismatch_names_file_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        write(&input, "1.csv", &listing(&[release("a1")]));
        let odd = write(&input, "2.csv", "name,date,desription\nx,2016-01-01,y\n");
        let merged = dir.path().join("merged.csv");

        let err = merge_folder(&input, &merged).unwrap_err();

        match &err {
            ReleaseError::HeaderMismatch { path, found, .. } => {
                assert_eq!(path, &odd);
                assert_eq!(found, &["name", "date", "desription"]);
            }
            other => panic!("expected HeaderMismatch, got {other:?}"),
        }
        assert!(err.to_string().contains("2.csv"), "{err}");
        assert!(!merged.exists());
    }

    #[test]
    fn test_merge_folder_reordered_header_is_mismatch() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        write(&input, "1.csv", &listing(&[]));
        write(
            &input,
            "2.csv",
            "date,name,description,agency_name,url,contact_name,contact_email\n",
        );

        let err = merge_folder(&input, &dir.path().join("merged.csv")).unwrap_err();

        assert!(matches!(err, ReleaseError::HeaderMismatch { .. }), "got {err:?}");
    }

    #[test]
    fn test_merge_folder_empty_file_has_no_header() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input");
        write(&input, "1.csv", &listing(&[release("a1")]));
        let empty = write(&input, "2.csv", "");

        let err = merge_folder(&input, &dir.path().join("merged.csv")).unwrap_err();

        match err {
            ReleaseError::MissingHeader(path) => assert_eq!(path, empty),
            other => panic!("expected MissingHeader, got {other:?}"),
        }
    }
}
