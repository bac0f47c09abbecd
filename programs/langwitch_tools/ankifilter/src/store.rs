use crate::error::FilterError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Anki joins the fields of a note with the unit separator.
pub const FIELD_SEPARATOR: char = '\x1f';

/// Longer fields are sentences or markup, not words.
pub const MAX_FIELD_CHARS: usize = 30;

/// Splits a note's `flds` value into the fields worth treating as known words.
pub fn split_fields(flds: &str) -> impl Iterator<Item = &str> {
    flds.split(FIELD_SEPARATOR)
        .filter(|field| !field.is_empty() && field.chars().count() <= MAX_FIELD_CHARS)
}

/// Reads every note in the collection at `path` and returns its short fields,
/// in row order. The collection is opened read-only and closed before returning.
pub fn known_fields<P: AsRef<Path>>(path: P) -> Result<Vec<String>, FilterError> {
    let path = path.as_ref();
    let store_error = |source: rusqlite::Error| FilterError::Store {
        path: path.to_path_buf(),
        source,
    };

    let connection = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(store_error)?;
    let mut statement = connection
        .prepare("SELECT flds FROM notes")
        .map_err(store_error)?;
    let rows = statement
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(store_error)?;

    let mut fields = Vec::new();
    for flds in rows {
        let flds = flds.map_err(store_error)?;
        fields.extend(split_fields(&flds).map(str::to_string));
    }
    Ok(fields)
}

#[cfg(test)]
fn collection(notes: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.anki2");
    let connection = Connection::open(&path).unwrap();
    connection
        .execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, sfld TEXT, flds TEXT NOT NULL);")
        .unwrap();
    for flds in notes {
        connection
            .execute("INSERT INTO notes (sfld, flds) VALUES ('', ?1)", [flds])
            .unwrap();
    }
    (dir, path)
}

#[test]
fn splits_on_unit_separator() {
    let fields: Vec<_> = split_fields("Glas\x1fglass\x1fdas Glas").collect();
    assert_eq!(fields, vec!["Glas", "glass", "das Glas"]);
}

#[test]
fn drops_empty_and_long_fields() {
    let long = "a".repeat(31);
    let exact = "b".repeat(30);
    let flds = format!("\x1f{}\x1fKatze\x1f\x1f{}", long, exact);
    let fields: Vec<_> = split_fields(&flds).collect();
    assert_eq!(fields, vec!["Katze", exact.as_str()]);
}

#[test]
fn length_counts_characters_not_bytes() {
    // 30 characters, 60 bytes
    let umlauts = "ü".repeat(30);
    assert_eq!(split_fields(&umlauts).count(), 1);
}

#[test]
fn reads_fields_in_row_order() {
    let long = "a".repeat(31);
    let (_dir, path) = collection(&["Mann\x1fman", format!("Frau\x1f{}", long).as_str(), "Mann"]);
    let fields = known_fields(&path).unwrap();
    assert_eq!(fields, vec!["Mann", "man", "Frau", "Mann"]);
    assert!(fields.iter().all(|f| (1..=MAX_FIELD_CHARS).contains(&f.chars().count())));
}

#[test]
fn empty_collection_has_no_fields() {
    let (_dir, path) = collection(&[]);
    assert!(known_fields(&path).unwrap().is_empty());
}

#[test]
fn missing_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.anki2");
    match known_fields(&path) {
        Err(FilterError::Store { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a store error, got {:?}", other),
    }
    // read-only opens never create the file
    assert!(!path.exists());
}

#[test]
fn missing_notes_table_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.anki2");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE cards (id INTEGER PRIMARY KEY);")
        .unwrap();
    assert!(matches!(known_fields(&path), Err(FilterError::Store { .. })));
}

#[test]
fn junk_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.anki2");
    std::fs::write(&path, b"this is a word list, not an sqlite database\n".repeat(64)).unwrap();
    assert!(matches!(known_fields(&path), Err(FilterError::Store { .. })));
}

#[test]
fn missing_flds_column_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.anki2");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, sfld TEXT); INSERT INTO notes (sfld) VALUES ('Glas');")
        .unwrap();
    assert!(matches!(known_fields(&path), Err(FilterError::Store { .. })));
}

#[test]
fn null_or_blob_flds_is_a_store_error() {
    for value in ["NULL", "x'476c6173'"] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collection.anki2");
        Connection::open(&path)
            .unwrap()
            .execute_batch(&format!(
                "CREATE TABLE notes (id INTEGER PRIMARY KEY, flds); \
                 INSERT INTO notes (flds) VALUES ('Glas'); \
                 INSERT INTO notes (flds) VALUES ({});",
                value
            ))
            .unwrap();
        assert!(
            matches!(known_fields(&path), Err(FilterError::Store { .. })),
            "flds = {}",
            value
        );
    }
}
