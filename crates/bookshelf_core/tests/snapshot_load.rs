use bookshelf_core::snapshot::{parse_notifications, read_notifications};
use bookshelf_core::{BookId, CatalogSnapshot, SnapshotError};
use std::fs;

const BOOKS: &str = r#"[
  {"bookId": "b1", "title": "Số đỏ", "author": "Vũ Trọng Phụng", "translator": "",
   "series": "", "type": "novel", "genreList": ["Trào phúng"], "cover": "so-do.png"},
  {"bookId": 7, "title": "Chí Phèo", "author": "Nam Cao", "translator": "",
   "series": "", "type": "short story", "genreList": []}
]"#;

const CHAPTERS: &str = r#"[
  {"chapterId": "c1", "bookId": "b1", "title": "Chương 1"},
  {"chapterId": 2, "bookId": "7", "title": "Chương 1"},
  {"chapterId": "c3", "bookId": "missing", "title": "Lạc"}
]"#;

#[test]
fn from_json_decodes_books_and_chapters() {
    let snapshot = CatalogSnapshot::from_json(BOOKS, CHAPTERS).unwrap();

    assert_eq!(snapshot.books.len(), 2);
    assert_eq!(snapshot.chapters.len(), 3);
    assert_eq!(snapshot.books[1].book_id, BookId::new("7"));
    assert_eq!(
        snapshot.books[0].extra.get("cover"),
        Some(&serde_json::json!("so-do.png"))
    );
    assert!(snapshot.validate().is_ok());
}

#[test]
fn orphan_chapters_are_reported_not_rejected() {
    let snapshot = CatalogSnapshot::from_json(BOOKS, CHAPTERS).unwrap();

    let orphans = snapshot.orphan_chapters();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].book_id, BookId::new("missing"));
}

#[test]
fn duplicate_book_ids_are_a_contract_violation() {
    let books = r#"[
      {"bookId": "b1", "title": "A", "author": "", "translator": "", "series": "",
       "type": "novel", "genreList": []},
      {"bookId": "b1", "title": "B", "author": "", "translator": "", "series": "",
       "type": "novel", "genreList": []}
    ]"#;

    let err = CatalogSnapshot::from_json(books, "[]").unwrap_err();
    assert!(matches!(err, SnapshotError::DuplicateBookId(ref id) if id.as_str() == "b1"));
}

#[test]
fn missing_required_book_field_is_rejected() {
    let books = r#"[{"bookId": "b1", "title": "A", "author": "", "series": "",
                     "type": "novel", "genreList": []}]"#;

    let err = CatalogSnapshot::from_json(books, "[]").unwrap_err();
    assert!(matches!(err, SnapshotError::Json { what: "book", .. }));
}

#[test]
fn notification_payload_must_be_an_array_of_events() {
    let events =
        parse_notifications(r#"[{"text": "Chương mới", "time": "2024-10-22T01:30:00Z"}]"#)
            .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].text, "Chương mới");

    let err = parse_notifications(r#"{"text": "x", "time": "y"}"#).unwrap_err();
    assert!(matches!(err, SnapshotError::Json { what: "notification", .. }));
}

#[test]
fn from_files_reads_assets_and_reports_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    let books_path = dir.path().join("books.json");
    let chapters_path = dir.path().join("chapters.json");
    fs::write(&books_path, BOOKS).unwrap();
    fs::write(&chapters_path, CHAPTERS).unwrap();

    let snapshot = CatalogSnapshot::from_files(&books_path, &chapters_path).unwrap();
    assert_eq!(snapshot.books.len(), 2);

    let missing = dir.path().join("nope.json");
    let err = read_notifications(&missing).unwrap_err();
    match err {
        SnapshotError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}
