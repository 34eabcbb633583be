use librarian_core::{CatalogStore, NewBook, RepoError};
use rusqlite::Connection;

#[test]
fn unknown_ids_yield_none() {
    let store = CatalogStore::open_in_memory().unwrap();

    assert!(store.get_book_by_id(1).unwrap().is_none());
    assert!(store.get_author_by_id(1).unwrap().is_none());
    assert!(store.get_sequence_by_id(1).unwrap().is_none());
    assert!(store.get_books_by_author(1).unwrap().is_empty());
    assert!(store.get_sequence_books(1).unwrap().is_empty());
}

#[test]
fn fellowship_scenario_links_sequence_and_author() {
    let store = CatalogStore::open_in_memory().unwrap();
    let stored = store
        .add_book(
            &NewBook::new(1, "The Fellowship of the Ring")
                .with_sequence("The Lord of the Rings", Some(1))
                .with_author("J.R.R.", "Tolkien")
                .with_genre("fantasy"),
        )
        .unwrap();

    let sequence = store
        .find_sequence("The Lord of the Rings")
        .unwrap()
        .unwrap();
    let author = store.find_author("J.R.R.", "Tolkien").unwrap().unwrap();
    assert_eq!(stored.sequence.as_ref(), Some(&sequence));
    assert_eq!(store.get_sequence_by_id(sequence.id).unwrap(), Some(sequence.clone()));

    let in_sequence = store.get_sequence_books(sequence.id).unwrap();
    assert_eq!(in_sequence, vec![stored.clone()]);

    let by_author = store.get_books_by_author(author.id).unwrap();
    assert_eq!(by_author, vec![stored.clone()]);
    assert_eq!(by_author[0].genres, vec!["fantasy"]);
}

#[test]
fn sequence_books_are_ordered_by_book_id() {
    let store = CatalogStore::open_in_memory().unwrap();
    for (id, title, number) in [(30, "Third", 3), (10, "First", 1), (20, "Second", 2)] {
        store
            .add_book(&NewBook::new(id, title).with_sequence("Trilogy", Some(number)))
            .unwrap();
    }
    let sequence = store.find_sequence("Trilogy").unwrap().unwrap();

    let ids: Vec<_> = store
        .get_sequence_books(sequence.id)
        .unwrap()
        .into_iter()
        .map(|book| book.id)
        .collect();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[test]
fn dangling_sequence_reference_is_reported() {
    let store = CatalogStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO book (book_id, book_title, sequence_id, sequence_number)
             VALUES (7, 'Orphan', 99, 1);
             PRAGMA foreign_keys = ON;",
        )
        .unwrap();

    let err = store.get_book_by_id(7).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn dangling_author_link_is_reported() {
    let store = CatalogStore::open_in_memory().unwrap();
    store
        .connection()
        .execute_batch(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO book (book_id, book_title) VALUES (8, 'Ghostwritten');
             INSERT INTO author_book (author_id, book_id) VALUES (77, 8);
             PRAGMA foreign_keys = ON;",
        )
        .unwrap();

    let err = store.get_book_by_id(8).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("author 77")));
}

#[test]
fn legacy_zero_sequence_id_means_no_sequence() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE book (book_id INTEGER PRIMARY KEY, book_title TEXT, annotation TEXT,
                            sequence_id INTEGER, sequence_number INTEGER);
         CREATE TABLE author (author_id INTEGER PRIMARY KEY AUTOINCREMENT,
                              first_name TEXT, last_name TEXT);
         CREATE TABLE sequence (sequence_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT);
         CREATE TABLE author_book (author_id INTEGER, book_id INTEGER);
         CREATE TABLE book_genre (book_id INTEGER, genre TEXT);
         INSERT INTO book VALUES (1, 'Legacy', NULL, 0, 0);",
    )
    .unwrap();
    let store = CatalogStore::from_connection(conn).unwrap();

    let book = store.get_book_by_id(1).unwrap().unwrap();
    assert!(book.sequence.is_none());
    assert_eq!(book.sequence_number, None);

    let hits = store.search_by_title("legacy", None).unwrap();
    assert_eq!(hits, vec![book]);
}

#[test]
fn from_connection_requires_catalog_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let result = CatalogStore::from_connection(conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("book"))));

    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE book (book_id INTEGER PRIMARY KEY, book_title TEXT NOT NULL);",
    )
    .unwrap();
    let result = CatalogStore::from_connection(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "book",
            column: "annotation"
        })
    ));
}

#[test]
fn from_connection_accepts_externally_created_schema() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE book (book_id INTEGER PRIMARY KEY, book_title TEXT, annotation TEXT,
                            sequence_id INTEGER, sequence_number INTEGER);
         CREATE TABLE author (author_id INTEGER PRIMARY KEY AUTOINCREMENT,
                              first_name TEXT, last_name TEXT);
         CREATE TABLE sequence (sequence_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT);
         CREATE TABLE author_book (author_id INTEGER, book_id INTEGER);
         CREATE TABLE book_genre (book_id INTEGER, genre TEXT);",
    )
    .unwrap();

    let store = CatalogStore::from_connection(conn).unwrap();
    let stored = store
        .add_book(&NewBook::new(1, "Kindred").with_author("Octavia", "Butler"))
        .unwrap();
    assert_eq!(stored.authors[0].last_name, "Butler");
    assert_eq!(store.schema_version().unwrap(), 0);
}

#[test]
fn with_store_persists_across_units_of_work() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let added = CatalogStore::with_store(&path, |store| {
        store.add_book(&NewBook::new(1, "Piranesi").with_author("Susanna", "Clarke"))
    })
    .unwrap();

    let loaded = CatalogStore::with_store(&path, |store| store.get_book_by_id(1)).unwrap();
    assert_eq!(loaded, Some(added));
}

#[test]
fn with_store_returns_work_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let result: Result<(), RepoError> = CatalogStore::with_store(&path, |store| {
        store.add_book(&NewBook::new(1, "Once"))?;
        store.add_book(&NewBook::new(1, "Twice"))?;
        Ok(())
    });
    assert!(matches!(result, Err(RepoError::Conflict(1))));

    let titles = CatalogStore::with_store(&path, |store| store.search_by_title("", None)).unwrap();
    assert_eq!(titles.len(), 1);
}

#[test]
fn explicit_close_succeeds() {
    let store = CatalogStore::open_in_memory().unwrap();
    store.close().unwrap();
}

#[test]
fn books_serialize_to_json() {
    let store = CatalogStore::open_in_memory().unwrap();
    let stored = store
        .add_book(
            &NewBook::new(1, "Ubik")
                .with_author("Philip K.", "Dick")
                .with_genre("sf"),
        )
        .unwrap();

    let value = serde_json::to_value(&stored).unwrap();
    assert_eq!(value["title"], "Ubik");
    assert_eq!(value["authors"][0]["last_name"], "Dick");
    assert!(value["sequence"].is_null());
}
