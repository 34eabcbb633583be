use librarian_core::{Book, CatalogStore, NewBook};

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|book| book.title.as_str()).collect()
}

fn seeded_store() -> CatalogStore {
    let store = CatalogStore::open_in_memory().unwrap();
    for book in [
        NewBook::new(1, "The Hobbit").with_author("J.R.R.", "Tolkien"),
        NewBook::new(2, "Rabbit Run").with_author("John", "Updike"),
        NewBook::new(3, "The Lord of the Rings").with_author("J.R.R.", "Tolkien"),
        NewBook::new(4, "The Lord of Chaos").with_author("Robert", "Jordan"),
        NewBook::new(5, "Magician").with_author("Tolkien", "Smith"),
    ] {
        store.add_book(&book).unwrap();
    }
    store
}

#[test]
fn title_search_is_case_insensitive_substring() {
    let store = seeded_store();

    let hits = store.search_by_title("hobbit", None).unwrap();
    assert_eq!(titles(&hits), vec!["The Hobbit"]);

    let hits = store.search_by_title("HOBBIT", None).unwrap();
    assert_eq!(titles(&hits), vec!["The Hobbit"]);

    let hits = store.search_by_title("abbit", None).unwrap();
    assert_eq!(titles(&hits), vec!["Rabbit Run"]);
}

#[test]
fn title_search_treats_spaces_as_wildcards() {
    let store = seeded_store();

    let hits = store.search_by_title("lord rings", None).unwrap();
    assert_eq!(titles(&hits), vec!["The Lord of the Rings"]);

    let hits = store.search_by_title("the lord", None).unwrap();
    assert_eq!(
        titles(&hits),
        vec!["The Lord of the Rings", "The Lord of Chaos"]
    );
}

#[test]
fn title_search_returns_hydrated_books() {
    let store = seeded_store();

    let hits = store.search_by_title("hobbit", None).unwrap();
    assert_eq!(hits[0].authors.len(), 1);
    assert_eq!(hits[0].authors[0].last_name, "Tolkien");
}

#[test]
fn title_search_can_be_restricted_to_author() {
    let store = seeded_store();
    let tolkien = store.find_author("J.R.R.", "Tolkien").unwrap().unwrap();

    let hits = store.search_by_title("the lord", Some(tolkien.id)).unwrap();
    assert_eq!(titles(&hits), vec!["The Lord of the Rings"]);

    let jordan = store.find_author("Robert", "Jordan").unwrap().unwrap();
    let hits = store.search_by_title("hobbit", Some(jordan.id)).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn title_search_without_matches_is_empty() {
    let store = seeded_store();
    assert!(store.search_by_title("silmarillion", None).unwrap().is_empty());
}

#[test]
fn author_search_matches_last_name_prefix_only() {
    let store = seeded_store();

    let hits = store.search_authors_starting_from("tolk").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "J.R.R.");
    assert_eq!(hits[0].last_name, "Tolkien");

    let hits = store.search_authors_starting_from("TOLK").unwrap();
    assert_eq!(hits.len(), 1);

    assert!(store.search_authors_starting_from("olkien").unwrap().is_empty());

    let hits = store.search_authors_starting_from("smi").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "Tolkien");
}
