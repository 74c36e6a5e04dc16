use specsync_core::db::{create_catalog, create_catalog_in_memory};
use specsync_core::{
    import_entries, CatalogEntry, CatalogRepository, CatalogStore, RepoError,
    SqliteCatalogRepository,
};
use tempfile::TempDir;

fn seeded() -> rusqlite::Connection {
    let mut conn = create_catalog_in_memory().unwrap();
    import_entries(
        &mut conn,
        &[
            CatalogEntry::new("GE-KT2-20-A100-1,2-PG", "Лоток перфорований 200x100").with_mass(2.1),
            CatalogEntry::new("GE-KT2-30-A100-1,2-PG", "Лоток перфорований 300x100"),
            CatalogEntry::new("GE-DK45-20-1,2-HDG", "Кришка кута 45"),
            CatalogEntry::new("GE-DK45-20-1,2-HDG", "Кришка кута 45 (дубль)"),
            CatalogEntry::new("GE_X%1", "Wildcard article"),
        ],
    )
    .unwrap();
    conn
}

#[test]
fn exact_match_returns_single_row() {
    let conn = seeded();
    let repo = SqliteCatalogRepository::new(&conn);

    let lookup = repo.find_exact("GE-KT2-20-A100-1,2-PG").unwrap();
    assert_eq!(lookup.match_count, 1);
    let entry = lookup.entry.unwrap();
    assert_eq!(entry.description, "Лоток перфорований 200x100");
    assert_eq!(entry.mass_per_unit, Some(2.1));
}

#[test]
fn duplicates_are_counted_not_resolved() {
    let conn = seeded();
    let repo = SqliteCatalogRepository::new(&conn);

    let lookup = repo.find_exact("GE-DK45-20-1,2-HDG").unwrap();
    assert_eq!(lookup.match_count, 2);
    assert!(lookup.entry.is_none());
    assert!(lookup.is_ambiguous());
}

#[test]
fn missing_article_is_zero_matches() {
    let conn = seeded();
    let repo = SqliteCatalogRepository::new(&conn);

    let lookup = repo.find_exact("GE-KT2-40-A100-1,2-PG").unwrap();
    assert_eq!(lookup.match_count, 0);
    assert!(lookup.entry.is_none());
}

#[test]
fn exact_match_is_case_and_whitespace_sensitive() {
    let conn = seeded();
    let repo = SqliteCatalogRepository::new(&conn);

    assert_eq!(repo.find_exact("ge-kt2-20-a100-1,2-pg").unwrap().match_count, 0);
    assert_eq!(repo.find_exact(" GE-KT2-20-A100-1,2-PG").unwrap().match_count, 0);
}

#[test]
fn prefix_search_is_sorted_and_escapes_wildcards() {
    let conn = seeded();
    let repo = SqliteCatalogRepository::new(&conn);

    let rows = repo.find_by_prefix("GE-KT2-", None).unwrap();
    let articles: Vec<_> = rows.iter().map(|row| row.article.as_str()).collect();
    assert_eq!(articles, vec!["GE-KT2-20-A100-1,2-PG", "GE-KT2-30-A100-1,2-PG"]);

    assert!(repo.find_by_prefix("GE_K", None).unwrap().is_empty());
    assert_eq!(repo.find_by_prefix("GE_X%", None).unwrap().len(), 1);
    assert_eq!(repo.find_by_prefix("GE", Some(1)).unwrap().len(), 1);
}

#[test]
fn import_rejects_blank_articles() {
    let mut conn = create_catalog_in_memory().unwrap();
    let err = import_entries(&mut conn, &[CatalogEntry::new("  ", "nothing")]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let repo = SqliteCatalogRepository::new(&conn);
    assert!(repo.find_by_prefix("", None).unwrap().is_empty());
}

#[test]
fn store_reads_file_catalog_read_only() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gerpaas.db");
    {
        let mut conn = create_catalog(&path).unwrap();
        import_entries(&mut conn, &[CatalogEntry::new("GE-AX-1", "Болт")]).unwrap();
    }

    let store = CatalogStore::open(&path);
    assert!(store.is_available());
    let lookup = store.find_exact("GE-AX-1");
    assert_eq!(lookup.entry.unwrap().description, "Болт");
    assert_eq!(store.find_by_prefix("GE-AX", None).len(), 1);
}

#[test]
fn missing_store_degrades_to_not_found() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::open(dir.path().join("absent.db"));

    assert!(!store.is_available());
    assert_eq!(store.find_exact("GE-AX-1").match_count, 0);
}

#[test]
fn null_description_reads_as_empty() {
    let conn = create_catalog_in_memory().unwrap();
    conn.execute(
        "INSERT INTO catalog_raw (spec_article, spec_description, kg_per_unit) VALUES (?1, NULL, NULL);",
        ["GE-KT2-10-A50-1,0-PG"],
    )
    .unwrap();

    let store = CatalogStore::from_connection(conn);
    let entry = store.find_exact("GE-KT2-10-A50-1,0-PG").entry.unwrap();
    assert_eq!(entry.description, "");
    assert_eq!(entry.mass_per_unit, None);
}

#[test]
fn text_mass_never_hides_the_description() {
    let conn = create_catalog_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO catalog_raw (spec_article, spec_description, kg_per_unit)
         VALUES ('GE-KT2-20-A100-1,2-PG', 'Лоток', '2,4'),
                ('GE-KT2-30-A100-1,2-PG', 'Лоток 300', 'важкий');",
    )
    .unwrap();

    let store = CatalogStore::from_connection(conn);
    let lookup = store.find_exact("GE-KT2-20-A100-1,2-PG");
    assert_eq!(lookup.match_count, 1);
    let entry = lookup.entry.unwrap();
    assert_eq!(entry.description, "Лоток");
    assert_eq!(entry.mass_per_unit, Some(2.4));

    let lookup = store.find_exact("GE-KT2-30-A100-1,2-PG");
    assert_eq!(lookup.match_count, 1);
    let entry = lookup.entry.unwrap();
    assert_eq!(entry.description, "Лоток 300");
    assert_eq!(entry.mass_per_unit, None);
}
