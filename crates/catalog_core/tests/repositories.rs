use catalog_core::db::open_db_in_memory;
use catalog_core::{
    Author, AuthorListQuery, AuthorRepository, Category, CategoryListQuery, CategoryRepository,
    EntityType, RepoError, SqliteAuthorRepository, SqliteCategoryRepository,
};
use uuid::Uuid;

#[test]
fn category_rows_roundtrip_and_list_deterministically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let root = Category::new("Biography").with_description("Lives");
    let child = Category::child_of(root.id, "Artists");
    let other = Category::new("Atlases");
    for category in [&root, &child, &other] {
        repo.insert_category(category).unwrap();
    }

    let loaded = repo.get_category(child.id, false).unwrap().unwrap();
    assert_eq!(loaded, child);

    let names: Vec<_> = repo
        .list_categories(&CategoryListQuery::default())
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Artists", "Atlases", "Biography"]);

    let filtered = repo
        .list_categories(&CategoryListQuery {
            name_contains: Some("at".to_string()),
            ..CategoryListQuery::default()
        })
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, other.id);

    assert_eq!(repo.soft_delete_categories(&[other.id, other.id], 7).unwrap(), 1);
    assert_eq!(repo.scan_active_categories().unwrap().len(), 2);
    let all = repo
        .list_categories(&CategoryListQuery {
            include_deleted: true,
            limit: Some(1),
            offset: 1,
            ..CategoryListQuery::default()
        })
        .unwrap();
    assert_eq!(all[0].id, other.id);
    assert_eq!(all[0].deleted_at, Some(7));
}

#[test]
fn updating_missing_rows_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let authors = SqliteAuthorRepository::try_new(&conn).unwrap();

    let ghost = Category::new("Ghost");
    match categories.update_category(&ghost).unwrap_err() {
        RepoError::NotFound { kind, id } => {
            assert_eq!(kind, EntityType::Category);
            assert_eq!(id, ghost.id);
        }
        other => panic!("unexpected error: {other}"),
    }

    let author = Author::new("Nobody Known");
    assert!(matches!(
        authors.update_author(&author).unwrap_err(),
        RepoError::NotFound {
            kind: EntityType::Author,
            ..
        }
    ));
}

#[test]
fn author_search_is_case_insensitive_and_hides_deleted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let mut gone = Author::new("Mary Shelley");
    repo.insert_author(&Author::new("Percy Shelley")).unwrap();
    repo.insert_author(&gone).unwrap();
    repo.insert_author(&Author::new("John Keats")).unwrap();

    gone.soft_delete(11);
    repo.update_author(&gone).unwrap();

    let query = AuthorListQuery {
        name_contains: Some("SHELL".to_string()),
        ..AuthorListQuery::default()
    };
    let found = repo.list_authors(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Percy Shelley");

    let with_deleted = repo
        .list_authors(&AuthorListQuery {
            include_deleted: true,
            ..query
        })
        .unwrap();
    assert_eq!(with_deleted.len(), 2);
    assert!(repo.get_author(Uuid::new_v4(), true).unwrap().is_none());
}

#[test]
fn corrupted_rows_surface_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO categories (category_uuid, name, created_at, updated_at)
         VALUES ('not-a-uuid', 'Broken', 1, 1);",
        [],
    )
    .unwrap();

    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let err = repo.scan_active_categories().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");
}
