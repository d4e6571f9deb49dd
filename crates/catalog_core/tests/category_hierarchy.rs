use catalog_core::db::open_db_in_memory;
use catalog_core::{
    Book, BookRepository, BookStatus, Category, CategoryForest, CategoryId, CategoryRepository,
    HierarchyError, HierarchyService, MutationEngine, MutationError, SqliteBookRepository,
    SqliteCategoryRepository,
};
use rusqlite::Connection;
use std::collections::BTreeSet;
use uuid::Uuid;

fn insert(engine: &MutationEngine<'_>, category: Category) -> CategoryId {
    engine.insert_category(&category, Some("librarian")).unwrap()
}

fn forest(conn: &Connection) -> CategoryForest {
    let repo = SqliteCategoryRepository::try_new(conn).unwrap();
    CategoryForest::load(&repo).unwrap()
}

#[test]
fn descendant_as_new_parent_is_a_cycle_and_cascade_uncategorizes_books() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let a = insert(&engine, Category::new("Science"));
    let b = insert(&engine, Category::child_of(a, "Physics"));
    let book = Book::new("Dune Messiah", "PID-001").in_category(b);
    let book_id = engine.insert_book(&book, None).unwrap();

    let service = HierarchyService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    assert!(service.would_create_cycle(a, Some(b)).unwrap());
    assert!(!service.would_create_cycle(b, None).unwrap());

    let report = engine.delete_category(a, false, None).unwrap();
    assert_eq!(report.categories_deleted, 2);
    assert_eq!(report.books_uncategorized, 1);
    assert_eq!(report.books_soft_deleted, 0);

    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    for id in [a, b] {
        let row = categories.get_category(id, true).unwrap().unwrap();
        assert!(row.is_deleted);
        assert!(row.deleted_at.is_some());
        assert!(categories.get_category(id, false).unwrap().is_none());
    }

    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let stored = books.get_book(book_id, false).unwrap().unwrap();
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.status, BookStatus::Available);
    assert!(!stored.is_deleted);
}

#[test]
fn descendants_ancestors_and_children_follow_active_links() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let root = insert(&engine, Category::new("Arts"));
    let music = insert(&engine, Category::child_of(root, "Music"));
    let jazz = insert(&engine, Category::child_of(music, "Jazz"));
    let bebop = insert(&engine, Category::child_of(jazz, "Bebop"));
    let painting = insert(&engine, Category::child_of(root, "Painting"));
    let other_root = insert(&engine, Category::new("History"));

    let service = HierarchyService::new(SqliteCategoryRepository::try_new(&conn).unwrap());

    assert_eq!(
        service.descendants(root, true).unwrap(),
        BTreeSet::from([root, music, jazz, bebop, painting])
    );
    assert_eq!(
        service.descendants(music, false).unwrap(),
        BTreeSet::from([jazz, bebop])
    );
    assert_eq!(
        service.children(Some(root)).unwrap(),
        BTreeSet::from([music, painting])
    );
    assert_eq!(
        service.children(None).unwrap(),
        BTreeSet::from([root, other_root])
    );

    let path: Vec<CategoryId> = service
        .ancestor_path(bebop)
        .unwrap()
        .into_iter()
        .map(|category| category.id)
        .collect();
    assert_eq!(path, vec![bebop, jazz, music, root]);

    engine.delete_category(jazz, true, None).unwrap();
    assert_eq!(
        service.descendants(root, true).unwrap(),
        BTreeSet::from([root, music, painting])
    );
    assert!(matches!(
        service.ancestor_path(bebop),
        Err(HierarchyError::NotFound(id)) if id == bebop
    ));
    assert!(matches!(
        service.descendants(Uuid::new_v4(), true),
        Err(HierarchyError::NotFound(_))
    ));
}

#[test]
fn reparenting_under_own_descendant_is_rejected_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let a = insert(&engine, Category::new("Alpha"));
    let b = insert(&engine, Category::child_of(a, "Beta"));
    let c = insert(&engine, Category::child_of(b, "Gamma"));

    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let mut moved = categories.get_category(a, false).unwrap().unwrap();
    let before = moved.clone();
    moved.parent_id = Some(c);

    let err = engine.update_category(&moved, None).unwrap_err();
    assert!(matches!(
        err,
        MutationError::Cycle { category_id, parent_id } if category_id == a && parent_id == c
    ));
    assert_eq!(categories.get_category(a, false).unwrap().unwrap(), before);

    moved.parent_id = Some(a);
    let err = engine.update_category(&moved, None).unwrap_err();
    assert_eq!(err.error_code(), "cycle_detected");
}

#[test]
fn self_parent_on_insert_is_a_cycle() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let mut category = Category::new("Loop");
    category.parent_id = Some(category.id);
    let err = engine.insert_category(&category, None).unwrap_err();
    assert!(matches!(err, MutationError::Cycle { .. }));
    assert!(forest(&conn).is_empty());
}

#[test]
fn missing_or_deleted_parent_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let ghost = Uuid::new_v4();
    let err = engine
        .insert_category(&Category::child_of(ghost, "Orphan"), None)
        .unwrap_err();
    assert!(matches!(err, MutationError::NotFound { id, .. } if id == ghost));

    let gone = insert(&engine, Category::new("Gone"));
    engine.delete_category(gone, false, None).unwrap();
    let err = engine
        .insert_category(&Category::child_of(gone, "Late"), None)
        .unwrap_err();
    assert!(matches!(err, MutationError::NotFound { id, .. } if id == gone));
}

#[test]
fn valid_reparent_moves_whole_subtree() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let left = insert(&engine, Category::new("Left"));
    let right = insert(&engine, Category::new("Right"));
    let branch = insert(&engine, Category::child_of(left, "Branch"));
    let leaf = insert(&engine, Category::child_of(branch, "Leaf"));

    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let mut moved = categories.get_category(branch, false).unwrap().unwrap();
    moved.parent_id = Some(right);
    moved.name = "Branch moved".to_string();
    let updated = engine.update_category(&moved, None).unwrap();
    assert_eq!(updated.parent_id, Some(right));
    assert!(updated.updated_at >= updated.created_at);

    let view = forest(&conn);
    assert_eq!(view.descendants(right, false), BTreeSet::from([branch, leaf]));
    assert!(view.descendants(left, false).is_empty());
    assert_eq!(view.parent_of(leaf), Some(branch));
}

#[test]
fn accepted_reparent_sequences_never_create_cycles() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let mut ids = Vec::new();
    for index in 0..6 {
        ids.push(insert(&engine, Category::new(format!("Node {index}"))));
    }

    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let mut accepted = 0;
    let mut rejected = 0;
    for round in 0..3 {
        for (child_pos, child) in ids.iter().enumerate() {
            for (parent_pos, parent) in ids.iter().enumerate() {
                if (child_pos + parent_pos + round) % 2 == 1 {
                    continue;
                }
                let mut candidate = categories.get_category(*child, false).unwrap().unwrap();
                candidate.parent_id = Some(*parent);
                match engine.update_category(&candidate, None) {
                    Ok(_) => accepted += 1,
                    Err(MutationError::Cycle { .. }) => rejected += 1,
                    Err(other) => panic!("unexpected error: {other}"),
                }
                assert!(forest(&conn).detect_all_cycles().is_empty());
            }
        }
    }
    assert!(accepted > 0);
    assert!(rejected > 0);
}

#[test]
fn integrity_scan_reports_rows_cyclic_in_storage() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let x = insert(&engine, Category::new("Xray"));
    let y = insert(&engine, Category::child_of(x, "Yankee"));
    let z = insert(&engine, Category::child_of(y, "Zulu"));
    let clean = insert(&engine, Category::new("Clean"));

    conn.execute(
        "UPDATE categories SET parent_uuid = ?1 WHERE category_uuid = ?2;",
        [z.to_string(), x.to_string()],
    )
    .unwrap();

    let service = HierarchyService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    assert_eq!(
        service.detect_all_cycles().unwrap(),
        BTreeSet::from([x, y, z])
    );
    assert_eq!(service.ancestor_path(x).unwrap().len(), 3);
    assert!(service.would_create_cycle(clean, Some(y)).unwrap());
    assert!(!service.children(None).unwrap().contains(&x));
}

#[test]
fn books_in_subtree_cover_every_active_descendant() {
    let conn = open_db_in_memory().unwrap();
    let engine = MutationEngine::new(&conn);

    let history = insert(&engine, Category::new("History"));
    let ancient = insert(&engine, Category::child_of(history, "Ancient"));
    let rome = insert(&engine, Category::child_of(ancient, "Rome"));
    let other = insert(&engine, Category::new("Cooking"));

    engine
        .insert_book(&Book::new("SPQR", "PID-610").in_category(rome), None)
        .unwrap();
    engine
        .insert_book(&Book::new("Histories", "PID-611").in_category(history), None)
        .unwrap();
    let gone = engine
        .insert_book(&Book::new("Annals", "PID-612").in_category(ancient), None)
        .unwrap();
    engine.soft_delete_book(gone, None).unwrap();
    engine
        .insert_book(&Book::new("Bread", "PID-613").in_category(other), None)
        .unwrap();
    engine.insert_book(&Book::new("Loose", "PID-614"), None).unwrap();

    let service = HierarchyService::new(SqliteCategoryRepository::try_new(&conn).unwrap());
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let titles = |id: CategoryId| -> Vec<String> {
        service
            .books_in_subtree(&books, id)
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect()
    };
    assert_eq!(titles(history), vec!["Histories", "SPQR"]);
    assert_eq!(titles(ancient), vec!["SPQR"]);
    assert_eq!(titles(other), vec!["Bread"]);

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.books_in_subtree(&books, missing),
        Err(HierarchyError::NotFound(id)) if id == missing
    ));
    engine.delete_category(rome, true, None).unwrap();
    assert!(matches!(
        service.books_in_subtree(&books, rome),
        Err(HierarchyError::NotFound(_))
    ));
    assert_eq!(titles(history), vec!["Histories"]);
}
