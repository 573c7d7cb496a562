use crate::workflows::discipline::catalog::{CatalogError, ViolationCatalog};
use crate::workflows::discipline::domain::{Severity, ViolationCategory, ViolationCategoryId};

fn entry(id: &str, name: &str, severity: Severity, order: u32, active: bool) -> ViolationCategory {
    ViolationCategory {
        id: ViolationCategoryId(id.to_string()),
        category_name: name.to_string(),
        severity,
        default_points: 1,
        display_order: order,
        is_active: active,
    }
}

#[test]
fn grouping_includes_every_tier_in_display_order() {
    let catalog = ViolationCatalog::from_categories(vec![
        entry("late", "Tardiness", Severity::Minor, 1, true),
        entry("sleep", "Sleeping on shift", Severity::Critical, 1, true),
    ]);

    let grouped = catalog.list_active_grouped_by_severity();
    let tiers: Vec<Severity> = grouped.keys().copied().collect();
    assert_eq!(tiers, Severity::ordered().to_vec());
    assert!(grouped[&Severity::Moderate].is_empty());
    assert!(grouped[&Severity::Serious].is_empty());
    assert!(grouped[&Severity::ImmediateTermination].is_empty());
    assert_eq!(grouped[&Severity::Critical].len(), 1);
}

#[test]
fn tiers_sort_by_display_order_then_name() {
    let catalog = ViolationCatalog::from_categories(vec![
        entry("c", "Zeta", Severity::Minor, 2, true),
        entry("a", "Beta", Severity::Minor, 1, true),
        entry("b", "Alpha", Severity::Minor, 2, true),
    ]);

    let names: Vec<String> = catalog.list_active_grouped_by_severity()[&Severity::Minor]
        .iter()
        .map(|category| category.category_name.clone())
        .collect();
    assert_eq!(names, vec!["Beta", "Alpha", "Zeta"]);
}

#[test]
fn inactive_categories_are_hidden_and_unresolvable() {
    let catalog = ViolationCatalog::from_categories(vec![
        entry("retired", "Retired rule", Severity::Moderate, 1, false),
        entry("live", "Live rule", Severity::Moderate, 2, true),
    ]);

    assert_eq!(catalog.len(), 1);
    assert_eq!(
        catalog.list_active_grouped_by_severity()[&Severity::Moderate].len(),
        1
    );

    let retired = ViolationCategoryId("retired".to_string());
    match catalog.resolve(&retired) {
        Err(CatalogError::NotFound(id)) => assert_eq!(id, retired),
        other => panic!("expected not found, got {other:?}"),
    }
    assert!(catalog
        .resolve(&ViolationCategoryId("live".to_string()))
        .is_ok());
}

#[test]
fn repeated_listing_is_identical() {
    let catalog = ViolationCatalog::seeded();
    let first = catalog.list_active_grouped_by_severity();
    let second = catalog.list_active_grouped_by_severity();
    assert_eq!(first, second);
    assert_eq!(
        first.keys().collect::<Vec<_>>(),
        second.keys().collect::<Vec<_>>()
    );
}

#[test]
fn seeded_points_follow_tier_conventions() {
    let catalog = ViolationCatalog::seeded();
    for (severity, categories) in catalog.list_active_grouped_by_severity() {
        assert!(!categories.is_empty(), "{} tier is empty", severity.label());
        if let Some(range) = severity.conventional_points() {
            for category in categories {
                assert!(
                    range.contains(&category.default_points),
                    "{} has {} points",
                    category.category_name,
                    category.default_points
                );
            }
        }
    }
}

#[test]
fn empty_catalog_still_lists_tiers() {
    let catalog = ViolationCatalog::default();
    let grouped = catalog.list_active_grouped_by_severity();
    assert_eq!(grouped.len(), 5);
    assert!(grouped.values().all(Vec::is_empty));
}

#[test]
fn load_reads_from_category_repository() {
    let seeded = ViolationCatalog::seeded();
    let loaded = ViolationCatalog::load(&seeded).expect("catalog loads");
    assert_eq!(loaded.len(), seeded.len());
}

#[test]
fn duplicate_ids_keep_the_last_active_entry() {
    let catalog = ViolationCatalog::from_categories(vec![
        entry("tardy", "Tardiness (2019 handbook)", Severity::Minor, 1, true),
        entry("tardy", "Tardiness", Severity::Minor, 1, true),
        entry("tardy", "Tardiness (draft)", Severity::Minor, 1, false),
    ]);

    assert_eq!(catalog.len(), 1);
    let resolved = catalog
        .resolve(&ViolationCategoryId("tardy".to_string()))
        .expect("tardy resolves");
    assert_eq!(resolved.category_name, "Tardiness");
}
