use super::*;

fn table() -> UnlockTable {
    UnlockTable::new(vec![UnlockEntry {
        code: "  crownme ".to_string(),
        category: Category::Hat,
        asset: AssetSpec::new("Golden Crown", "hat/golden_crown.png"),
        description: Some("for true royalty".to_string()),
    }])
}

#[test]
fn normalize_trims_and_uppercases() {
    assert_eq!(normalize_code("  crownme "), "CROWNME");
    assert_eq!(normalize_code("CROWNME"), "CROWNME");
}

#[test]
fn lookup_matches_normalized_codes() {
    let table = table();
    assert!(table.lookup("crownme").is_some());
    assert!(table.lookup(" CrownMe  ").is_some());
    assert!(table.lookup("tiara").is_none());
}

#[test]
fn unknown_code_never_mutates_the_catalog() {
    let table = table();
    let mut catalog = Catalog::default();
    catalog.append(Category::Hat, AssetSpec::new("Bucket", "hat/bucket.png"));

    let outcome = apply_unlock(&mut catalog, &table, "WRONG");
    assert_eq!(outcome, UnlockOutcome::UnknownCode);
    assert_eq!(catalog.len(Category::Hat), 1);
}

#[test]
fn matching_code_appends_and_reports_the_asset() {
    let table = table();
    let mut catalog = Catalog::default();
    catalog.append(Category::Hat, AssetSpec::new("Bucket", "hat/bucket.png"));

    let outcome = apply_unlock(&mut catalog, &table, "crownme");
    assert_eq!(
        outcome,
        UnlockOutcome::Unlocked {
            category: Category::Hat,
            index: 1,
            newly_added: true,
            description: Some("for true royalty".to_string()),
        }
    );
    assert_eq!(catalog.len(Category::Hat), 2);
    assert_eq!(catalog.get(Category::Hat, 1).unwrap().name(), "Golden Crown");
}

#[test]
fn repeated_unlock_is_a_no_op_beyond_the_outcome() {
    let table = table();
    let mut catalog = Catalog::default();

    let first = apply_unlock(&mut catalog, &table, "CROWNME");
    let second = apply_unlock(&mut catalog, &table, "CROWNME");

    assert_eq!(catalog.len(Category::Hat), 1);
    let UnlockOutcome::Unlocked {
        index: i0,
        newly_added: a0,
        ..
    } = first
    else {
        panic!("expected unlock");
    };
    let UnlockOutcome::Unlocked {
        index: i1,
        newly_added: a1,
        ..
    } = second
    else {
        panic!("expected unlock");
    };
    assert_eq!(i0, i1);
    assert!(a0);
    assert!(!a1);
}
