use super::*;

#[test]
fn constructor_helpers_build_matching_variants() {
    assert!(matches!(
        PfpError::validation("bad"),
        PfpError::Validation(_)
    ));
    assert!(matches!(PfpError::catalog("bad"), PfpError::Catalog(_)));
    assert!(matches!(PfpError::render("bad"), PfpError::Render(_)));
    assert!(matches!(PfpError::export("bad"), PfpError::Export(_)));
}

#[test]
fn display_includes_taxonomy_prefix() {
    assert_eq!(
        PfpError::validation("canvas size must be > 0").to_string(),
        "validation error: canvas size must be > 0"
    );
    assert_eq!(
        PfpError::export("encoder rejected frame").to_string(),
        "export error: encoder rejected frame"
    );
}

#[test]
fn anyhow_errors_wrap_transparently() {
    let err: PfpError = anyhow::anyhow!("io exploded").into();
    assert!(matches!(err, PfpError::Other(_)));
    assert_eq!(err.to_string(), "io exploded");
}
