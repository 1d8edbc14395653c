use super::*;
use crate::assets::decode::PreparedImage;

fn cfg_json() -> &'static str {
    r##"
{
  "background": [
    { "name": "Sky", "source": "bg/sky.png" },
    { "name": "Sky", "source": "bg/sky_dupe.png" },
    { "name": "Sunset", "source": "bg/sunset.png" }
  ],
  "body": [ { "name": "Classic", "source": "body/classic.png" } ],
  "hat": [
    {
      "name": "Bucket",
      "source": "hat/bucket.png",
      "back_source": "hat/bucket_back.png",
      "occlusion_mask": true
    }
  ]
}
"##
}

#[test]
fn config_defaults_missing_categories_to_empty() {
    let cfg = CatalogConfig::from_json(cfg_json()).unwrap();
    assert_eq!(cfg.background.len(), 3);
    assert_eq!(cfg.body.len(), 1);
    assert!(cfg.eye.is_empty());
    assert!(cfg.mouth.is_empty());
    assert!(cfg.costume.is_empty());
    assert!(cfg.unlocks.is_empty());
    assert!(cfg.hat[0].occlusion_mask);
    assert_eq!(cfg.hat[0].back_source.as_deref(), Some("hat/bucket_back.png"));
}

#[test]
fn from_config_deduplicates_by_name() {
    let cfg = CatalogConfig::from_json(cfg_json()).unwrap();
    let catalog = Catalog::from_config(&cfg);
    assert_eq!(catalog.len(Category::Background), 2);
    assert_eq!(catalog.get(Category::Background, 0).unwrap().name(), "Sky");
    assert_eq!(
        catalog.get(Category::Background, 0).unwrap().spec().source,
        "bg/sky.png"
    );
    assert_eq!(
        catalog.get(Category::Background, 1).unwrap().name(),
        "Sunset"
    );
}

#[test]
fn append_is_idempotent_per_name() {
    let mut catalog = Catalog::default();
    let (i0, added0) = catalog.append(Category::Hat, AssetSpec::new("Crown", "hat/crown.png"));
    let (i1, added1) = catalog.append(Category::Hat, AssetSpec::new("Crown", "other.png"));
    assert_eq!((i0, added0), (0, true));
    assert_eq!((i1, added1), (0, false));
    assert_eq!(catalog.len(Category::Hat), 1);
}

#[test]
fn install_settles_pending_and_rejects_repeats() {
    let mut catalog = Catalog::default();
    catalog.append(Category::Body, AssetSpec::new("Classic", "body.png"));
    assert_eq!(catalog.pending_count(), 1);

    let img = PreparedImage::transparent(2, 2);
    assert!(catalog.install(Category::Body, "Classic", ImageKind::Primary, img.clone()));
    assert_eq!(catalog.pending_count(), 0);
    assert_eq!(catalog.ready_count(), 1);

    // Already settled: stale completions are discarded.
    assert!(!catalog.install(Category::Body, "Classic", ImageKind::Primary, img.clone()));
    assert!(!catalog.place_hold(Category::Body, "Classic", ImageKind::Primary));

    // Unknown targets are rejected too.
    assert!(!catalog.install(Category::Body, "Ghost", ImageKind::Primary, img));
}

#[test]
fn back_slot_exists_only_when_declared() {
    let mut catalog = Catalog::default();
    let mut spec = AssetSpec::new("Bucket", "hat.png");
    spec.back_source = Some("hat_back.png".to_string());
    catalog.append(Category::Hat, spec);
    catalog.append(Category::Hat, AssetSpec::new("Beanie", "beanie.png"));
    assert_eq!(catalog.pending_count(), 3);

    let img = PreparedImage::transparent(1, 1);
    assert!(catalog.install(Category::Hat, "Bucket", ImageKind::Back, img.clone()));
    assert!(!catalog.install(Category::Hat, "Beanie", ImageKind::Back, img));
}

#[test]
fn expire_overdue_substitutes_placeholders() {
    let mut catalog = Catalog::default();
    catalog.append(Category::Eye, AssetSpec::new("Round", "eye.png"));
    assert_eq!(catalog.expire_overdue(std::time::Duration::ZERO), 1);
    assert_eq!(catalog.pending_count(), 0);
    assert_eq!(catalog.ready_count(), 0);

    // The placeholder stands in as a loaded (transparent) image.
    let asset = catalog.get(Category::Eye, 0).unwrap();
    let img = asset.image().unwrap();
    assert!(img.rgba8_premul.iter().all(|&b| b == 0));

    // A completion racing past the expiry is discarded.
    assert!(!catalog.install(
        Category::Eye,
        "Round",
        ImageKind::Primary,
        PreparedImage::transparent(4, 4)
    ));
}

#[test]
fn essential_ready_needs_first_background_and_body_settled() {
    let mut catalog = Catalog::default();
    catalog.append(Category::Background, AssetSpec::new("Sky", "bg.png"));
    catalog.append(Category::Body, AssetSpec::new("Classic", "body.png"));
    assert!(!catalog.essential_ready());

    let img = PreparedImage::transparent(1, 1);
    catalog.install(Category::Background, "Sky", ImageKind::Primary, img.clone());
    assert!(!catalog.essential_ready());
    catalog.install(Category::Body, "Classic", ImageKind::Primary, img);
    assert!(catalog.essential_ready());
}
