use super::*;

#[test]
fn normalize_path_cross_platform() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path(".").is_err());
}

#[test]
fn fs_fetcher_reads_relative_files() {
    let dir = std::env::temp_dir().join(format!(
        "pfpkit_fetch_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(dir.join("art")).unwrap();
    std::fs::write(dir.join("art/a.bin"), b"pixels").unwrap();

    let fetcher = FsFetcher::new(&dir);
    assert_eq!(fetcher.fetch("art/a.bin").unwrap(), b"pixels");
    assert!(fetcher.fetch("art/missing.bin").is_err());
    assert!(fetcher.fetch("../escape.bin").is_err());

    std::fs::remove_dir_all(&dir).ok();
}
