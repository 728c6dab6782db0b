// tests/claim_cache.rs
use std::fs;

use ptr_claim::{
    claim::{ClaimRecord, CoordSource, Stage},
    error::CacheError,
    grid::Cell,
    store,
};

fn full_record() -> ClaimRecord {
    let mut r = ClaimRecord::new("https://www.tamriel-rebuilt.org/claims/interiors/tailor", "Old Ebonheart, Tailor");
    r.detail_url = Some(r.id.clone());
    r.status = Stage::InDevelopment;
    r.claimant = Some("Vivec".into());
    r.reviewer = Some("Almalexia, Sotha Sil".into());
    r.image_ref = Some("https://www.tamriel-rebuilt.org/sites/default/files/claims/tailor.jpg".into());
    r.description = Some("Exterior cell: 5, -3.".into());
    r.last_update = Some("2 days ago".into());
    r.set_scraped(Cell::new(5, -3));
    r.locate(Cell::new(6, -3), CoordSource::Correction);
    r
}

#[test]
fn resolved_records_round_trip_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("interiors.json");

    let mut unresolved = ClaimRecord::new("local-7", "Lost Cave");
    unresolved.status = Stage::Other("On Hold".into());
    unresolved.mark_unresolved();
    let mut by_title = ClaimRecord::new("https://x.org/claims/b", "Shack [0,0]");
    by_title.locate(Cell::new(0, 0), CoordSource::Title);

    let records = vec![full_record(), unresolved, by_title];
    store::save(&path, &records).unwrap();
    assert_eq!(store::load(&path).unwrap(), records);
}

#[test]
fn object_form_duplicates_and_bad_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claims.json");
    fs::write(
        &path,
        r#"{
            "https://x.org/claims/a": {"title": "First", "stage": "Design", "cell_x": 1, "cell_y": 2},
            "https://x.org/claims/b": {"title": "Broken", "cell_x": "east"},
            "https://x.org/claims/c": {"title": "Third", "stage": "merged"}
        }"#,
    )
    .unwrap();

    let claims = store::load(&path).unwrap();
    let ids: Vec<&str> = claims.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["https://x.org/claims/a", "https://x.org/claims/c"]);
    assert_eq!(claims[0].coord, Some(Cell::new(1, 2)));
    assert_eq!(claims[0].coord_source, CoordSource::Scraped);
    assert_eq!(claims[1].status, Stage::Merged);
    assert_eq!(claims[1].coord_source, CoordSource::Unresolved);
}

#[test]
fn later_duplicate_replaces_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claims.json");
    fs::write(
        &path,
        r#"[{"url": "a", "title": "Old"}, {"url": "b", "title": "B"}, {"url": "a", "title": "New"}, {"title": "no key"}]"#,
    )
    .unwrap();

    let claims = store::load(&path).unwrap();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].title, "New");
    assert_eq!(claims[1].title, "B");
}

#[test]
fn missing_and_corrupt_files_are_distinct_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(store::load(&missing), Err(CacheError::Missing(_))));

    let corrupt = dir.path().join("bad.json");
    fs::write(&corrupt, "[{").unwrap();
    assert!(matches!(store::load(&corrupt), Err(CacheError::Corrupt { .. })));
}

#[test]
fn save_creates_parent_dirs_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("claims.json");
    store::save(&path, &[full_record()]).unwrap();

    let names: Vec<String> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["claims.json"]);
}
