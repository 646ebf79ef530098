//! End-to-end tests over the fixture files in `tests/data`.

use std::path::{Path, PathBuf};

use neo_explorer::{Criteria, NeoDatabase, build_filters, limit};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn load_fixture_db() -> NeoDatabase {
    NeoDatabase::load(&fixture("neos.csv"), &fixture("cad.json")).unwrap()
}

#[test]
fn test_fixture_loads_and_links() {
    let db = load_fixture_db();
    assert_eq!(db.neos().len(), 4);
    assert_eq!(db.len(), 4);
    assert!(!db.is_empty());
    assert_eq!(db.approaches().len(), 6);
    assert!(db.approaches().iter().all(|a| a.is_linked()));

    let eros = db.find_by_designation("433").unwrap();
    assert_eq!(eros.name.as_deref(), Some("Eros"));
    assert_eq!(eros.approach_count(), 2);

    let unnamed = db.find_by_designation("2019 da").unwrap();
    assert!(unnamed.name.is_none());
    assert!(unnamed.diameter.is_nan());
    assert!(unnamed.hazardous);
}

#[test]
fn test_every_approach_points_back() {
    let db = load_fixture_db();
    for approach in db.approaches() {
        let owner = db.neo_of(approach).unwrap();
        let count = db
            .approaches_of(owner)
            .filter(|a| std::ptr::eq(*a, approach))
            .count();
        assert_eq!(count, 1);
    }
}

#[test]
fn test_query_combinations() {
    let db = load_fixture_db();

    assert_eq!(db.query(&[]).count(), 6);

    let filters = build_filters(&Criteria {
        date: Some("2029-Apr-13 12:00".into()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(db.query(&filters).count(), 3);

    let filters = build_filters(&Criteria {
        date: Some("2029-Apr-13 12:00".into()),
        hazardous: Some(true),
        ..Default::default()
    })
    .unwrap();
    let hits: Vec<_> = db.query(&filters).map(|l| l.neo.designation()).collect();
    assert_eq!(hits, vec!["99942", "2019 DA"]);

    let filters = build_filters(&Criteria {
        end_date: Some("1950-Jan-01 00:00".into()),
        diameter_min: Some("20".into()),
        ..Default::default()
    })
    .unwrap();
    let hits: Vec<_> = db.query(&filters).map(|l| l.neo.designation()).collect();
    assert_eq!(hits, vec!["1036"]);
}

#[test]
fn test_limit_over_query() {
    let db = load_fixture_db();
    assert_eq!(limit(db.query(&[]), Some(4)).count(), 4);
    assert_eq!(limit(db.query(&[]), Some(0)).count(), 6);
    assert_eq!(limit(db.query(&[]), None).count(), 6);
}

#[test]
fn test_missing_source_fails_load() {
    assert!(NeoDatabase::load(&fixture("missing.csv"), &fixture("cad.json")).is_err());
}
