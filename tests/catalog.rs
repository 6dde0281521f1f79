use piedrill::catalog::{self, verify_all, CatalogError, Difficulty, Side};
use anyhow::Context;
use piedrill::CozyOracle;
use pretty_assertions::assert_eq;
use std::io::Write;

const TWO_LINES: &str = r#"[
  {"id": "petrov", "name": "Petrov Defense", "eco": "C42", "difficulty": "Intermediate", "side": "black",
   "moves": "1.e4 e5 2.Nf3 Nf6 3.Nxe5 d6 4.Nf3 Nxe4"},
  {"id": "broken", "name": "Broken Line", "eco": "A00", "difficulty": "Beginner", "side": "white",
   "moves": "1.e4 e5 2.Ke3"}
]"#;

#[test]
fn builtin_catalog_compiles() {
    let openings = catalog::get_chess_openings();
    let results = verify_all(&CozyOracle, &openings, None);
    assert_eq!(results.len(), openings.len());
    for (r, o) in results.iter().zip(&openings) {
        assert_eq!(r.id, o.id);
        assert!(r.is_ok(), "{}: {:?}", r.id, r.error);
    }
}

#[test]
fn verification_reports_bad_lines() {
    let openings = catalog::from_json_str(TWO_LINES).unwrap();
    assert_eq!(openings[0].side, Side::Black);
    assert_eq!(openings[0].difficulty, Difficulty::Intermediate);

    let results = verify_all(&CozyOracle, &openings, None);
    assert!(results[0].is_ok());
    assert_eq!(results[0].plies, 8);
    assert!(!results[1].is_ok());
    assert!(results[1].error.as_deref().unwrap().contains("ply 2"));
}

#[test]
fn loads_catalog_from_disk() {
    let path = std::env::temp_dir().join(format!("piedrill-catalog-{}.json", std::process::id()));
    std::fs::File::create(&path).unwrap().write_all(TWO_LINES.as_bytes()).unwrap();
    let openings = catalog::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(openings.len(), 2);
    assert!(catalog::find(&openings, "petrov").is_some());

    let missing = catalog::load_json(std::env::temp_dir().join("piedrill-no-such-catalog.json"));
    assert!(matches!(missing, Err(CatalogError::Io { .. })));

    let err = anyhow::Result::<Vec<catalog::Opening>>::Err(missing.unwrap_err().into())
        .context("loading piedrill-no-such-catalog.json")
        .unwrap_err();
    assert_eq!(err.to_string(), "loading piedrill-no-such-catalog.json");
    assert!(format!("{err:#}").contains("piedrill-no-such-catalog.json: "), "{err:#}");
}

#[test]
fn duplicate_ids_are_rejected() {
    let text = r#"[
      {"id": "x", "name": "A", "eco": "A00", "difficulty": "Beginner", "side": "white", "moves": "1.e4"},
      {"id": "x", "name": "B", "eco": "A00", "difficulty": "Beginner", "side": "black", "moves": "1.d4"}
    ]"#;
    assert!(matches!(catalog::from_json_str(text), Err(CatalogError::DuplicateId(id)) if id == "x"));
    assert!(matches!(catalog::from_json_str("{"), Err(CatalogError::Json(_))));
}
