use std::io::Write;
use std::path::Path;

use crate::RuleStore;

#[test]
fn loads_regions_in_file_order() {
    let store = RuleStore::from_reader("base ##@@\nbase @@##\nva ###@@\n".as_bytes());

    assert!(store.has_region("base"));
    assert!(store.has_region("va"));
    assert!(!store.has_region("md"));

    let base = store.rules_for("base");
    assert_eq!(base.len(), 2);
    assert_eq!(base[0].pattern(), "##@@");
    assert_eq!(base[1].pattern(), "@@##");
    assert_eq!(base[0].region(), "base");
}

#[test]
fn malformed_lines_are_skipped() {
    let source = "base ##@@\n\nlonely\none too many tokens\nva @@@##\n";
    let store = RuleStore::from_reader(source.as_bytes());

    assert!(store.has_region("base"));
    assert!(store.has_region("va"));
    assert!(!store.has_region("lonely"));
    assert!(!store.has_region("one"));
}

#[test]
fn uncompilable_patterns_are_skipped() {
    let store = RuleStore::from_reader("base [AB\nbase ###\n".as_bytes());
    let base = store.rules_for("base");
    assert_eq!(base.len(), 1);
    assert_eq!(base[0].pattern(), "###");
}

#[test]
fn loads_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "base ###@@@").unwrap();
    writeln!(file, "base ##@@##").unwrap();

    let store = RuleStore::load_from_path(file.path()).unwrap();
    assert_eq!(store.rules_for("base").len(), 2);
}

#[test]
fn missing_file_degrades_to_an_empty_store() {
    let store = RuleStore::load_or_empty(Path::new("/nonexistent/plates.patterns"));
    assert!(!store.has_region("base"));
    assert!(store.rules_for("base").is_empty());
}

#[test]
fn unknown_region_yields_no_rules() {
    let store = RuleStore::from_reader("base ####\n".as_bytes());
    assert!(store.rules_for("elsewhere").is_empty());
}
