use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use pool_terminal::error::PoolError;
use pool_terminal::reference::{Allowlist, load_roster};

static FIXTURE_SEQ: AtomicUsize = AtomicUsize::new(0);

fn write_fixture(name: &str, contents: &str) -> PathBuf {
    let seq = FIXTURE_SEQ.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "pool_terminal_test_{}_{seq}_{name}",
        std::process::id()
    ));
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn roster_loads_in_file_order() {
    let path = write_fixture(
        "roster.csv",
        "group_name,country\nA,Germany\nA,Scotland\nB,Spain\n",
    );
    let roster = load_roster(&path).expect("roster loads");
    fs::remove_file(&path).ok();

    assert_eq!(roster.len(), 3);
    assert_eq!(roster[0].group_name, "A");
    assert_eq!(roster[0].country, "Germany");
    assert_eq!(roster[2].group_name, "B");
    assert_eq!(roster[2].country, "Spain");
}

#[test]
fn roster_skips_blank_rows_and_requires_columns() {
    let path = write_fixture(
        "roster_blank.csv",
        "group_name,country\nA,Germany\n,\nA,\n",
    );
    let roster = load_roster(&path).expect("roster loads");
    fs::remove_file(&path).ok();
    assert_eq!(roster.len(), 1);

    let bad = write_fixture("roster_bad.csv", "group,team\nA,Germany\n");
    let err = load_roster(&bad).expect_err("missing column must fail");
    fs::remove_file(&bad).ok();
    assert!(matches!(err, PoolError::Configuration(_)));
}

#[test]
fn allowlist_membership_is_exact_and_case_sensitive() {
    let path = write_fixture(
        "allowed.csv",
        "user_id\njohn.simmons\nana.ferrer\n",
    );
    let allowlist = Allowlist::load(&path).expect("allowlist loads");
    fs::remove_file(&path).ok();

    assert_eq!(allowlist.len(), 2);
    assert!(allowlist.is_allowed_user("john.simmons"));
    assert!(allowlist.is_allowed_user("ana.ferrer"));
    assert!(!allowlist.is_allowed_user("John.Simmons"));
    assert!(!allowlist.is_allowed_user("john"));
    assert!(!allowlist.is_allowed_user(""));
}

#[test]
fn missing_allowlist_is_a_configuration_error() {
    let err = Allowlist::load(std::path::Path::new("does/not/exist.csv"))
        .expect_err("missing file must fail");
    assert!(matches!(err, PoolError::Configuration(_)));
}

#[test]
fn allowlist_requires_user_id_column() {
    let path = write_fixture("allowed_bad.csv", "username\njohn.simmons\n");
    let err = Allowlist::load(&path).expect_err("missing column must fail");
    fs::remove_file(&path).ok();
    assert!(matches!(err, PoolError::Configuration(_)));
}
