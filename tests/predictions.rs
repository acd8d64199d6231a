use std::path::Path;

use pool_terminal::matchups::round_robin;
use pool_terminal::reference::Competitor;
use pool_terminal::schema::load_schema_doc;
use pool_terminal::store::PredictionStore;

fn open_store() -> PredictionStore {
    let doc = load_schema_doc(Path::new("data/tables_definition.json")).expect("schema doc");
    let store = PredictionStore::open_in_memory().expect("in-memory store");
    store.apply_schema(&doc).expect("apply schema");
    store
}

fn group_a() -> Vec<Competitor> {
    ["Germany", "Scotland", "Hungary", "Switzerland"]
        .into_iter()
        .map(|country| Competitor {
            group_name: "A".to_string(),
            country: country.to_string(),
        })
        .collect()
}

#[test]
fn resubmission_keeps_one_row_with_latest_scores() {
    let store = open_store();

    store
        .submit_prediction("john.simmons", "Germany", "Scotland", 2, 1)
        .expect("first submit");
    store
        .submit_prediction("john.simmons", "Germany", "Scotland", 3, 1)
        .expect("second submit");

    let rows = store.list_predictions().expect("list");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.user_id, "john.simmons");
    assert_eq!(row.home, "Germany");
    assert_eq!(row.away, "Scotland");
    assert_eq!(row.home_score, 3);
    assert_eq!(row.visitor_score, 1);
}

#[test]
fn predictions_for_different_keys_coexist() {
    let store = open_store();

    store
        .submit_prediction("john.simmons", "Germany", "Scotland", 2, 1)
        .expect("submit");
    store
        .submit_prediction("john.simmons", "Germany", "Hungary", 1, 0)
        .expect("submit");
    store
        .submit_prediction("ana.ferrer", "Germany", "Scotland", 0, 2)
        .expect("submit");

    assert_eq!(store.prediction_count().expect("count"), 3);
}

#[test]
fn listing_is_ordered_and_stable() {
    let store = open_store();

    store
        .submit_prediction("zoe", "Spain", "Italy", 1, 1)
        .expect("submit");
    store
        .submit_prediction("ana", "Spain", "Croatia", 2, 0)
        .expect("submit");
    store
        .submit_prediction("ana", "Croatia", "Italy", 0, 0)
        .expect("submit");

    let rows = store.list_predictions().expect("list");
    let keys: Vec<(String, String, String)> = rows
        .iter()
        .map(|row| (row.user_id.clone(), row.home.clone(), row.away.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn schema_document_applies_idempotently() {
    let doc = load_schema_doc(Path::new("data/tables_definition.json")).expect("schema doc");
    let store = PredictionStore::open_in_memory().expect("store");
    store.apply_schema(&doc).expect("first apply");
    store.apply_schema(&doc).expect("second apply");

    store
        .submit_prediction("john.simmons", "Germany", "Scotland", 2, 1)
        .expect("store still writable");
}

#[test]
fn seeding_is_idempotent_and_preserves_roster_order() {
    let mut store = open_store();
    let roster = group_a();

    let first = store.seed_competitors(&roster).expect("first seed");
    assert_eq!(first, roster.len());
    let second = store.seed_competitors(&roster).expect("second seed");
    assert_eq!(second, 0);

    let countries = store.group_roster("A").expect("roster");
    assert_eq!(countries, vec!["Germany", "Scotland", "Hungary", "Switzerland"]);
    assert_eq!(store.group_names().expect("groups"), vec!["A"]);
}

#[test]
fn group_a_roster_generates_the_six_expected_matchups() {
    let mut store = open_store();
    store.seed_competitors(&group_a()).expect("seed");

    let roster = store.group_roster("A").expect("roster");
    let pairs = round_robin(&roster);
    let expect = [
        ("Germany", "Scotland"),
        ("Germany", "Hungary"),
        ("Germany", "Switzerland"),
        ("Scotland", "Hungary"),
        ("Scotland", "Switzerland"),
        ("Hungary", "Switzerland"),
    ];
    assert_eq!(pairs.len(), 6);
    for (pair, (home, away)) in pairs.iter().zip(expect.iter()) {
        assert_eq!(pair.0, *home);
        assert_eq!(pair.1, *away);
    }
}
