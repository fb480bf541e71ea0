//! Live API test. Run with: `cargo test --features online`
#![cfg(feature = "online")]

use countries_rs::Client;

#[test]
fn fetch_live_country_list() {
    let table = Client::default().fetch_table().expect("live fetch");
    // The public dataset has well over a hundred countries.
    assert!(table.len() > 100, "only {} records", table.len());

    let germany = table.find_by_name("germany").expect("Germany present");
    assert!(germany.population.unwrap_or(0) > 10_000_000);
    assert!(!germany.language_names.is_empty());
    assert_eq!(germany.capital, "Berlin");
}
