//! In-memory country table: ordered records plus a case-insensitive name
//! index. Built wholesale from one fetched payload, immutable afterwards;
//! a re-fetch builds a fresh table to swap in.

use crate::models::{CountryRecord, RawCountry};
use ahash::AHashMap;
use log::warn;
use serde_json::Value;

/// Ordered collection of normalized countries.
///
/// Duplicate common names keep the first occurrence in upstream order; the
/// later ones remain enumerable via [`CountryTable::records`] but are not
/// reachable by name.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    records: Vec<CountryRecord>,
    /// Lowercased common name -> index of its first occurrence.
    index: AHashMap<String, usize>,
}

impl CountryTable {
    /// Build a table from raw per-country JSON objects, preserving payload
    /// order.
    ///
    /// Normalization is best-effort per record: a field that fails to parse
    /// degrades to its documented default, and a value that is not even an
    /// object degrades to an all-default placeholder record. The output
    /// always has one record per input value.
    pub fn build(raw: &[Value]) -> Self {
        let records = raw
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let parsed: RawCountry = match serde_json::from_value(v.clone()) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("record {i} is not a country object ({e}); keeping a placeholder");
                        RawCountry::default()
                    }
                };
                CountryRecord::from(parsed)
            })
            .collect();
        Self::from_records(records)
    }

    /// Assemble a table from already-normalized records.
    pub fn from_records(records: Vec<CountryRecord>) -> Self {
        let mut index = AHashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            index.entry(r.common_name.to_lowercase()).or_insert(i);
        }
        Self { records, index }
    }

    /// Case-insensitive exact lookup by common name.
    ///
    /// Returns the first record in table order when upstream data carries
    /// duplicate names, and `None` when nothing matches. No fuzzy or partial
    /// matching: a mismatch is an absent result, not a nearest guess.
    pub fn find_by_name(&self, name: &str) -> Option<&CountryRecord> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| &self.records[i])
    }

    /// Country names in table order, for menus and selection widgets.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.common_name.as_str())
    }

    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CountryRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a CountryTable {
    type Item = &'a CountryRecord;
    type IntoIter = std::slice::Iter<'a, CountryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, population: Option<u64>) -> CountryRecord {
        CountryRecord::from(RawCountry {
            name: crate::models::RawName {
                common: Some(name.to_string()),
                official: None,
            },
            population,
            ..RawCountry::default()
        })
    }

    #[test]
    fn index_keeps_first_occurrence_on_duplicates() {
        let t = CountryTable::from_records(vec![
            named("Atlantis", Some(1)),
            named("Atlantis", Some(2)),
        ]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.find_by_name("atlantis").unwrap().population, Some(1));
    }

    #[test]
    fn names_iterator_is_restartable() {
        let t = CountryTable::from_records(vec![named("A", None), named("B", None)]);
        let first: Vec<_> = t.names().collect();
        let second: Vec<_> = t.names().collect();
        assert_eq!(first, vec!["A", "B"]);
        assert_eq!(first, second);
    }

    #[test]
    fn default_table_is_empty() {
        let t = CountryTable::default();
        assert!(t.is_empty());
        assert_eq!(t.find_by_name("anywhere"), None);
    }
}
