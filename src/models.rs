use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Placeholder for names and capitals the upstream record does not carry.
pub const UNKNOWN: &str = "Unknown";

/// Raw country object as served by the REST Countries v3.1 payload.
///
/// Every field is optional or defaulted: upstream omits attributes freely,
/// especially when a `fields` filter is applied, and a partial record must
/// still deserialize. Numeric fields accept either a JSON number or a
/// numeric string; anything else becomes `None` rather than failing the
/// record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCountry {
    #[serde(default)]
    pub name: RawName,
    #[serde(default, deserialize_with = "de_opt_u64_lenient")]
    pub population: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_f64_lenient")]
    pub area: Option<f64>,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub flags: RawFlags,
    /// Currency code -> metadata object; only the codes are kept.
    #[serde(default)]
    pub currencies: serde_json::Map<String, Value>,
    /// Language code -> display name, in upstream order.
    #[serde(default)]
    pub languages: serde_json::Map<String, Value>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub borders: Vec<String>,
    #[serde(default)]
    pub timezones: Vec<String>,
}

/// Common/official name pair nested under `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawName {
    #[serde(default)]
    pub common: Option<String>,
    #[serde(default)]
    pub official: Option<String>,
}

/// Flag image URLs nested under `flags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFlags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
}

/// Serde helper: best-effort `u64` from a JSON number or numeric string.
///
/// Unparseable input (objects, fractional numbers, garbage strings) maps to
/// `None`, the missing sentinel, never to zero and never to an error.
fn de_opt_u64_lenient<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

/// Serde helper: best-effort finite `f64` from a JSON number or numeric string.
fn de_opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

/// Normalized country row used by this crate (one row = one country).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryRecord {
    /// Common name; the lookup key. `"Unknown"` when upstream has none.
    pub common_name: String,
    pub official_name: Option<String>,
    /// `None` when upstream omits the figure or it fails to parse.
    pub population: Option<u64>,
    pub area_km2: Option<f64>,
    /// First capital in upstream order, `"Unknown"` if absent.
    pub capital: String,
    pub flag_url: Option<String>,
    pub currency_codes: BTreeSet<String>,
    /// Language display names, in upstream order.
    pub language_names: Vec<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    /// ISO codes of bordering countries.
    pub borders: Vec<String>,
    pub timezones: Vec<String>,
}

impl From<RawCountry> for CountryRecord {
    fn from(r: RawCountry) -> Self {
        Self {
            common_name: r
                .name
                .common
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            official_name: r.name.official.filter(|s| !s.trim().is_empty()),
            population: r.population,
            area_km2: r.area,
            capital: r
                .capital
                .into_iter()
                .find(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            flag_url: r.flags.png.or(r.flags.svg).filter(|s| !s.trim().is_empty()),
            currency_codes: r.currencies.keys().cloned().collect(),
            language_names: r
                .languages
                .values()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            region: r.region.filter(|s| !s.trim().is_empty()),
            subregion: r.subregion.filter(|s| !s.trim().is_empty()),
            borders: r.borders,
            timezones: r.timezones,
        }
    }
}

impl CountryRecord {
    pub fn language_count(&self) -> usize {
        self.language_names.len()
    }

    pub fn currency_count(&self) -> usize {
        self.currency_codes.len()
    }

    /// The four numeric series a consumer charts for this country, paired
    /// with display labels. Missing numerics surface as `f64::NAN` so a
    /// renderer can skip them instead of plotting a fake zero.
    pub fn chart_metrics(&self) -> [(&'static str, f64); 4] {
        [
            (
                "Population",
                self.population.map(|p| p as f64).unwrap_or(f64::NAN),
            ),
            ("Area (km²)", self.area_km2.unwrap_or(f64::NAN)),
            ("Languages", self.language_count() as f64),
            ("Currencies", self.currency_count() as f64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawCountry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn population_accepts_number_or_string() {
        let r = raw(r#"{"population": 19000000}"#);
        assert_eq!(r.population, Some(19_000_000));
        let r = raw(r#"{"population": "19000000"}"#);
        assert_eq!(r.population, Some(19_000_000));
    }

    #[test]
    fn unparseable_numbers_become_missing_not_zero() {
        let r = raw(r#"{"population": "lots", "area": {"value": 1}}"#);
        assert_eq!(r.population, None);
        assert_eq!(r.area, None);
    }

    #[test]
    fn area_accepts_string_float() {
        let r = raw(r#"{"area": " 756102.4 "}"#);
        assert_eq!(r.area, Some(756_102.4));
    }

    #[test]
    fn record_defaults_for_empty_object() {
        let rec = CountryRecord::from(raw("{}"));
        assert_eq!(rec.common_name, UNKNOWN);
        assert_eq!(rec.capital, UNKNOWN);
        assert_eq!(rec.population, None);
        assert!(rec.currency_codes.is_empty());
        assert!(rec.language_names.is_empty());
    }

    #[test]
    fn flag_url_prefers_png_then_svg() {
        let rec = CountryRecord::from(raw(r#"{"flags":{"png":"p.png","svg":"s.svg"}}"#));
        assert_eq!(rec.flag_url.as_deref(), Some("p.png"));
        let rec = CountryRecord::from(raw(r#"{"flags":{"svg":"s.svg"}}"#));
        assert_eq!(rec.flag_url.as_deref(), Some("s.svg"));
    }

    #[test]
    fn blank_official_name_is_dropped() {
        let rec = CountryRecord::from(raw(r#"{"name":{"common":"Chile","official":"  "}}"#));
        assert_eq!(rec.common_name, "Chile");
        assert_eq!(rec.official_name, None);
    }

    #[test]
    fn chart_metrics_use_nan_for_missing() {
        let rec = CountryRecord::from(raw(r#"{"name":{"common":"X"},"population":10}"#));
        let metrics = rec.chart_metrics();
        assert_eq!(metrics[0], ("Population", 10.0));
        assert!(metrics[1].1.is_nan());
        assert_eq!(metrics[2].1, 0.0);
    }
}
