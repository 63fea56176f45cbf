//! Read-only catalog of named sites loaded from a tab-separated file.
//!
//! The loader normalises loosely written source data (RT60 ranges, free-form
//! dimension text, `Region / Site` labels) into the single shape the core
//! expects. It never changes after loading.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

const DEFAULT_RT60: f64 = 3.0;
const DEFAULT_DIMS: [f64; 3] = [10.0, 10.0, 10.0];
const UNKNOWN_REGION: &str = "Unknown";

/// Header names accepted for the combined region/site column.
const SITE_COLUMNS: [&str; 2] = ["Region/Site", "Country/Site"];
const STATUS_COLUMN: &str = "Status";
const RT60_COLUMN: &str = "Estimated RT60 (s)";
const DIMS_COLUMN: &str = "Dimensions (m, approx. LxWxH)";
const GEOMETRY_COLUMN: &str = "Sacred Geometry Notes";
const METHOD_COLUMN: &str = "Simulation Method";
const SOURCES_COLUMN: &str = "Notes/Sources";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub name: String,
    pub region: String,
    pub status: String,
    pub rt60: f64,
    pub dims: [f64; 3],
    pub geometry: String,
    pub sim_method: String,
    pub sources: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sites: Vec<Site>,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse catalog '{}'", path.display()))
    }

    pub fn parse(tsv: &str) -> Result<Self> {
        let mut lines = tsv.lines().filter(|l| !l.trim().is_empty());
        let Some(header) = lines.next() else {
            bail!("catalog is empty");
        };
        let header: Vec<&str> = header.split('\t').map(str::trim).collect();
        let column = |name: &str| header.iter().position(|h| *h == name);
        let Some(site_col) = SITE_COLUMNS.iter().find_map(|&name| column(name)) else {
            bail!("catalog header has no {} column", SITE_COLUMNS.join(" or "));
        };
        let status_col = column(STATUS_COLUMN);
        let rt60_col = column(RT60_COLUMN);
        let dims_col = column(DIMS_COLUMN);
        let geometry_col = column(GEOMETRY_COLUMN);
        let method_col = column(METHOD_COLUMN);
        let sources_col = column(SOURCES_COLUMN);

        let mut catalog = Catalog::default();
        for line in lines {
            let cols: Vec<&str> = line.split('\t').collect();
            let field = |idx: Option<usize>| {
                idx.and_then(|i| cols.get(i))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };
            let (region, name) = parse_region_and_name(&field(Some(site_col)));
            if catalog.get(&name).is_some() {
                warn!(site = %name, "duplicate catalog entry ignored");
                continue;
            }
            catalog.sites.push(Site {
                rt60: parse_rt60(&field(rt60_col)),
                dims: parse_dims(&field(dims_col)),
                status: field(status_col),
                geometry: field(geometry_col),
                sim_method: field(method_col),
                sources: field(sources_col),
                region,
                name,
            });
        }
        debug!(sites = catalog.sites.len(), "loaded site catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Site> {
        let key = normalize(name);
        self.sites.iter().find(|s| s.name == key)
    }

    /// Site names grouped by region, both levels sorted.
    pub fn by_region(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for site in &self.sites {
            map.entry(site.region.as_str()).or_default().push(site.name.as_str());
        }
        for names in map.values_mut() {
            names.sort_unstable();
        }
        map
    }

    /// Largest single dimension across every site.
    pub fn max_dimension(&self) -> Option<f64> {
        self.sites
            .iter()
            .flat_map(|s| s.dims)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
    }
}

/// Replace typographic apostrophes and trim.
fn normalize(s: &str) -> String {
    s.replace(['\u{2019}', '\u{2018}'], "'").trim().to_string()
}

/// Split `"Region / Site — Place"` into `(region, "Site — Place")`.
pub fn parse_region_and_name(s: &str) -> (String, String) {
    let s = normalize(s);
    match s.split_once(" / ") {
        Some((region, rest)) => (region.trim().to_string(), rest.trim().to_string()),
        None => (UNKNOWN_REGION.to_string(), s),
    }
}

/// A decimal number found in free text and the byte offset just past it.
struct NumberToken {
    value: f64,
    end: usize,
}

fn scan_numbers(s: &str) -> Vec<NumberToken> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if let Ok(value) = s[start..i].parse() {
            tokens.push(NumberToken { value, end: i });
        }
    }
    tokens
}

/// First number followed by `m` and one of `keywords`, e.g. `"31m diam"`.
fn number_with_unit(s: &str, keywords: &[&str]) -> Option<f64> {
    scan_numbers(s).into_iter().find_map(|tok| {
        let rest = s[tok.end..].trim_start().strip_prefix('m')?.trim_start();
        keywords
            .iter()
            .any(|k| rest.starts_with(k))
            .then_some(tok.value)
    })
}

/// RT60 text such as `"2-3"`, `"~4"` or `"≈1.5–2"`; ranges are averaged.
pub fn parse_rt60(s: &str) -> f64 {
    let s = s.replace(['~', '≈'], "").replace(['\u{2013}', '\u{2014}'], "-");
    let values: Vec<f64> = scan_numbers(&s).into_iter().map(|t| t.value).collect();
    if values.is_empty() {
        return DEFAULT_RT60;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Coerce free-form dimension text to `[L, W, H]` metres.
pub fn parse_dims(s: &str) -> [f64; 3] {
    if s.trim().is_empty() {
        return DEFAULT_DIMS;
    }
    let s = s.to_lowercase().replace('×', "x");

    let diameter = number_with_unit(&s, &["diam"]);
    let height = number_with_unit(&s, &["high", "height"]);
    if let (Some(d), Some(h)) = (diameter, height) {
        return [d, d, h];
    }
    if let Some(l) = number_with_unit(&s, &["long", "length"]) {
        return [l, 10.0, 5.0];
    }

    let values: Vec<f64> = scan_numbers(&s).into_iter().map(|t| t.value).collect();
    match values.as_slice() {
        [l, w, h, ..] => [*l, *w, *h],
        [l, w] => [*l, *w, l.min(*w)],
        [v] => [*v, *v, if *v > 6.0 { v / 2.0 } else { 5.0 }],
        [] => DEFAULT_DIMS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Region/Site\tStatus\tEstimated RT60 (s)\tDimensions (m, approx. LxWxH)\tSacred Geometry Notes\tSimulation Method\tNotes/Sources
Egypt / Great Pyramid, King\u{2019}s Chamber — Giza\tMeasured (public)\t2-3\t10.47 x 5.235 x 5.827\tGolden ratio.\tSynthetic decay.\tGranite.
Egypt / Great Pyramid, Grand Gallery — Giza\tMeasured (public)\t3-4\t46.68 x 2.09 x 8.68\tSlope.\tImage-source.\tCorridor.
India / Konark Sun Temple — Odisha\tModeled/Simulated\t4-6\t229 x 128 x 20 (base & hall)\tChariot.\tSynthetic.\tWind.
Egypt / Great Pyramid, King's Chamber — Giza\tDuplicate\t9\t1 x 1 x 1\t\t\t
";

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);

        let kings = catalog.get("Great Pyramid, King's Chamber — Giza").unwrap();
        assert_eq!(kings.region, "Egypt");
        assert_eq!(kings.rt60, 2.5);
        assert_eq!(kings.dims, [10.47, 5.235, 5.827]);
        assert_eq!(kings.status, "Measured (public)");

        // Lookup tolerates typographic apostrophes and padding.
        assert!(catalog.get("  Great Pyramid, King\u{2019}s Chamber — Giza ").is_some());
        assert_eq!(catalog.max_dimension(), Some(229.0));
    }

    #[test]
    fn test_by_region() {
        let catalog = Catalog::parse(SAMPLE).unwrap();
        let regions = catalog.by_region();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions["Egypt"].len(), 2);
        assert_eq!(regions["India"], vec!["Konark Sun Temple — Odisha"]);
    }

    #[test]
    fn test_country_header_alias() {
        let tsv = "Country/Site\tEstimated RT60 (s)\nMali / Great Mosque of Djenné — Djenné\t4-6\n";
        let catalog = Catalog::parse(tsv).unwrap();
        let site = catalog.get("Great Mosque of Djenné — Djenné").unwrap();
        assert_eq!(site.region, "Mali");
        assert_eq!(site.rt60, 5.0);
        assert_eq!(site.dims, [10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_missing_site_column_is_an_error() {
        assert!(Catalog::parse("Status\tOther\nx\ty\n").is_err());
        assert!(Catalog::parse("\n\n").is_err());
    }

    #[test]
    fn test_parse_rt60() {
        assert_eq!(parse_rt60("2-3"), 2.5);
        assert_eq!(parse_rt60("~4"), 4.0);
        assert_eq!(parse_rt60("1.5\u{2013}2.5"), 2.0);
        assert_eq!(parse_rt60(""), 3.0);
        assert_eq!(parse_rt60("long"), 3.0);
    }

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("10.47 x 5.235 x 5.827"), [10.47, 5.235, 5.827]);
        assert_eq!(parse_dims("57×50×48"), [57.0, 50.0, 48.0]);
        assert_eq!(parse_dims("Dome 31m diam, 55m high"), [31.0, 31.0, 55.0]);
        assert_eq!(parse_dims("205m long"), [205.0, 10.0, 5.0]);
        assert_eq!(parse_dims("60 x 30"), [60.0, 30.0, 30.0]);
        assert_eq!(parse_dims("20"), [20.0, 20.0, 10.0]);
        assert_eq!(parse_dims("5"), [5.0, 5.0, 5.0]);
        assert_eq!(parse_dims("overall"), [10.0, 10.0, 10.0]);
        assert_eq!(parse_dims(""), [10.0, 10.0, 10.0]);
    }

    #[test]
    fn test_parse_region_and_name() {
        assert_eq!(
            parse_region_and_name("Greece / Parthenon — Athens"),
            ("Greece".to_string(), "Parthenon — Athens".to_string())
        );
        assert_eq!(
            parse_region_and_name("Stonehenge"),
            ("Unknown".to_string(), "Stonehenge".to_string())
        );
    }
}
