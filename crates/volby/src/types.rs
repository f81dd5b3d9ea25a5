use std::fmt::Display;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::parser::ParseError;
use crate::urls::{district_code_of, region_code_of};

/// A district results page URL, e.g.
/// `https://www.volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=11&xnumnuts=6207`.
///
/// Obtained from [`crate::ElectionScraper::validate_district_url`], which checks it
/// against the districts the site actually publishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistrictUrl(String);

impl DistrictUrl {
    /// Wraps a URL without checking it against the published district list.
    pub fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for DistrictUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for DistrictUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Region and district codes embedded in a [`DistrictUrl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictCodes {
    pub region: String,
    pub district: String,
}

impl DistrictCodes {
    pub fn from_url(url: &DistrictUrl) -> Result<Self, ParseError> {
        Ok(Self {
            region: region_code_of(url.as_str())?.to_string(),
            district: district_code_of(url.as_str())?.to_string(),
        })
    }
}

impl Display for DistrictCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region {} / district {}", self.region, self.district)
    }
}

/// Results of a single municipality as an ordered column → value mapping.
///
/// Values are kept exactly as the site formats them (`"27 255"`), numbers are
/// never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MunicipalityRecord {
    entries: Vec<(String, String)>,
}

impl MunicipalityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`. An existing key keeps its position and gets the
    /// new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn code(&self) -> Option<&str> {
        self.get(crate::CODE_COLUMN)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(crate::NAME_COLUMN)
    }

    /// Party columns, i.e. everything after the fixed administrative columns.
    pub fn parties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, _)| !crate::FIXED_COLUMNS.contains(k))
    }
}

impl Serialize for MunicipalityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Display for MunicipalityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "┌─ {} ({})",
            self.name().unwrap_or("?"),
            self.code().unwrap_or("?")
        )?;
        for column in &crate::FIXED_COLUMNS[2..] {
            writeln!(f, "│  {}: {}", column, self.get(column).unwrap_or(""))?;
        }
        let parties: Vec<_> = self.parties().collect();
        writeln!(f, "└─ {} parties", parties.len())?;
        for (party, votes) in parties {
            writeln!(f, "   {:>8}  {}", votes, party)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_codes_from_url() {
        let url = DistrictUrl::new_unchecked(
            "https://www.volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=11&xnumnuts=6207",
        );
        let codes = DistrictCodes::from_url(&url).expect("Failed to resolve codes");

        assert_eq!(codes.region, "11");
        assert_eq!(codes.district, "6207");
    }

    #[test]
    fn test_record_keeps_insertion_order() {
        let mut record = MunicipalityRecord::new();
        record.insert("code", "593711");
        record.insert("name", "Znojmo");
        record.insert("ANO 2011", "5 023");
        record.insert("TOP 09", "507");

        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["code", "name", "ANO 2011", "TOP 09"]);
        assert_eq!(record.get("ANO 2011"), Some("5 023"));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_record_insert_existing_key_overwrites_in_place() {
        let mut record = MunicipalityRecord::new();
        record.insert("a", "1");
        record.insert("b", "2");
        record.insert("a", "3");

        let entries: Vec<_> = record.iter().collect();
        assert_eq!(entries, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_record_parties_skip_fixed_columns() {
        let mut record = MunicipalityRecord::new();
        for column in crate::FIXED_COLUMNS {
            record.insert(column, "x");
        }
        record.insert("Strana zelených", "175");

        let parties: Vec<_> = record.parties().collect();
        assert_eq!(parties, vec![("Strana zelených", "175")]);
    }

    #[test]
    fn test_record_serializes_as_ordered_object() {
        let mut record = MunicipalityRecord::new();
        record.insert("code", "593711");
        record.insert("name", "Znojmo");
        record.insert("ANO 2011", "5 023");

        let json = serde_json::to_string(&record).expect("Failed to serialize");
        assert_eq!(
            json,
            r#"{"code":"593711","name":"Znojmo","ANO 2011":"5 023"}"#
        );
    }
}
