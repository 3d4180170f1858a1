use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CURRENCY: &str = "COP";

/// A posting as handed over by one of the portal extractors, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default, alias = "salary")]
    pub salary_raw: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
}

impl RawPosting {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn with_salary(mut self, salary_raw: impl Into<String>) -> Self {
        self.salary_raw = salary_raw.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_contract_type(mut self, contract_type: impl Into<String>) -> Self {
        self.contract_type = Some(contract_type.into());
        self
    }

    /// First required field that is blank, if any.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title")
        } else if self.company.trim().is_empty() {
            Some("company")
        } else if self.location.trim().is_empty() {
            Some("location")
        } else {
            None
        }
    }
}

/// Normalized administrative zone of a posting.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub enum Zone {
    Municipality(String),
    RegionGeneral,
    BroaderRegion,
    #[default]
    Unspecified,
}

impl Zone {
    pub const REGION_GENERAL_LABEL: &'static str = "Urabá (General)";
    pub const BROADER_REGION_LABEL: &'static str = "Antioquia (Other)";
    pub const UNSPECIFIED_LABEL: &'static str = "Sin especificar";

    pub fn label(&self) -> &str {
        match self {
            Zone::Municipality(name) => name,
            Zone::RegionGeneral => Self::REGION_GENERAL_LABEL,
            Zone::BroaderRegion => Self::BROADER_REGION_LABEL,
            Zone::Unspecified => Self::UNSPECIFIED_LABEL,
        }
    }

    /// True for a municipality or the generic regional bucket.
    pub fn is_target_region(&self) -> bool {
        matches!(self, Zone::Municipality(_) | Zone::RegionGeneral)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Zone {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Ok(match trimmed {
            "" | Zone::UNSPECIFIED_LABEL => Zone::Unspecified,
            Zone::REGION_GENERAL_LABEL => Zone::RegionGeneral,
            Zone::BROADER_REGION_LABEL => Zone::BroaderRegion,
            name => Zone::Municipality(name.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ContractType {
    #[serde(rename = "temporal")]
    Temporal,
    #[serde(rename = "permanente")]
    Permanent,
    #[default]
    #[serde(rename = "sin especificar")]
    Unspecified,
}

impl ContractType {
    pub fn label(self) -> &'static str {
        match self {
            ContractType::Temporal => "temporal",
            ContractType::Permanent => "permanente",
            ContractType::Unspecified => "sin especificar",
        }
    }

    pub fn is_temporal(self) -> bool {
        self == ContractType::Temporal
    }

    /// Parses a category an upstream source already attached to its record.
    ///
    /// Returns `None` for blank, unknown or "unspecified" values so the
    /// classifier runs for them.
    pub fn from_preset(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "temporal" | "short-term" | "short_term" => Some(ContractType::Temporal),
            "permanente" | "permanent" => Some(ContractType::Permanent),
            _ => None,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parsed compensation range. Always ordered: `min() <= max()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryBounds {
    min: f64,
    max: f64,
}

impl SalaryBounds {
    pub fn new(first: f64, second: f64) -> Self {
        if first <= second {
            Self { min: first, max: second }
        } else {
            Self { min: second, max: first }
        }
    }

    pub fn single(value: f64) -> Self {
        Self { min: value, max: value }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A fully enriched posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PostingRecord", from = "PostingRecord")]
pub struct Posting {
    pub posting_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub zone: Zone,
    pub salary_raw: String,
    pub salary: Option<SalaryBounds>,
    pub salary_currency: String,
    pub contract_type: ContractType,
    pub benefits: BTreeSet<String>,
    pub description: String,
    pub url: String,
    pub source: String,
    pub date_posted: Option<String>,
    pub relevance_score: f64,
    pub scraped_at: DateTime<Utc>,
}

impl Posting {
    pub fn is_temporal(&self) -> bool {
        self.contract_type.is_temporal()
    }

    pub fn salary_min(&self) -> Option<f64> {
        self.salary.map(|bounds| bounds.min())
    }

    pub fn salary_max(&self) -> Option<f64> {
        self.salary.map(|bounds| bounds.max())
    }
}

/// Flat archival shape of a [`Posting`]: strings, numbers and one nullable salary pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingRecord {
    #[serde(default)]
    pub posting_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub zone: Zone,
    #[serde(default)]
    pub salary_raw: String,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default = "default_currency")]
    pub salary_currency: String,
    #[serde(default)]
    pub contract_type: ContractType,
    #[serde(default)]
    pub is_temporal: bool,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default = "Utc::now")]
    pub scraped_at: DateTime<Utc>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl From<Posting> for PostingRecord {
    fn from(value: Posting) -> Self {
        Self {
            is_temporal: value.is_temporal(),
            salary_min: value.salary_min(),
            salary_max: value.salary_max(),
            posting_id: value.posting_id,
            title: value.title,
            company: value.company,
            location: value.location,
            zone: value.zone,
            salary_raw: value.salary_raw,
            salary_currency: value.salary_currency,
            contract_type: value.contract_type,
            benefits: value.benefits.into_iter().collect(),
            description: value.description,
            url: value.url,
            source: value.source,
            date_posted: value.date_posted,
            relevance_score: value.relevance_score,
            scraped_at: value.scraped_at,
        }
    }
}

impl From<PostingRecord> for Posting {
    fn from(value: PostingRecord) -> Self {
        let salary = match (value.salary_min, value.salary_max) {
            (Some(min), Some(max)) => Some(SalaryBounds::new(min, max)),
            (Some(single), None) | (None, Some(single)) => Some(SalaryBounds::single(single)),
            (None, None) => None,
        };

        Self {
            posting_id: value.posting_id,
            title: value.title,
            company: value.company,
            location: value.location,
            zone: value.zone,
            salary_raw: value.salary_raw,
            salary,
            salary_currency: value.salary_currency,
            contract_type: value.contract_type,
            benefits: value.benefits.into_iter().collect(),
            description: value.description,
            url: value.url,
            source: value.source,
            date_posted: value.date_posted,
            relevance_score: value.relevance_score.clamp(0.0, 1.0),
            scraped_at: value.scraped_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_bounds_are_always_ordered() {
        let bounds = SalaryBounds::new(2_500_000.0, 1_400_000.0);
        assert_eq!(bounds.min(), 1_400_000.0);
        assert_eq!(bounds.max(), 2_500_000.0);
        assert_eq!(bounds.midpoint(), 1_950_000.0);
    }

    #[test]
    fn zone_labels_round_trip_through_strings() {
        assert_eq!("Urabá (General)".parse::<Zone>(), Ok(Zone::RegionGeneral));
        assert_eq!("".parse::<Zone>(), Ok(Zone::Unspecified));
        assert_eq!(
            "Apartadó".parse::<Zone>(),
            Ok(Zone::Municipality("Apartadó".to_string()))
        );
        assert!(!Zone::BroaderRegion.is_target_region());
        assert!(Zone::RegionGeneral.is_target_region());
    }

    #[test]
    fn preset_contract_types_ignore_unknown_values() {
        assert_eq!(ContractType::from_preset(" Permanente "), Some(ContractType::Permanent));
        assert_eq!(ContractType::from_preset("TEMPORAL"), Some(ContractType::Temporal));
        assert_eq!(ContractType::from_preset("unknown"), None);
        assert_eq!(ContractType::from_preset("sin especificar"), None);
        assert_eq!(ContractType::from_preset(""), None);
    }

    #[test]
    fn raw_posting_reports_first_blank_required_field() {
        assert_eq!(RawPosting::new("Cajero", " ", "Turbo").missing_required_field(), Some("company"));
        assert_eq!(RawPosting::new("Cajero", "Banco", "Turbo").missing_required_field(), None);
    }

    #[test]
    fn serialized_posting_is_a_flat_record() -> Result<(), Box<dyn std::error::Error>> {
        let posting = Posting {
            posting_id: "abc".to_string(),
            title: "Cajero".to_string(),
            company: "Banco X".to_string(),
            location: "Turbo".to_string(),
            zone: Zone::Municipality("Turbo".to_string()),
            salary_raw: String::new(),
            salary: None,
            salary_currency: DEFAULT_CURRENCY.to_string(),
            contract_type: ContractType::Temporal,
            benefits: ["Pensión".to_string()].into_iter().collect(),
            description: String::new(),
            url: String::new(),
            source: "elempleo.com".to_string(),
            date_posted: None,
            relevance_score: 0.9,
            scraped_at: Utc::now(),
        };

        let value = serde_json::to_value(&posting)?;
        assert_eq!(value["zone"], "Turbo");
        assert_eq!(value["contract_type"], "temporal");
        assert_eq!(value["is_temporal"], true);
        assert!(value["salary_min"].is_null());
        assert!(value["salary_max"].is_null());
        assert!(value["date_posted"].is_null());
        assert_eq!(value["benefits"][0], "Pensión");
        Ok(())
    }

    #[test]
    fn a_single_archived_bound_becomes_both_bounds() -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{"title":"Cajero","company":"Banco","location":"Turbo","salary_min":1500000.0}"#;
        let posting: Posting = serde_json::from_str(json)?;
        assert_eq!(posting.salary_min(), Some(1_500_000.0));
        assert_eq!(posting.salary_max(), Some(1_500_000.0));
        assert_eq!(posting.zone, Zone::Unspecified);
        assert_eq!(posting.salary_currency, "COP");
        Ok(())
    }
}
