use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::attribute::{Attribute, AttributeError};

/// Outcome of the last scrape of a variant's technical sheet
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchState {
    #[default]
    Pending,
    Success,
    Error,
}

impl FetchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchState::Pending => "pending",
            FetchState::Success => "success",
            FetchState::Error => "error",
        }
    }

    /// Maps the stored column value, treating anything unknown as pending
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("success") => FetchState::Success,
            Some("error") => FetchState::Error,
            _ => FetchState::Pending,
        }
    }
}

/// Attribute values as scraped, before numeric parsing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrapedFields {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub model_year: Option<i32>,
    #[serde(default)]
    pub cubic: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub max_speed: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub refrigeration: Option<String>,
    #[serde(default)]
    pub valves: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ScrapedFields {
    /// Raw value for each rankable attribute that was scraped
    fn raw_values(&self) -> Vec<(Attribute, String)> {
        let mut values = Vec::new();
        let mut push = |attribute: Attribute, value: Option<String>| {
            if let Some(value) = value {
                values.push((attribute, value));
            }
        };

        push(Attribute::Year, self.year.map(|v| v.to_string()));
        push(Attribute::ModelYear, self.model_year.map(|v| v.to_string()));
        push(Attribute::Displacement, self.cubic.clone());
        push(Attribute::Power, self.power.clone());
        push(Attribute::Weight, self.weight.clone());
        push(Attribute::MaxSpeed, self.max_speed.clone());
        push(Attribute::Valves, self.valves.clone());
        push(Attribute::Price, self.price.map(|v| v.to_string()));
        push(Attribute::Category, self.category.clone());
        values
    }

    /// Parses every scraped attribute, failing on the first bad value
    pub fn parse_specs(&self) -> Result<VariantSpecs, AttributeError> {
        let mut specs = VariantSpecs::default();
        for (attribute, raw) in self.raw_values() {
            specs.set(attribute, attribute.parse_value(&raw)?);
        }
        Ok(specs)
    }

    /// Parses what it can, dropping values that do not parse
    pub fn parse_specs_lenient(&self) -> VariantSpecs {
        let mut specs = VariantSpecs::default();
        for (attribute, raw) in self.raw_values() {
            match attribute.parse_value(&raw) {
                Ok(value) => specs.set(attribute, value),
                Err(e) => tracing::debug!(error = %e, "Dropping unparseable attribute"),
            }
        }
        specs
    }
}

/// Numeric attribute values used for ranking
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct VariantSpecs {
    pub year: Option<f64>,
    pub model_year: Option<f64>,
    pub displacement: Option<f64>,
    pub power: Option<f64>,
    pub weight: Option<f64>,
    pub max_speed: Option<f64>,
    pub valves: Option<f64>,
    pub price: Option<f64>,
    pub category: Option<f64>,
}

impl VariantSpecs {
    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Year => self.year,
            Attribute::ModelYear => self.model_year,
            Attribute::Displacement => self.displacement,
            Attribute::Power => self.power,
            Attribute::Weight => self.weight,
            Attribute::MaxSpeed => self.max_speed,
            Attribute::Valves => self.valves,
            Attribute::Price => self.price,
            Attribute::Category => self.category,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: f64) {
        let slot = match attribute {
            Attribute::Year => &mut self.year,
            Attribute::ModelYear => &mut self.model_year,
            Attribute::Displacement => &mut self.displacement,
            Attribute::Power => &mut self.power,
            Attribute::Weight => &mut self.weight,
            Attribute::MaxSpeed => &mut self.max_speed,
            Attribute::Valves => &mut self.valves,
            Attribute::Price => &mut self.price,
            Attribute::Category => &mut self.category,
        };
        *slot = Some(value);
    }

    /// True when every listed attribute has a value
    pub fn has_all<'a>(&self, attributes: impl IntoIterator<Item = &'a Attribute>) -> bool {
        attributes.into_iter().all(|a| self.get(*a).is_some())
    }
}

/// A catalog entry representing one vehicle configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub id: i64,
    pub brand: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub fields: ScrapedFields,
    pub fetch_state: FetchState,
    pub fetch_date: Option<DateTime<Utc>>,
    /// Scraped attributes with no dedicated column
    #[serde(default)]
    pub extra: HashMap<String, String>,
    pub specs: VariantSpecs,
}

impl Variant {
    /// Builds a variant from stored values, parsing specs leniently
    pub fn from_stored(
        id: i64,
        brand: Option<String>,
        name: String,
        fields: ScrapedFields,
        fetch_state: FetchState,
        fetch_date: Option<DateTime<Utc>>,
        extra: HashMap<String, String>,
    ) -> Self {
        let specs = fields.parse_specs_lenient();
        Self {
            id,
            brand,
            name,
            fields,
            fetch_state,
            fetch_date,
            extra,
            specs,
        }
    }
}

/// Request body for adding a variant to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariant {
    pub brand: Option<String>,
    pub name: String,
    #[serde(flatten)]
    pub fields: ScrapedFields,
    #[serde(default)]
    pub fetch_state: FetchState,
    #[serde(default)]
    pub fetch_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl NewVariant {
    /// Rejects empty names and attribute values that do not parse
    pub fn validate(&self) -> Result<VariantSpecs, crate::error::AppError> {
        if self.name.trim().is_empty() {
            return Err(crate::error::AppError::InvalidInput(
                "name: Must not be empty string".to_string(),
            ));
        }
        Ok(self.fields.parse_specs()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped() -> ScrapedFields {
        ScrapedFields {
            year: Some(2019),
            model_year: Some(2020),
            cubic: Some("689 cc".to_string()),
            power: Some("74 CV (54 kW)".to_string()),
            weight: Some("193 kg".to_string()),
            max_speed: Some("210 km/h".to_string()),
            valves: Some("8".to_string()),
            price: Some(7399.0),
            category: Some("naked".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_specs() {
        let specs = scraped().parse_specs().unwrap();
        assert_eq!(specs.year, Some(2019.0));
        assert_eq!(specs.model_year, Some(2020.0));
        assert_eq!(specs.displacement, Some(689.0));
        assert_eq!(specs.power, Some(74.0));
        assert_eq!(specs.weight, Some(193.0));
        assert_eq!(specs.max_speed, Some(210.0));
        assert_eq!(specs.valves, Some(8.0));
        assert_eq!(specs.price, Some(7399.0));
        assert_eq!(specs.category, Some(8.0));
    }

    #[test]
    fn test_parse_specs_fails_on_bad_value() {
        let fields = ScrapedFields {
            weight: Some("unknown".to_string()),
            ..scraped()
        };
        assert!(fields.parse_specs().is_err());
    }

    #[test]
    fn test_lenient_parse_drops_bad_value() {
        let fields = ScrapedFields {
            weight: Some("unknown".to_string()),
            ..scraped()
        };
        let specs = fields.parse_specs_lenient();
        assert_eq!(specs.weight, None);
        assert_eq!(specs.displacement, Some(689.0));
    }

    #[test]
    fn test_specs_get_set() {
        let mut specs = VariantSpecs::default();
        assert_eq!(specs.get(Attribute::Power), None);
        specs.set(Attribute::Power, 80.0);
        assert_eq!(specs.get(Attribute::Power), Some(80.0));
        assert!(specs.has_all(&[Attribute::Power]));
        assert!(!specs.has_all(&[Attribute::Power, Attribute::Weight]));
    }

    #[test]
    fn test_fetch_state_from_column() {
        assert_eq!(FetchState::from_column(Some("success")), FetchState::Success);
        assert_eq!(FetchState::from_column(Some("error")), FetchState::Error);
        assert_eq!(FetchState::from_column(None), FetchState::Pending);
        assert_eq!(FetchState::from_column(Some("???")), FetchState::Pending);
    }

    #[test]
    fn test_variant_serializes_flat_fields() {
        let variant = Variant::from_stored(
            7,
            Some("Yamaha".to_string()),
            "MT-07".to_string(),
            scraped(),
            FetchState::Success,
            None,
            HashMap::new(),
        );
        let json = serde_json::to_value(&variant).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["cubic"], "689 cc");
        assert_eq!(json["fetch_state"], "success");
        assert_eq!(json["specs"]["displacement"], 689.0);
    }

    #[test]
    fn test_new_variant_requires_name() {
        let new_variant = NewVariant {
            brand: None,
            name: "  ".to_string(),
            fields: scraped(),
            fetch_state: FetchState::Success,
            fetch_date: None,
            extra: HashMap::new(),
        };
        assert!(new_variant.validate().is_err());
    }
}
