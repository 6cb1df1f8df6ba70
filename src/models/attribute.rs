use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr, sync::LazyLock};

/// Metric horsepower (CV) per kilowatt
const CV_PER_KW: f64 = 1.35962;

/// Largest absolute value any attribute may take
pub const MAX_ATTRIBUTE_MAGNITUDE: f64 = 1.0e9;

/// Ordinal list of motorcycle categories, lightest to heaviest use
pub const CATEGORIES: [&str; 16] = [
    "scooter",
    "moped",
    "minibike",
    "off-road",
    "enduro",
    "motocross",
    "trial",
    "supermoto",
    "naked",
    "custom",
    "cruiser",
    "classic",
    "sport",
    "sport-touring",
    "touring",
    "adventure",
];

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").expect("valid regex"));

static POWER_HP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:cv|bhp|hp|ps)\b").expect("valid regex")
});

static POWER_KW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*kw\b").expect("valid regex"));

/// Errors raised while turning scraped attribute names or values into numbers
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Invalid value for {attribute}: {value:?}")]
    InvalidValue { attribute: Attribute, value: String },

    #[error("Category index {0} is out of range")]
    CategoryOutOfRange(i64),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// A rankable vehicle attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Year,
    ModelYear,
    Displacement,
    Power,
    Weight,
    MaxSpeed,
    Valves,
    Price,
    Category,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Year,
        Attribute::ModelYear,
        Attribute::Displacement,
        Attribute::Power,
        Attribute::Weight,
        Attribute::MaxSpeed,
        Attribute::Valves,
        Attribute::Price,
        Attribute::Category,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Year => "year",
            Attribute::ModelYear => "model_year",
            Attribute::Displacement => "displacement",
            Attribute::Power => "power",
            Attribute::Weight => "weight",
            Attribute::MaxSpeed => "max_speed",
            Attribute::Valves => "valves",
            Attribute::Price => "price",
            Attribute::Category => "category",
        }
    }

    /// Parses a raw scraped or user-supplied value into a number
    ///
    /// - year, model_year and price must be plain numbers
    /// - displacement, weight, max_speed and valves take the leading numeric token
    /// - power is reported in CV; a kW figure is converted when no CV/HP figure is present
    /// - category accepts an index into [`CATEGORIES`] or one of its names
    pub fn parse_value(&self, raw: &str) -> Result<f64, AttributeError> {
        let value = raw.trim();
        let parsed = match self {
            Attribute::Year | Attribute::ModelYear | Attribute::Price => parse_number(value),
            Attribute::Displacement
            | Attribute::Weight
            | Attribute::MaxSpeed
            | Attribute::Valves => leading_number(value),
            Attribute::Power => parse_power(value),
            Attribute::Category => return parse_category(value),
        };

        parsed.ok_or_else(|| AttributeError::InvalidValue {
            attribute: *self,
            value: raw.to_string(),
        })
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Attribute {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(Attribute::Year),
            "model_year" => Ok(Attribute::ModelYear),
            "displacement" | "cubic" => Ok(Attribute::Displacement),
            "power" => Ok(Attribute::Power),
            "weight" => Ok(Attribute::Weight),
            "max_speed" => Ok(Attribute::MaxSpeed),
            "valves" => Ok(Attribute::Valves),
            "price" => Ok(Attribute::Price),
            "category" => Ok(Attribute::Category),
            _ => Err(AttributeError::UnknownAttribute(s.to_string())),
        }
    }
}

fn to_f64(token: &str) -> Option<f64> {
    token
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= MAX_ATTRIBUTE_MAGNITUDE)
}

fn parse_number(value: &str) -> Option<f64> {
    to_f64(value)
}

fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(value)
        .and_then(|caps| to_f64(&caps[1]))
}

fn parse_power(value: &str) -> Option<f64> {
    if let Some(caps) = POWER_HP.captures(value) {
        return to_f64(&caps[1]);
    }
    if let Some(caps) = POWER_KW.captures(value) {
        return to_f64(&caps[1])
            .map(|kw| kw * CV_PER_KW)
            .filter(|cv| cv.abs() <= MAX_ATTRIBUTE_MAGNITUDE);
    }
    leading_number(value)
}

fn parse_category(value: &str) -> Result<f64, AttributeError> {
    if let Ok(index) = value.parse::<i64>() {
        if index < 0 || index as usize >= CATEGORIES.len() {
            return Err(AttributeError::CategoryOutOfRange(index));
        }
        return Ok(index as f64);
    }

    let name = value.to_lowercase();
    CATEGORIES
        .iter()
        .position(|c| *c == name)
        .map(|i| i as f64)
        .ok_or_else(|| AttributeError::UnknownCategory(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_from_str() {
        assert_eq!("power".parse::<Attribute>(), Ok(Attribute::Power));
        assert_eq!("Model_Year".parse::<Attribute>(), Ok(Attribute::ModelYear));
        assert_eq!("cubic".parse::<Attribute>(), Ok(Attribute::Displacement));
    }

    #[test]
    fn test_unknown_attribute_is_an_error() {
        assert_eq!(
            "colour".parse::<Attribute>(),
            Err(AttributeError::UnknownAttribute("colour".to_string()))
        );
    }

    #[test]
    fn test_attribute_name_round_trips_through_from_str() {
        for attribute in Attribute::ALL {
            assert_eq!(attribute.name().parse::<Attribute>(), Ok(attribute));
        }
    }

    #[test]
    fn test_year_is_passed_through() {
        assert_eq!(Attribute::ModelYear.parse_value("2019"), Ok(2019.0));
        assert_eq!(Attribute::Price.parse_value(" 8999.5 "), Ok(8999.5));
    }

    #[test]
    fn test_out_of_range_magnitude_is_invalid() {
        assert!(matches!(
            Attribute::Year.parse_value("1.7e308"),
            Err(AttributeError::InvalidValue { attribute: Attribute::Year, .. })
        ));
        assert!(Attribute::Price.parse_value("-1e12").is_err());
        assert!(Attribute::Price.parse_value("inf").is_err());
        assert!(Attribute::Displacement.parse_value("99999999999 cc").is_err());
        assert_eq!(Attribute::Price.parse_value("1e9"), Ok(1.0e9));
    }

    #[test]
    fn test_year_rejects_units() {
        assert!(matches!(
            Attribute::Year.parse_value("2019 model"),
            Err(AttributeError::InvalidValue { attribute: Attribute::Year, .. })
        ));
    }

    #[test]
    fn test_leading_numeric_token() {
        assert_eq!(Attribute::Displacement.parse_value("599 cc"), Ok(599.0));
        assert_eq!(Attribute::Weight.parse_value("184,5 kg"), Ok(184.5));
        assert_eq!(Attribute::MaxSpeed.parse_value("250 km/h"), Ok(250.0));
        assert_eq!(Attribute::Valves.parse_value("16"), Ok(16.0));
    }

    #[test]
    fn test_measurement_without_number_is_invalid() {
        assert!(Attribute::Weight.parse_value("n/d").is_err());
        assert!(Attribute::Displacement.parse_value("").is_err());
    }

    #[test]
    fn test_power_in_cv() {
        assert_eq!(Attribute::Power.parse_value("120 CV @ 12000 rpm"), Ok(120.0));
        assert_eq!(Attribute::Power.parse_value("95hp"), Ok(95.0));
    }

    #[test]
    fn test_power_prefers_cv_over_kw() {
        assert_eq!(Attribute::Power.parse_value("88 kW (120 CV)"), Ok(120.0));
    }

    #[test]
    fn test_power_in_kw_is_converted() {
        let power = Attribute::Power.parse_value("50 kW").unwrap();
        assert!((power - 67.981).abs() < 1e-9);
    }

    #[test]
    fn test_power_without_unit() {
        assert_eq!(Attribute::Power.parse_value("80"), Ok(80.0));
    }

    #[test]
    fn test_category_by_name_and_index() {
        assert_eq!(Attribute::Category.parse_value("Naked"), Ok(8.0));
        assert_eq!(Attribute::Category.parse_value("sport-touring"), Ok(13.0));
        assert_eq!(Attribute::Category.parse_value("0"), Ok(0.0));
        assert_eq!(Attribute::Category.parse_value("15"), Ok(15.0));
    }

    #[test]
    fn test_category_bounds() {
        assert_eq!(
            Attribute::Category.parse_value("16"),
            Err(AttributeError::CategoryOutOfRange(16))
        );
        assert_eq!(
            Attribute::Category.parse_value("-1"),
            Err(AttributeError::CategoryOutOfRange(-1))
        );
    }

    #[test]
    fn test_unknown_category() {
        assert_eq!(
            Attribute::Category.parse_value("hoverbike"),
            Err(AttributeError::UnknownCategory("hoverbike".to_string()))
        );
    }
}
