use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::attribute::{Attribute, AttributeError};

/// Target value per attribute that catalog variants are ranked against
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreferenceVector(BTreeMap<Attribute, f64>);

impl PreferenceVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `attribute -> raw value` pairs, e.g. from query parameters
    ///
    /// Values go through the same rules as scraped attributes, so `power=88kW`
    /// and `category=naked` are accepted.
    pub fn from_raw(params: &HashMap<String, String>) -> Result<Self, AttributeError> {
        let mut preferences = Self::new();
        for (name, raw) in params {
            let attribute: Attribute = name.parse()?;
            preferences.insert(attribute, attribute.parse_value(raw)?);
        }
        Ok(preferences)
    }

    pub fn insert(&mut self, attribute: Attribute, value: f64) {
        self.0.insert(attribute, value);
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.0.get(&attribute).copied()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        self.0.iter().map(|(a, v)| (*a, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable textual form, used for cache keys
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(|(a, v)| format!("{}={}", a, v))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl FromIterator<(Attribute, f64)> for PreferenceVector {
    fn from_iter<I: IntoIterator<Item = (Attribute, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_raw() {
        let prefs = PreferenceVector::from_raw(&params(&[
            ("displacement", "600"),
            ("power", "80"),
            ("category", "sport"),
        ]))
        .unwrap();

        assert_eq!(prefs.len(), 3);
        assert_eq!(prefs.get(Attribute::Displacement), Some(600.0));
        assert_eq!(prefs.get(Attribute::Power), Some(80.0));
        assert_eq!(prefs.get(Attribute::Category), Some(12.0));
    }

    #[test]
    fn test_from_raw_rejects_unknown_attribute() {
        let result = PreferenceVector::from_raw(&params(&[("colour", "red")]));
        assert_eq!(
            result,
            Err(AttributeError::UnknownAttribute("colour".to_string()))
        );
    }

    #[test]
    fn test_from_raw_rejects_bad_value() {
        let result = PreferenceVector::from_raw(&params(&[("weight", "heavy")]));
        assert!(matches!(result, Err(AttributeError::InvalidValue { .. })));
    }

    #[test]
    fn test_canonical_is_ordered() {
        let prefs: PreferenceVector = [(Attribute::Power, 80.0), (Attribute::Displacement, 600.0)]
            .into_iter()
            .collect();
        assert_eq!(prefs.canonical(), "displacement=600;power=80");
    }
}
