use crate::{
    models::{Attribute, PreferenceVector, Variant},
    services::ranking::is_eligible,
};

/// Derives an implicit preference vector from the variants a user liked
///
/// Each attribute's target is the arithmetic mean over the liked variants that
/// pass the ranking eligibility check for `attributes`. Returns `None` when no
/// liked variant is eligible, in which case there is nothing to rank against.
pub fn average_preferences(liked: &[Variant], attributes: &[Attribute]) -> Option<PreferenceVector> {
    let eligible: Vec<&Variant> = liked
        .iter()
        .filter(|v| is_eligible(v, attributes))
        .collect();

    if eligible.is_empty() {
        tracing::debug!(liked = liked.len(), "No eligible liked variants");
        return None;
    }

    let count = eligible.len() as f64;
    let preferences = attributes
        .iter()
        .map(|attribute| {
            let sum: f64 = eligible
                .iter()
                .filter_map(|v| v.specs.get(*attribute))
                .sum();
            (*attribute, sum / count)
        })
        .collect();

    Some(preferences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchState, ScrapedFields};
    use std::collections::HashMap;

    fn liked(id: i64, cubic: &str, power: Option<&str>) -> Variant {
        Variant::from_stored(
            id,
            None,
            format!("Liked {}", id),
            ScrapedFields {
                model_year: Some(2018 + id as i32),
                cubic: Some(cubic.to_string()),
                power: power.map(str::to_string),
                ..Default::default()
            },
            FetchState::Success,
            None,
            HashMap::new(),
        )
    }

    #[test]
    fn test_average_of_liked_variants() {
        let liked = vec![liked(1, "500 cc", Some("50 CV")), liked(2, "700 cc", Some("90 CV"))];

        let prefs =
            average_preferences(&liked, &[Attribute::Displacement, Attribute::Power]).unwrap();

        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs.get(Attribute::Displacement), Some(600.0));
        assert_eq!(prefs.get(Attribute::Power), Some(70.0));
    }

    #[test]
    fn test_ineligible_likes_are_ignored() {
        let liked = vec![liked(1, "500 cc", Some("50 CV")), liked(2, "900 cc", None)];

        let prefs =
            average_preferences(&liked, &[Attribute::Displacement, Attribute::Power]).unwrap();

        assert_eq!(prefs.get(Attribute::Displacement), Some(500.0));
    }

    #[test]
    fn test_model_year_is_averaged_when_requested() {
        let liked = vec![liked(1, "500 cc", None), liked(3, "700 cc", None)];

        let prefs = average_preferences(&liked, &[Attribute::ModelYear]).unwrap();

        assert_eq!(prefs.get(Attribute::ModelYear), Some(2020.0));
    }

    #[test]
    fn test_no_eligible_likes() {
        assert_eq!(average_preferences(&[], &[Attribute::Power]), None);

        let liked = vec![liked(1, "500 cc", None)];
        assert_eq!(average_preferences(&liked, &[Attribute::Power]), None);
    }
}
