use std::collections::BTreeMap;

use crate::models::{Attribute, PreferenceVector, RankedVariant, Variant, VariantSpecs};

/// Fields every ranked variant must have, whatever the preferences
pub const BASE_REQUIRED: [Attribute; 1] = [Attribute::ModelYear];

/// Upper bound of the matching scale
pub const MATCHING_SCALE: f64 = 100.0;

/// Observed min/max of one attribute
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Half the observed width; halving keeps it finite for any finite bounds
    fn half_span(&self) -> f64 {
        self.max / 2.0 - self.min / 2.0
    }
}

/// Running per-attribute min/max over the eligible variants of one ranking pass
#[derive(Debug, Clone, Default)]
pub struct AttributeRanges {
    ranges: BTreeMap<Attribute, Range>,
}

impl AttributeRanges {
    /// Collects ranges for `attributes` across `variants`
    pub fn collect<'a>(
        variants: impl IntoIterator<Item = &'a Variant>,
        attributes: &[Attribute],
    ) -> Self {
        let mut ranges = Self::default();
        for variant in variants {
            for attribute in attributes {
                if let Some(value) = variant.specs.get(*attribute) {
                    ranges.observe(*attribute, value);
                }
            }
        }
        ranges
    }

    pub fn observe(&mut self, attribute: Attribute, value: f64) {
        self.ranges
            .entry(attribute)
            .and_modify(|r| r.observe(value))
            .or_insert_with(|| Range::new(value));
    }

    /// `|value - target|` scaled by the attribute's observed span
    ///
    /// Zero when the span is zero or the attribute was never observed.
    pub fn normalized_distance(&self, attribute: Attribute, value: f64, target: f64) -> f64 {
        match self.ranges.get(&attribute) {
            Some(range) if range.half_span() > 0.0 => {
                (value / 2.0 - target / 2.0).abs() / range.half_span()
            }
            _ => 0.0,
        }
    }
}

/// True when the variant has the base fields and every attribute listed
pub fn is_eligible(variant: &Variant, attributes: &[Attribute]) -> bool {
    variant.specs.has_all(&BASE_REQUIRED) && variant.specs.has_all(attributes)
}

/// Sum of normalized per-attribute distances between a variant and the preferences
pub fn raw_distance(
    specs: &VariantSpecs,
    preferences: &PreferenceVector,
    ranges: &AttributeRanges,
) -> f64 {
    preferences
        .iter()
        .filter_map(|(attribute, target)| {
            specs
                .get(attribute)
                .map(|value| ranges.normalized_distance(attribute, value, target))
        })
        .sum()
}

/// Ranks `variants` by closeness to `preferences`
///
/// Only the attributes named in `preferences` contribute to the distance. A
/// variant is skipped when it lacks a base field, one of `required`, or one of
/// the preference attributes.
///
/// The total distances are rescaled to `[0, 100]` using the smallest and
/// largest distance of the pass, so the closest variant scores 0 and the
/// farthest 100. When all distances are equal every variant scores 0. The
/// result is sorted by ascending `matching`, ties by variant id.
pub fn rank(
    variants: Vec<Variant>,
    preferences: &PreferenceVector,
    required: &[Attribute],
) -> Vec<RankedVariant> {
    let pool_size = variants.len();

    // 1. Keep variants that carry everything the pass needs
    let mut needed: Vec<Attribute> = required.to_vec();
    needed.extend(preferences.attributes().copied());
    needed.sort();
    needed.dedup();

    let eligible: Vec<Variant> = variants
        .into_iter()
        .filter(|v| is_eligible(v, &needed))
        .collect();

    if eligible.is_empty() {
        tracing::debug!(pool_size, "No eligible variants to rank");
        return Vec::new();
    }

    // 2. Per-attribute min/max across the eligible variants
    let attributes: Vec<Attribute> = preferences.attributes().copied().collect();
    let ranges = AttributeRanges::collect(&eligible, &attributes);

    // 3. Total distance per variant, tracking the global min/max.
    // A distance that overflowed or went NaN counts as the farthest possible.
    let distances: Vec<f64> = eligible
        .iter()
        .map(|v| raw_distance(&v.specs, preferences, &ranges))
        .map(|d| if d.is_finite() { d } else { f64::MAX })
        .collect();

    let min_distance = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max_distance = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max_distance - min_distance;

    // 4. Rescale to the matching range; no division when every distance is equal
    let mut scored: Vec<(f64, Variant)> = distances
        .into_iter()
        .zip(eligible)
        .map(|(distance, variant)| {
            let shifted = distance - min_distance;
            let matching = if span > 0.0 {
                shifted / span * MATCHING_SCALE
            } else {
                0.0
            };
            (matching.clamp(0.0, MATCHING_SCALE), variant)
        })
        .collect();

    scored.sort_by(|(a, va), (b, vb)| a.total_cmp(b).then_with(|| va.id.cmp(&vb.id)));

    tracing::debug!(
        pool_size,
        eligible = scored.len(),
        attributes = ?attributes,
        "Ranked variants"
    );

    scored
        .into_iter()
        .map(|(matching, variant)| RankedVariant {
            variant,
            matching: Some(matching),
        })
        .collect()
}
