use serde::{Deserialize, Serialize};

pub mod attribute;
pub mod preferences;
pub mod swipe;
pub mod variant;

pub use attribute::{Attribute, AttributeError, CATEGORIES};
pub use preferences::PreferenceVector;
pub use swipe::Swipe;
pub use variant::{FetchState, NewVariant, ScrapedFields, Variant, VariantSpecs};

/// A variant annotated with its matching score
///
/// `matching` lies in `[0, 100]` where 0 is the closest match. It is `None` for
/// variants returned by random sampling rather than ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedVariant {
    #[serde(flatten)]
    pub variant: Variant,
    pub matching: Option<f64>,
}

impl RankedVariant {
    pub fn unranked(variant: Variant) -> Self {
        Self {
            variant,
            matching: None,
        }
    }
}

/// Optional `page`/`page_size` window over a listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Paging {
    /// `(limit, offset)`; paging only applies when a page size is given
    pub fn limit_offset(&self) -> Option<(usize, usize)> {
        self.page_size.map(|size| {
            let size = size as usize;
            (size, self.page.unwrap_or(0) as usize * size)
        })
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        match self.limit_offset() {
            Some((limit, offset)) => items.into_iter().skip(offset).take(limit).collect(),
            None => items,
        }
    }
}

/// Request to record a like or dislike
#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub variant_id: i64,
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_without_page_size_keeps_everything() {
        let paging = Paging {
            page: Some(3),
            page_size: None,
        };
        assert_eq!(paging.limit_offset(), None);
        assert_eq!(paging.apply(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_paging_first_page() {
        let paging = Paging {
            page: None,
            page_size: Some(2),
        };
        assert_eq!(paging.limit_offset(), Some((2, 0)));
        assert_eq!(paging.apply(vec![1, 2, 3]), vec![1, 2]);
    }

    #[test]
    fn test_paging_offset() {
        let paging = Paging {
            page: Some(1),
            page_size: Some(2),
        };
        assert_eq!(paging.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);
    }

    #[test]
    fn test_ranked_variant_serializes_matching_alongside_fields() {
        let variant = Variant::from_stored(
            1,
            None,
            "Duke 390".to_string(),
            ScrapedFields::default(),
            FetchState::Success,
            None,
            Default::default(),
        );
        let json = serde_json::to_value(RankedVariant {
            variant,
            matching: Some(12.5),
        })
        .unwrap();
        assert_eq!(json["name"], "Duke 390");
        assert_eq!(json["matching"], 12.5);
    }

    #[test]
    fn test_ranked_variant_survives_cache_encoding() {
        let variant = Variant::from_stored(
            7,
            Some("KTM".to_string()),
            "890 Adventure".to_string(),
            ScrapedFields {
                model_year: Some(2023),
                cubic: Some("889 cc".to_string()),
                power: Some("105 CV".to_string()),
                category: Some("adventure".to_string()),
                ..Default::default()
            },
            FetchState::Success,
            None,
            [("tank".to_string(), "20 l".to_string())].into_iter().collect(),
        );
        let ranked = vec![
            RankedVariant {
                variant: variant.clone(),
                matching: Some(0.0),
            },
            RankedVariant::unranked(variant),
        ];

        let encoded = serde_json::to_string(&ranked).unwrap();
        let decoded: Vec<RankedVariant> = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, ranked);
        assert_eq!(decoded[0].variant.specs.displacement, Some(889.0));
        assert_eq!(decoded[1].matching, None);
    }
}
