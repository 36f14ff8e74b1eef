//! Recommendation filter.
//!
//! Recommendations come from a small curated catalog, not a model. A
//! [`FacetSelection`] narrows the catalog to entries matching every facet the
//! shopper specified; unspecified facets impose no constraint.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Rating, RecommendationId};

/// Message shown when recommendations cannot be produced.
pub const FAILURE_MESSAGE: &str = "Failed to generate recommendations. Please try again.";

/// Error returned when a facet value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {facet} {value:?}")]
pub struct UnknownFacet {
    pub facet: &'static str,
    pub value: String,
}

/// Declares a facet enum with display labels and case-insensitive parsing.
///
/// Labels are accepted as written ("Industrial Use") and in kebab-case
/// ("industrial-use").
macro_rules! facet {
    ($(#[$meta:meta])* $name:ident, $facet:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// All values in menu order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownFacet;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', " ");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().replace('-', " ").eq_ignore_ascii_case(&wanted))
                    .ok_or_else(|| UnknownFacet {
                        facet: $facet,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

facet!(
    /// What the yarn is for.
    Purpose, "purpose" {
        Knitting => "Knitting",
        Weaving => "Weaving",
        Crocheting => "Crocheting",
        IndustrialUse => "Industrial Use",
    }
);

facet!(
    /// Yarn color.
    YarnColor, "color" {
        Black => "Black",
        Red => "Red",
        White => "White",
        Grey => "Grey",
        Blue => "Blue",
    }
);

facet!(
    /// Price band.
    PriceTier, "price range" {
        Budget => "Budget",
        MidRange => "Mid-range",
        Premium => "Premium",
    }
);

/// Parse an optional facet from form input. Blank and `any` mean unspecified.
///
/// # Errors
///
/// Returns the facet's parse error for any other unrecognised value.
pub fn parse_facet<T: FromStr>(input: &str) -> Result<Option<T>, T::Err> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
        Ok(None)
    } else {
        trimmed.parse().map(Some)
    }
}

/// One entry of the recommendation catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: RecommendationId,
    pub name: String,
    pub purpose: Purpose,
    pub color: YarnColor,
    #[serde(rename = "priceRange")]
    pub price_tier: PriceTier,
    /// Match confidence, 0.0 to 1.0.
    pub confidence: f32,
    pub reason: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: String,
    pub rating: Rating,
}

/// Errors that can occur when loading a recommendation catalog.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// The catalog document could not be read.
    #[error("could not read recommendation catalog: {0}")]
    Read(#[from] std::io::Error),

    /// The catalog document could not be parsed.
    #[error("invalid recommendation catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two entries share an id.
    #[error("duplicate recommendation id {0}")]
    DuplicateId(RecommendationId),

    /// Confidence outside 0.0-1.0.
    #[error("recommendation {id} has confidence {confidence} outside 0.0-1.0")]
    ConfidenceOutOfRange {
        id: RecommendationId,
        confidence: f32,
    },
}

/// A validated recommendation catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCatalog {
    entries: Vec<Recommendation>,
}

impl RecommendationCatalog {
    /// Validate and wrap a list of entries.
    ///
    /// # Errors
    ///
    /// Returns `RecommendError` on a duplicate id or an out-of-range
    /// confidence. Ratings are range-checked by [`Rating`].
    pub fn from_entries(entries: Vec<Recommendation>) -> Result<Self, RecommendError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(RecommendError::DuplicateId(entry.id));
            }
            if !(0.0..=1.0).contains(&entry.confidence) {
                return Err(RecommendError::ConfidenceOutOfRange {
                    id: entry.id,
                    confidence: entry.confidence,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Load a catalog from a JSON array of entries.
    ///
    /// # Errors
    ///
    /// Returns `RecommendError` if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, RecommendError> {
        let entries: Vec<Recommendation> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// The built-in curated catalog.
    #[must_use]
    pub fn sample() -> Self {
        let entry = |id,
                     name: &str,
                     purpose,
                     color,
                     price_tier,
                     confidence,
                     reason: &str,
                     cents,
                     image: &str,
                     rating| Recommendation {
            id: RecommendationId::new(id),
            name: name.to_owned(),
            purpose,
            color,
            price_tier,
            confidence,
            reason: reason.to_owned(),
            price: Decimal::new(cents, 2),
            image: image.to_owned(),
            rating,
        };
        let rating = |tenths: u8| Rating::saturating(f32::from(tenths) / 10.0);

        Self {
            entries: vec![
                entry(
                    1,
                    "2/20(s) Premium Black Yarn",
                    Purpose::Knitting,
                    YarnColor::Black,
                    PriceTier::Budget,
                    0.95,
                    "Perfect match for your knitting needs with desired color and budget",
                    799,
                    "/images/20s_black.jpg",
                    rating(45),
                ),
                entry(
                    2,
                    "2/20(s) Enhanced Grey Yarn",
                    Purpose::Knitting,
                    YarnColor::Grey,
                    PriceTier::MidRange,
                    0.85,
                    "Alternative option with similar properties and great value",
                    1299,
                    "/images/20s_grey.jpg",
                    rating(43),
                ),
                entry(
                    3,
                    "2/20(s) White Yarn",
                    Purpose::Weaving,
                    YarnColor::White,
                    PriceTier::Budget,
                    0.82,
                    "Durable polyester yarn for versatile textile applications",
                    699,
                    "/images/20s_white.jpg",
                    rating(43),
                ),
                entry(
                    4,
                    "2/20(s) Grey Yarn",
                    Purpose::Crocheting,
                    YarnColor::Grey,
                    PriceTier::Premium,
                    0.88,
                    "Soft and sustainable cotton yarn for eco-friendly textiles",
                    1299,
                    "/images/20s_grey.jpg",
                    rating(48),
                ),
                entry(
                    5,
                    "2/20(s) Sky Blue Yarn",
                    Purpose::IndustrialUse,
                    YarnColor::Blue,
                    PriceTier::MidRange,
                    0.79,
                    "Natural bamboo yarn for breathable and comfortable fabrics",
                    899,
                    "/images/20s_sky_blue.jpg",
                    rating(47),
                ),
                entry(
                    6,
                    "Wool Yarn",
                    Purpose::Knitting,
                    YarnColor::Grey,
                    PriceTier::Premium,
                    0.91,
                    "Warm and cozy wool yarn for winter garments",
                    1499,
                    "/images/20s_steel_grey.jpg",
                    rating(49),
                ),
            ],
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }
}

/// The shopper's facet choices. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FacetSelection {
    pub purpose: Option<Purpose>,
    pub color: Option<YarnColor>,
    pub price_tier: Option<PriceTier>,
}

impl FacetSelection {
    /// Whether `entry` satisfies every specified facet.
    #[must_use]
    pub fn matches(&self, entry: &Recommendation) -> bool {
        self.purpose.is_none_or(|p| p == entry.purpose)
            && self.color.is_none_or(|c| c == entry.color)
            && self.price_tier.is_none_or(|t| t == entry.price_tier)
    }
}

/// Filter the catalog by `facets`, keeping catalog order.
#[must_use]
pub fn recommend<'a>(
    catalog: &'a RecommendationCatalog,
    facets: &FacetSelection,
) -> Vec<&'a Recommendation> {
    catalog
        .entries
        .iter()
        .filter(|entry| facets.matches(entry))
        .collect()
}

/// What the recommendation view shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    /// At least one entry matched.
    Matches(Vec<Recommendation>),
    /// The filter ran and nothing matched.
    NoMatches,
    /// The catalog could not be loaded.
    Failed(String),
}

impl RecommendationOutcome {
    /// Run the filter over a catalog load result.
    #[must_use]
    pub fn evaluate(
        catalog: Result<&RecommendationCatalog, &RecommendError>,
        facets: &FacetSelection,
    ) -> Self {
        match catalog {
            Ok(catalog) => {
                let matches: Vec<Recommendation> =
                    recommend(catalog, facets).into_iter().cloned().collect();
                if matches.is_empty() {
                    Self::NoMatches
                } else {
                    Self::Matches(matches)
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Recommendation catalog unavailable");
                Self::Failed(FAILURE_MESSAGE.to_owned())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(entries: &[&Recommendation]) -> Vec<i32> {
        entries.iter().map(|e| e.id.as_i32()).collect()
    }

    #[test]
    fn test_purpose_knitting() {
        let catalog = RecommendationCatalog::sample();
        let facets = FacetSelection {
            purpose: Some(Purpose::Knitting),
            ..FacetSelection::default()
        };
        assert_eq!(ids(&recommend(&catalog, &facets)), vec![1, 2, 6]);
    }

    #[test]
    fn test_no_facets_returns_whole_catalog() {
        let catalog = RecommendationCatalog::sample();
        assert_eq!(
            ids(&recommend(&catalog, &FacetSelection::default())),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_combined_facets() {
        let catalog = RecommendationCatalog::sample();
        let facets = FacetSelection {
            purpose: Some(Purpose::Knitting),
            color: Some(YarnColor::Grey),
            price_tier: Some(PriceTier::Premium),
        };
        assert_eq!(ids(&recommend(&catalog, &facets)), vec![6]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let catalog = RecommendationCatalog::sample();
        let facets = FacetSelection {
            purpose: Some(Purpose::Weaving),
            color: Some(YarnColor::Red),
            price_tier: None,
        };
        assert!(recommend(&catalog, &facets).is_empty());
        assert_eq!(
            RecommendationOutcome::evaluate(Ok(&catalog), &facets),
            RecommendationOutcome::NoMatches
        );
    }

    #[test]
    fn test_failed_outcome() {
        let err = RecommendationCatalog::from_json("{").unwrap_err();
        assert_eq!(
            RecommendationOutcome::evaluate(Err(&err), &FacetSelection::default()),
            RecommendationOutcome::Failed(FAILURE_MESSAGE.to_owned())
        );
    }

    #[test]
    fn test_parse_facets() {
        assert_eq!(parse_facet::<Purpose>(""), Ok(None));
        assert_eq!(parse_facet::<Purpose>("Any"), Ok(None));
        assert_eq!(
            parse_facet::<Purpose>("industrial use"),
            Ok(Some(Purpose::IndustrialUse))
        );
        assert_eq!(
            parse_facet::<Purpose>("industrial-use"),
            Ok(Some(Purpose::IndustrialUse))
        );
        assert_eq!(parse_facet::<PriceTier>("MID-RANGE"), Ok(Some(PriceTier::MidRange)));
        assert!(parse_facet::<YarnColor>("green").is_err());
    }

    #[test]
    fn test_json_shape() {
        let catalog = RecommendationCatalog::sample();
        let json = serde_json::to_value(&catalog.entries()[1]).unwrap();
        assert_eq!(json["priceRange"], "Mid-range");
        assert_eq!(json["purpose"], "Knitting");

        let five = serde_json::to_value(&catalog.entries()[4]).unwrap();
        assert_eq!(five["purpose"], "Industrial Use");
    }

    #[test]
    fn test_from_json_validates() {
        let catalog = RecommendationCatalog::sample();
        let json = serde_json::to_string(catalog.entries()).unwrap();
        assert_eq!(RecommendationCatalog::from_json(&json).unwrap().entries().len(), 6);

        let mut entries = catalog.entries().to_vec();
        entries[1].id = entries[0].id;
        assert!(matches!(
            RecommendationCatalog::from_entries(entries),
            Err(RecommendError::DuplicateId(_))
        ));

        let mut entries = catalog.entries().to_vec();
        entries[0].confidence = 1.5;
        assert!(matches!(
            RecommendationCatalog::from_entries(entries),
            Err(RecommendError::ConfidenceOutOfRange { .. })
        ));

        let bad_rating = json.replacen("\"rating\":4.5", "\"rating\":9.0", 1);
        assert!(RecommendationCatalog::from_json(&bad_rating).is_err());
    }
}
