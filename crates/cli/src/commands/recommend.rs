//! Recommendation command.

use std::path::Path;

use yarnshop_core::display_price;
use yarnshop_core::recommend::{
    FacetSelection, PriceTier, Purpose, RecommendError, RecommendationCatalog,
    RecommendationOutcome, YarnColor, parse_facet,
};

use crate::error::CliError;

/// Facet flags as typed; blank or `any` means unspecified.
#[derive(Debug, Clone, Default)]
pub struct FacetArgs {
    pub purpose: Option<String>,
    pub color: Option<String>,
    pub price_range: Option<String>,
}

impl FacetArgs {
    /// Parse the flags into a selection.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Facet` for an unrecognised value.
    pub fn selection(&self) -> Result<FacetSelection, CliError> {
        Ok(FacetSelection {
            purpose: parse_facet::<Purpose>(self.purpose.as_deref().unwrap_or_default())?,
            color: parse_facet::<YarnColor>(self.color.as_deref().unwrap_or_default())?,
            price_tier: parse_facet::<PriceTier>(self.price_range.as_deref().unwrap_or_default())?,
        })
    }
}

/// The built-in catalog, or the JSON file at `path`.
fn load_catalog(path: Option<&Path>) -> Result<RecommendationCatalog, RecommendError> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            RecommendationCatalog::from_json(&json)
        }
        None => Ok(RecommendationCatalog::sample()),
    }
}

/// Filter the recommendation catalog by the given facets.
///
/// `catalog` replaces the built-in catalog with a JSON file. A catalog that
/// cannot be read or parsed is reported with the generic failure message.
///
/// # Errors
///
/// Returns `CliError::Facet` for an unrecognised facet value.
pub fn run(facets: &FacetArgs, catalog: Option<&Path>) -> Result<(), CliError> {
    let selection = facets.selection()?;
    let catalog = load_catalog(catalog);

    match RecommendationOutcome::evaluate(catalog.as_ref(), &selection) {
        RecommendationOutcome::Matches(entries) => {
            for entry in entries {
                println!("{}", entry.name);
                println!(
                    "  {} / {} / {}  {}  {:.1}/5",
                    entry.purpose,
                    entry.color,
                    entry.price_tier,
                    display_price(entry.price),
                    entry.rating.value(),
                );
                println!("  {:.0}% match: {}", entry.confidence * 100.0, entry.reason);
            }
        }
        RecommendationOutcome::NoMatches => {
            println!("No recommendations match your preferences. Try widening your choices.");
        }
        RecommendationOutcome::Failed(message) => println!("{message}"),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_args_parse() {
        let args = FacetArgs {
            purpose: Some("knitting".to_owned()),
            color: Some("any".to_owned()),
            price_range: Some("mid-range".to_owned()),
        };
        let selection = args.selection().unwrap();
        assert_eq!(selection.purpose, Some(Purpose::Knitting));
        assert_eq!(selection.color, None);
        assert_eq!(selection.price_tier, Some(PriceTier::MidRange));

        assert_eq!(FacetArgs::default().selection().unwrap(), FacetSelection::default());

        let args = FacetArgs {
            color: Some("purple".to_owned()),
            ..FacetArgs::default()
        };
        assert!(matches!(args.selection(), Err(CliError::Facet(_))));
    }

    #[test]
    fn test_unreadable_catalog_is_a_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("catalog.json");

        let catalog = load_catalog(Some(&missing));
        assert!(matches!(catalog, Err(RecommendError::Read(_))));
        assert!(matches!(
            RecommendationOutcome::evaluate(catalog.as_ref(), &FacetSelection::default()),
            RecommendationOutcome::Failed(_)
        ));
        run(&FacetArgs::default(), Some(&missing)).unwrap();
    }

    #[test]
    fn test_catalog_file_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[]").unwrap();

        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(
            RecommendationOutcome::evaluate(Ok(&catalog), &FacetSelection::default()),
            RecommendationOutcome::NoMatches
        );
        assert!(load_catalog(None).is_ok());
    }
}
