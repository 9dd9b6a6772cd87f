//! Search listings from the command line

use anyhow::Result;

use crate::listing::{validate_price_inputs, Beds, Filters, Listing, PriceRange};
use crate::Site;

/// Raw search inputs, as typed on the command line
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub location: Option<String>,
    pub beds: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub types: Vec<String>,
}

impl SearchArgs {
    /// Build the filter set. A max below min is reported, then clamped up
    /// to min like the search form does.
    pub fn into_filters(self, ceiling: u64) -> Filters {
        let min = self.min_price.unwrap_or_default();
        let max = self.max_price.unwrap_or_default();
        if let Err(e) = validate_price_inputs(&min, &max) {
            tracing::warn!("{}; raising max price to {}", e, min.trim());
        }

        let price = if min.trim().is_empty() && max.trim().is_empty() {
            None
        } else {
            Some(PriceRange::from_inputs(&min, &max, ceiling))
        };

        Filters {
            location: self.location.unwrap_or_default(),
            beds: self.beds.as_deref().map(Beds::parse).unwrap_or_default(),
            price,
            types: self.types.into_iter().collect(),
        }
    }
}

/// Run a search against the site's listings and print the matches
pub fn run(site: &Site, args: SearchArgs) -> Result<()> {
    let ceiling = site.config.price_ceiling;
    let filters = args.into_filters(ceiling);
    let listings = site.listings()?;
    let results = listings.search(&filters);

    let chips = filters.chips(ceiling);
    if !chips.is_empty() {
        println!("Filters: {}", chips.join(" | "));
    }
    println!("Listings ({} of {}):", results.len(), listings.len());
    for listing in results {
        println!("  {}", summary_line(listing));
    }

    Ok(())
}

fn summary_line(listing: &Listing) -> String {
    format!(
        "{:>12}  {} bd / {} ba  {}, {}  [{}]{}",
        listing.formatted_price(),
        listing.beds,
        listing.baths,
        listing.neighborhood,
        listing.city,
        listing.kind,
        if listing.is_new { " *new*" } else { "" }
    )
}
