//! Listing search
//!
//! Every active predicate must hold (AND). Results keep the input order and
//! always borrow from the input slice, so a search can never produce a record
//! that is not in the collection.

use super::{Filters, Listing};

/// Apply `filters` to `listings`
pub fn search<'a>(listings: &'a [Listing], filters: &Filters) -> Vec<&'a Listing> {
    if filters.is_empty() {
        return listings.iter().collect();
    }

    let location = filters.location.to_lowercase();

    listings
        .iter()
        .filter(|l| matches_type(l, filters))
        .filter(|l| filters.beds.matches(l.beds))
        .filter(|l| filters.price.map_or(true, |range| range.contains(l.price)))
        .filter(|l| matches_location(l, &location))
        .collect()
}

fn matches_type(listing: &Listing, filters: &Filters) -> bool {
    filters.types.is_empty() || filters.types.contains(listing.kind.as_str())
}

/// `needle` must already be lowercased
fn matches_location(listing: &Listing, needle: &str) -> bool {
    needle.is_empty()
        || listing.city.to_lowercase().contains(needle)
        || listing.neighborhood.to_lowercase().contains(needle)
}
