//! The in-memory listing collection

use std::fs;
use std::path::Path;

use super::{search, Filters, Listing};
use crate::Result;

/// Demo collection compiled into the binary
const SEED_LISTINGS: &str = include_str!("../../data/listings.json");

/// Immutable set of listings, fixed for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct ListingCollection {
    listings: Vec<Listing>,
}

impl ListingCollection {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    /// Load a JSON array of listings from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let collection = Self::from_json(&content)?;
        tracing::debug!(
            "Loaded {} listings from {:?}",
            collection.len(),
            path.as_ref()
        );
        Ok(collection)
    }

    /// The embedded demo collection
    pub fn seed() -> Result<Self> {
        Self::from_json(SEED_LISTINGS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let listings: Vec<Listing> = serde_json::from_str(json)?;
        Ok(Self::new(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    /// Listings matching `filters`, in collection order
    pub fn search(&self, filters: &Filters) -> Vec<&Listing> {
        search(&self.listings, filters)
    }

    /// Up to `limit` listings flagged as new, in collection order
    pub fn recent(&self, limit: usize) -> Vec<&Listing> {
        self.listings.iter().filter(|l| l.is_new).take(limit).collect()
    }
}
