//! Listing module - the property collection and its search engine

mod collection;
mod filters;
mod model;
mod search;

pub use collection::ListingCollection;
pub(crate) use filters::QUERY_VALUE;
pub use filters::{
    sanitize_decimal, validate_price_inputs, Beds, FilterError, FilterParams, Filters,
    PriceRange, DEFAULT_PRICE_CEILING,
};
pub use model::{format_usd, parse_price_text, Listing};
pub use search::search;
