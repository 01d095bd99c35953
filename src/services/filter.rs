use crate::models::{Filter, NftItem};

/// Applies the price ordering selected in the filter dropdown.
///
/// Sorting is stable, so items with equal prices keep their contract order.
pub fn filter_items(items: &[NftItem], filter: Filter) -> Vec<NftItem> {
    let mut filtered = items.to_vec();
    match filter {
        Filter::All => {}
        Filter::LowToHigh => filtered.sort_by(|a, b| a.price_wei.cmp(&b.price_wei)),
        Filter::HighToLow => filtered.sort_by(|a, b| b.price_wei.cmp(&a.price_wei)),
    }
    filtered
}
