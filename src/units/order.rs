use crate::config::UnitOrder;
use crate::model::Unit;

/// Turns units scraped in page order into oldest-first order
pub fn to_oldest_first(mut units: Vec<Unit>, page_order: UnitOrder) -> Vec<Unit> {
    if page_order == UnitOrder::NewestFirst {
        units.reverse();
    }
    units
}

/// Stable ascending sort by ordinal; ties keep their relative order
pub fn sort_canonical(units: &mut [Unit]) {
    units.sort_by(|a, b| a.ordinal.total_cmp(&b.ordinal));
}

/// Sorts into canonical order, then reverses for newest-first output
///
/// The reversal is always the last step so canonical storage order stays
/// oldest-first regardless of what the caller asked for.
pub fn arrange(mut units: Vec<Unit>, order: UnitOrder) -> Vec<Unit> {
    sort_canonical(&mut units);
    if order == UnitOrder::NewestFirst {
        units.reverse();
    }
    units
}

/// Sorts each group canonically and concatenates them in group order
///
/// Ordinals are only compared within a group. The newest-first reversal is
/// applied to the merged list, so the last unit of the last group comes
/// first.
pub fn merge_groups(groups: Vec<Vec<Unit>>, order: UnitOrder) -> Vec<Unit> {
    let mut merged: Vec<Unit> = groups
        .into_iter()
        .flat_map(|group| arrange(group, UnitOrder::OldestFirst))
        .collect();
    if order == UnitOrder::NewestFirst {
        merged.reverse();
    }
    merged
}
