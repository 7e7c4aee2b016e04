//! Order assignment for new tasks within an epic.
//!
//! Order values are epic-scoped and never inspected across epics. The
//! caller performs a single max-order read against the store and derives
//! all values for a batch from that one base — never one read per item.

/// Order for a single new task given the current max order in its epic.
pub fn next_order(max_existing: Option<i64>) -> i64 {
    match max_existing {
        Some(max) => max + 1,
        None => 0,
    }
}

/// Consecutive orders for a bulk batch, in input order, starting at `base`.
pub fn assign_orders(base: i64, count: usize) -> Vec<i64> {
    (0..count as i64).map(|i| base + i).collect()
}
