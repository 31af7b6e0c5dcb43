//! Ordering of SRV candidates per RFC 2782.

use crate::SrvRecord;
use rand::Rng;

/// Orders SRV records for contact: ascending priority, and within each
/// priority a weighted random order.
///
/// Within a priority group the next record is drawn with probability
/// proportional to its weight. Zero-weight records are only drawn once every
/// non-zero weight in the group is used up, and are then drawn uniformly.
/// The output is always a permutation of the input, and is a pure function
/// of the input and the state of `rng`.
pub fn rank<R: Rng>(mut records: Vec<SrvRecord>, rng: &mut R) -> Vec<SrvRecord> {
    // Stable, so equal priorities keep transport order before shuffling
    records.sort_by_key(SrvRecord::priority);

    let mut ordered = Vec::with_capacity(records.len());
    let mut rest = records.into_iter().peekable();
    while let Some(first) = rest.next() {
        let priority = first.priority();
        let mut group = vec![first];
        while let Some(next) = rest.next_if(|r| r.priority() == priority) {
            group.push(next);
        }
        order_group(group, rng, &mut ordered);
    }
    ordered
}

/// Appends one equal-priority group to `out` in weighted random order.
fn order_group<R: Rng>(mut group: Vec<SrvRecord>, rng: &mut R, out: &mut Vec<SrvRecord>) {
    if group.len() == 1 {
        out.append(&mut group);
        return;
    }

    // Zero weights first, so their running sums never reach a draw of 1 or more
    group.sort_by_key(|r| r.weight() != 0);

    while !group.is_empty() {
        let total: u64 = group.iter().map(|r| u64::from(r.weight())).sum();
        let idx = if total == 0 {
            rng.random_range(0..group.len())
        } else {
            let target = rng.random_range(1..=total);
            let mut running = 0u64;
            group
                .iter()
                .position(|r| {
                    running += u64::from(r.weight());
                    running >= target
                })
                .unwrap_or(group.len() - 1)
        };
        out.push(group.remove(idx));
    }
}
