//! Grouping of possible characters into chains.
//!
//! The same clustering runs over the whole scene (to find plates) and inside
//! each plate crop (to find its characters). It is a greedy, order-sensitive
//! partition: the first candidate whose compatible set is large enough
//! anchors a chain, those members are removed, and the search restarts on
//! the leftovers.

use std::cmp::Reverse;

use crate::config::ChainLimits;
use crate::models::CharacterCandidate;

/// A group of candidates built around one anchor's compatible set.
///
/// Members are indices into the candidate slice the chain was found in, in
/// discovery order: the anchor's matches in input order, then the anchor.
#[derive(Debug, Clone)]
pub struct CharacterChain<'a> {
    candidates: &'a [CharacterCandidate],
    members: Vec<usize>,
}

impl<'a> CharacterChain<'a> {
    pub fn new(candidates: &'a [CharacterCandidate], members: Vec<usize>) -> Self {
        Self { candidates, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.members
    }

    /// The anchor the chain was grown from.
    pub fn anchor(&self) -> Option<&'a CharacterCandidate> {
        self.members.last().map(|&i| &self.candidates[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CharacterCandidate> + '_ {
        let candidates = self.candidates;
        self.members.iter().map(move |&i| &candidates[i])
    }

    /// Members ordered by ascending centre x. Stable for equal centres.
    pub fn sorted_left_to_right(&self) -> Vec<&'a CharacterCandidate> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by_key(|c| c.center_x());
        sorted
    }

    /// Members ordered by descending centre x. This is the order characters
    /// are read in; the displayed text is reversed back.
    pub fn sorted_right_to_left(&self) -> Vec<&'a CharacterCandidate> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by_key(|c| Reverse(c.center_x()));
        sorted
    }
}

/// Euclidean distance between the integer centres.
pub fn distance_between(a: &CharacterCandidate, b: &CharacterCandidate) -> f64 {
    let dx = (a.center_x() - b.center_x()).abs() as f64;
    let dy = (a.center_y() - b.center_y()).abs() as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in degrees of the line joining both centres, folded into [0, 90].
/// A vertical (or zero-length) line counts as 90 degrees.
pub fn angle_between(a: &CharacterCandidate, b: &CharacterCandidate) -> f64 {
    let adjacent = (a.center_x() - b.center_x()).abs() as f64;
    let opposite = (a.center_y() - b.center_y()).abs() as f64;
    if adjacent == 0.0 {
        return 90.0;
    }
    (opposite / adjacent).atan().to_degrees()
}

/// Whether `other` looks like a neighbour of `anchor`. Every ratio is
/// relative to the anchor, so the relation is not symmetric.
pub fn compatible(
    anchor: &CharacterCandidate,
    other: &CharacterCandidate,
    limits: &ChainLimits,
) -> bool {
    let area = anchor.area() as f64;
    let width = anchor.width() as f64;
    let height = anchor.height() as f64;

    let change_in_area = (other.area() as f64 - area).abs() / area;
    let change_in_width = (other.width() as f64 - width).abs() / width;
    let change_in_height = (other.height() as f64 - height).abs() / height;

    distance_between(anchor, other) < anchor.diagonal() * limits.max_diag_multiple_away
        && angle_between(anchor, other) < limits.max_angle_deg
        && change_in_area < limits.max_change_in_area
        && change_in_width < limits.max_change_in_width
        && change_in_height < limits.max_change_in_height
}

/// Indices from `pool` (other than `anchor`) compatible with the anchor, in
/// pool order.
pub fn find_matches(
    candidates: &[CharacterCandidate],
    anchor: usize,
    pool: &[usize],
    limits: &ChainLimits,
) -> Vec<usize> {
    pool.iter()
        .copied()
        .filter(|&i| i != anchor && compatible(&candidates[anchor], &candidates[i], limits))
        .collect()
}

/// Partition `candidates` into chains of at least `limits.min_chain_len`
/// members. Candidates that fit no chain are dropped.
pub fn find_chains<'a>(
    candidates: &'a [CharacterCandidate],
    limits: &ChainLimits,
) -> Vec<CharacterChain<'a>> {
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let mut chains = Vec::new();

    while let Some(members) = next_chain(candidates, &remaining, limits) {
        remaining.retain(|i| !members.contains(i));
        log::trace!(
            "chain of {} found, {} candidates left",
            members.len(),
            remaining.len()
        );
        chains.push(CharacterChain::new(candidates, members));
    }

    chains
}

// First anchor in `pool` order whose chain is long enough.
fn next_chain(
    candidates: &[CharacterCandidate],
    pool: &[usize],
    limits: &ChainLimits,
) -> Option<Vec<usize>> {
    pool.iter().find_map(|&anchor| {
        let mut members = find_matches(candidates, anchor, pool, limits);
        members.push(anchor);
        (members.len() >= limits.min_chain_len).then_some(members)
    })
}

/// The longest chain; ties go to the earliest.
pub fn longest_chain<'c, 'a>(chains: &'c [CharacterChain<'a>]) -> Option<&'c CharacterChain<'a>> {
    chains
        .iter()
        .reduce(|best, chain| if chain.len() > best.len() { chain } else { best })
}
