//! Weight-proportional random selection.
use crate::data::Entry;
use rand::Rng;

/// Sum of candidate weights.
#[must_use]
pub fn total_weight(candidates: &[&Entry]) -> f64 {
    candidates.iter().map(|entry| entry.weight).sum()
}

/// Pick one candidate with probability proportional to its weight.
///
/// Returns `None` only for an empty slice. If float drift leaves the roll
/// positive after the last candidate, the last candidate wins.
///
/// Weights whose sum overflows are rescaled by the largest weight first, so
/// the draw stays proportional.
pub fn pick<'a, R: Rng + ?Sized>(candidates: &[&'a Entry], rng: &mut R) -> Option<&'a Entry> {
    let last = candidates.last().copied()?;
    let mut scale = 1.0;
    let mut total = total_weight(candidates);
    if !total.is_finite() {
        scale = candidates
            .iter()
            .map(|entry| entry.weight)
            .fold(f64::MIN_POSITIVE, f64::max);
        total = candidates.iter().map(|entry| entry.weight / scale).sum();
    }
    let mut roll = rng.r#gen::<f64>() * total;
    for &entry in candidates {
        roll -= entry.weight / scale;
        if roll <= 0.0 {
            return Some(entry);
        }
    }
    Some(last)
}
