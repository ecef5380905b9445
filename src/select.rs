//! Weighted random choice of the next card to study.

use rand::Rng;

use crate::model::Card;

/// Cards of `tab_id` that take part in study, in stored order.
pub fn eligible<'a>(cards: &'a [Card], tab_id: &str) -> Vec<&'a Card> {
    cards
        .iter()
        .filter(|c| c.tab_id == tab_id && !c.is_archived)
        .collect()
}

/// Picks a live card of `tab_id` with probability proportional to its weight.
///
/// Each call is independent, so the same card may come up twice in a row.
/// Ties resolve to the first card in stored order.
pub fn select_next<'a, R: Rng>(
    cards: &'a [Card],
    tab_id: &str,
    rng: &mut R,
) -> Option<&'a Card> {
    let pool = eligible(cards, tab_id);
    let first = *pool.first()?;
    let total: f64 = pool.iter().map(|c| f64::from(c.weight.max(1))).sum();
    let mut r = rng.random::<f64>() * total;
    for &card in &pool {
        r -= f64::from(card.weight.max(1));
        if r <= 0.0 {
            return Some(card);
        }
    }
    // Only reachable through rounding at the upper boundary.
    Some(first)
}
