//! Weight feedback from a recall attempt.

use crate::model::Card;

pub const CORRECT_STEP: u32 = 1;
pub const MISS_STEP: u32 = 2;

/// Adjusts the weight after a recall attempt: a miss raises it by two,
/// a correct answer lowers it by one but never below one.
pub fn rate(card: &mut Card, is_correct: bool) {
    card.weight = if is_correct {
        card.weight.saturating_sub(CORRECT_STEP).max(1)
    } else {
        card.weight.saturating_add(MISS_STEP)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_floors_at_one() {
        let mut c = Card::new("t", "Q", "A");
        c.weight = 1;
        for _ in 0..5 {
            rate(&mut c, true);
            assert_eq!(c.weight, 1);
        }
    }

    #[test]
    fn miss_adds_two_each_time() {
        let mut c = Card::new("t", "Q", "A");
        for expected in [5, 7, 9] {
            rate(&mut c, false);
            assert_eq!(c.weight, expected);
        }
    }

    #[test]
    fn correct_steps_down_by_one() {
        let mut c = Card::new("t", "Q", "A");
        rate(&mut c, true);
        assert_eq!(c.weight, 2);
        rate(&mut c, true);
        assert_eq!(c.weight, 1);
    }
}
