use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Question;

/// Category id a quiz round uses to mean "any category".
pub const ALL_CATEGORIES: i64 = 0;

/// Picks one question uniformly at random among those not asked yet.
/// `None` when every candidate has already been asked.
pub fn pick_next_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question> {
    let remaining: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    remaining.choose(rng).cloned()
}
