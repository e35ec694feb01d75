//! @acp:module "Bucket Sampling"
//! @acp:summary "Uniform draws without replacement from a bucket"
//! @acp:domain selection
//! @acp:layer service

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::types::QuestionId;

/// Draw up to `quota` distinct ids from `candidates`.
/// Members of `preferred` are drawn before the rest.
pub fn sample_bucket<R: Rng + ?Sized>(
    candidates: &BTreeSet<QuestionId>,
    quota: usize,
    preferred: &BTreeSet<QuestionId>,
    rng: &mut R,
) -> Vec<QuestionId> {
    let (mut first, mut rest): (Vec<QuestionId>, Vec<QuestionId>) =
        candidates.iter().copied().partition(|id| preferred.contains(id));

    first.shuffle(rng);
    rest.shuffle(rng);

    first.into_iter().chain(rest).take(quota).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_respects_quota_and_uniqueness() {
        let candidates: BTreeSet<QuestionId> = (0..50).collect();
        let mut rng = StdRng::seed_from_u64(3);

        let drawn = sample_bucket(&candidates, 20, &BTreeSet::new(), &mut rng);

        assert_eq!(drawn.len(), 20);
        let unique: BTreeSet<QuestionId> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), 20);
        assert!(unique.is_subset(&candidates));
    }

    #[test]
    fn test_sample_caps_at_candidates() {
        let candidates: BTreeSet<QuestionId> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(3);

        let drawn = sample_bucket(&candidates, 20, &BTreeSet::new(), &mut rng);
        assert_eq!(drawn.len(), 5);
    }

    #[test]
    fn test_preferred_drawn_first() {
        let candidates: BTreeSet<QuestionId> = (0..50).collect();
        let preferred: BTreeSet<QuestionId> = BTreeSet::from([10, 20, 30]);
        let mut rng = StdRng::seed_from_u64(11);

        let drawn = sample_bucket(&candidates, 5, &preferred, &mut rng);

        let head: BTreeSet<QuestionId> = drawn[..3].iter().copied().collect();
        assert_eq!(head, preferred);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let candidates: BTreeSet<QuestionId> = (0..100).collect();

        let a = sample_bucket(&candidates, 10, &BTreeSet::new(), &mut StdRng::seed_from_u64(42));
        let b = sample_bucket(&candidates, 10, &BTreeSet::new(), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
