use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{OrderMode, Question, QuestionBank, SessionConfig};

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    pub shuffled: bool,
}

impl SessionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

/// Picks the questions for a session from a bank according to a `SessionConfig`.
pub struct SessionBuilder<'a> {
    bank: &'a QuestionBank,
    config: SessionConfig,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a session plan.
    ///
    /// - The bank is copied, never reordered in place.
    /// - `OrderMode::Random` applies a uniform shuffle to the whole copy.
    /// - The count limit is applied after shuffling, so random mode draws a
    ///   random subset rather than a shuffled fixed prefix.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> SessionPlan {
        let mut questions = self.bank.questions().to_vec();

        let shuffled = self.config.mode == OrderMode::Random;
        if shuffled {
            questions.as_mut_slice().shuffle(rng);
        }

        questions.truncate(self.config.count.resolve(questions.len()));

        SessionPlan {
            questions,
            shuffled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionCount, QuestionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeSet, HashMap};

    fn build_bank(n: u64) -> QuestionBank {
        let questions = (1..=n)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    0,
                )
                .unwrap()
            })
            .collect();
        QuestionBank::new(u32::try_from(n).unwrap(), questions).unwrap()
    }

    fn ids(plan: &SessionPlan) -> Vec<u64> {
        plan.questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn sequential_all_keeps_bank_order() {
        let bank = build_bank(4);
        let plan = SessionBuilder::new(&bank).build(&mut StdRng::seed_from_u64(1));
        assert_eq!(ids(&plan), vec![1, 2, 3, 4]);
        assert!(!plan.shuffled);
    }

    #[test]
    fn sequential_limit_takes_prefix() {
        let bank = build_bank(5);
        let plan = SessionBuilder::new(&bank)
            .with_config(SessionConfig::first(2))
            .build(&mut StdRng::seed_from_u64(1));
        assert_eq!(ids(&plan), vec![1, 2]);
        assert_eq!(plan.total(), 2);
    }

    #[test]
    fn limit_larger_than_bank_is_clamped() {
        let bank = build_bank(3);
        let plan = SessionBuilder::new(&bank)
            .with_config(SessionConfig::new("10".parse().unwrap(), OrderMode::Random))
            .build(&mut StdRng::seed_from_u64(9));
        assert_eq!(plan.total(), 3);
        let unique: BTreeSet<_> = ids(&plan).into_iter().collect();
        assert_eq!(unique, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn random_mode_is_a_permutation_of_the_bank() {
        let bank = build_bank(8);
        let plan = SessionBuilder::new(&bank)
            .with_config(SessionConfig::new(QuestionCount::All, OrderMode::Random))
            .build(&mut StdRng::seed_from_u64(42));
        let mut sorted = ids(&plan);
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=8).collect::<Vec<_>>());
        assert!(plan.shuffled);
        // bank itself is untouched
        assert_eq!(bank.questions()[0].id(), QuestionId::new(1));
    }

    #[test]
    fn random_subset_reaches_every_combination_evenly() {
        const RUNS: usize = 2_000;
        let bank = build_bank(5);
        let config = SessionConfig::new("2".parse().unwrap(), OrderMode::Random);
        let mut rng = StdRng::seed_from_u64(0x5eed);

        let mut subsets: HashMap<BTreeSet<u64>, usize> = HashMap::new();
        let mut appearances: HashMap<u64, usize> = HashMap::new();
        for _ in 0..RUNS {
            let plan = SessionBuilder::new(&bank).with_config(config).build(&mut rng);
            assert_eq!(plan.total(), 2);
            let picked: BTreeSet<u64> = ids(&plan).into_iter().collect();
            assert_eq!(picked.len(), 2);
            for id in &picked {
                *appearances.entry(*id).or_default() += 1;
            }
            *subsets.entry(picked).or_default() += 1;
        }

        // C(5, 2) = 10 subsets, each expected ~200 times.
        assert_eq!(subsets.len(), 10);
        for (subset, hits) in &subsets {
            assert!((120..=280).contains(hits), "subset {subset:?} drawn {hits} times");
        }
        // Each question expected in 2/5 of the runs (~800).
        for id in 1..=5_u64 {
            let hits = appearances[&id];
            assert!((680..=920).contains(&hits), "question {id} drawn {hits} times");
        }
    }
}
