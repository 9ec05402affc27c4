//! Match-set generation and covering.

use std::collections::BTreeSet;

use itertools::Itertools;
use log::trace;
use rand::Rng;

use super::{deletion::delete_from_population, Population};
use crate::{
    classifier::{Action, ActionSpace, Classifier, ClassifierSet, SharedClassifier},
    condition::Condition,
    prediction::random_action,
};

/// Collect the classifiers matching `input`, covering every action of the
/// action space on the way.
///
/// When some action has no matching classifier, a fresh point-interval
/// classifier proposing one of the missing actions is synthesised and the
/// scan restarts, so the returned match set always represents the whole
/// action space. Before each covering insertion the population is shrunk
/// until the numerosity cap leaves room for the classifiers still missing:
/// first by dropping every inexperienced classifier, then by roulette
/// deletion.
///
/// Returns the match set and whether shrinking deleted anything.
pub fn generate_match_set<R: Rng + ?Sized>(
    population: &mut Population,
    action_space: &ActionSpace,
    input: &[f64],
    max_pop_size: u32,
    rng: &mut R,
) -> (ClassifierSet, bool) {
    let mut modified = false;
    loop {
        let match_set: ClassifierSet = population
            .iter()
            .filter(|classifier| classifier.borrow().matches(input))
            .map(SharedClassifier::clone)
            .collect();

        let distinct = distinct_actions(&match_set);
        let missing = action_space.len().saturating_sub(distinct) as u64;
        if missing == 0 {
            return (match_set, modified);
        }

        if u64::from(population.numerosity()) + missing > u64::from(max_pop_size) {
            loop {
                let deleted =
                    purge_inexperienced(population) || delete_from_population(population, input, rng);
                modified |= deleted;
                if !deleted {
                    // Nothing left to delete; the cap is tighter than the
                    // action space and covering has to proceed regardless.
                    break;
                }
                let headroom_needed =
                    u64::from(population.numerosity()) + action_space.len() as u64 - distinct as u64;
                if headroom_needed <= u64::from(max_pop_size) {
                    break;
                }
            }
        }

        let covering = generate_covering_classifier(&match_set, action_space, input, rng);
        trace!("covering inserts {covering}");
        population.push(covering.into_shared());
    }
}

/// Synthesise the most specific classifier for `input`, proposing an action
/// the match set does not represent yet (or a uniform draw over the whole
/// space if it represents all of them).
pub fn generate_covering_classifier<R: Rng + ?Sized>(
    match_set: &ClassifierSet,
    action_space: &ActionSpace,
    input: &[f64],
    rng: &mut R,
) -> Classifier {
    let present: BTreeSet<Action> = match_set
        .iter()
        .map(|classifier| classifier.borrow().rule.action)
        .collect();
    let remaining: BTreeSet<Action> = action_space.difference(&present).copied().collect();
    let action = random_action(&remaining, rng)
        .or_else(|| random_action(action_space, rng))
        .unwrap_or_default();
    Classifier::new(Condition::point(input), action)
}

/// Number of distinct actions a set of classifiers proposes.
#[must_use]
pub fn distinct_actions(classifiers: &ClassifierSet) -> usize {
    classifiers
        .iter()
        .map(|classifier| classifier.borrow().rule.action)
        .unique()
        .count()
}

/// Drop every classifier that has never joined an action set. Returns
/// whether anything was dropped.
fn purge_inexperienced(population: &mut Population) -> bool {
    let before = population.len();
    population.retain(|classifier| classifier.borrow().experience > 0);
    before != population.len()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::{distinct_actions, generate_covering_classifier, generate_match_set};
    use crate::classifier::{ActionSpace, Classifier, ClassifierSet};
    use crate::condition::Condition;
    use crate::population::Population;

    fn patterned(pattern: &str, action: u8) -> Classifier {
        Classifier::new(Condition::from_pattern(pattern), action)
    }

    #[test]
    fn covering_classifier_matches_its_input() {
        let mut rng = SmallRng::seed_from_u64(11);
        let space = ActionSpace::from([0, 1]);
        let input = [1.0, 1.0, 0.0, 0.0, 1.0];
        let covering =
            generate_covering_classifier(&ClassifierSet::new(), &space, &input, &mut rng);
        assert!(covering.matches(&input));
        assert_eq!(covering.rule.condition.to_string(), "11001");
    }

    #[test]
    fn covering_proposes_a_missing_action() {
        let mut rng = SmallRng::seed_from_u64(11);
        let space = ActionSpace::from([0, 1]);
        let match_set: ClassifierSet = vec![patterned("##", 0).into_shared()];
        for _ in 0..16 {
            let covering = generate_covering_classifier(&match_set, &space, &[1.0, 0.0], &mut rng);
            assert_eq!(covering.rule.action, 1);
        }
    }

    #[test]
    fn distinct_actions_counts_each_action_once() {
        let sets: ClassifierSet = vec![
            patterned("10#", 0).into_shared(),
            patterned("100", 1).into_shared(),
            patterned("#00", 1).into_shared(),
        ];
        assert_eq!(distinct_actions(&sets), 2);
        assert_eq!(distinct_actions(&ClassifierSet::new()), 0);
    }

    #[test]
    fn match_set_covers_every_action() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut population = Population::new();
        let space = ActionSpace::from([0, 1]);

        let (match_set, modified) =
            generate_match_set(&mut population, &space, &[1.0, 0.0, 1.0, 1.0], 2000, &mut rng);

        assert!(!modified, "no shrinking below the cap");
        assert_eq!(population.len(), 2);
        assert_eq!(distinct_actions(&match_set), 2);
        for classifier in &match_set {
            assert!(classifier.borrow().matches(&[1.0, 0.0, 1.0, 1.0]));
        }
    }

    #[test]
    fn matching_reuses_existing_classifiers() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut population = Population::new();
        population.push(patterned("1###", 0).into_shared());
        population.push(patterned("####", 1).into_shared());
        let space = ActionSpace::from([0, 1]);

        let (match_set, _) =
            generate_match_set(&mut population, &space, &[1.0, 0.0, 1.0, 1.0], 2000, &mut rng);

        assert_eq!(population.len(), 2, "no covering was necessary");
        assert_eq!(match_set.len(), 2);
    }

    #[test]
    fn shrinking_purges_inexperienced_classifiers_first() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut population = Population::new();
        // Four fresh classifiers from an earlier input fill the whole cap.
        for action in [0, 1] {
            population.push(patterned("0000", action).into_shared());
            population.push(patterned("0001", action).into_shared());
        }
        let space = ActionSpace::from([0, 1]);

        let (match_set, modified) =
            generate_match_set(&mut population, &space, &[1.0, 1.0, 1.0, 1.0], 4, &mut rng);

        assert!(modified);
        assert_eq!(distinct_actions(&match_set), 2);
        assert!(population.numerosity() <= 4);
    }
}
