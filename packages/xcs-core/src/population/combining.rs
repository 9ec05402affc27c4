//! Rule combining: deterministic generalisation by pairwise interval union,
//! gated by a disproof check, with subsumption of dominated classifiers and
//! outlier removal.

use std::rc::Rc;

use log::debug;

use super::Population;
use crate::{
    classifier::{ActionSpace, Classifier, ClassifierSet, SharedClassifier},
    params::{BETA, FITNESS_INIT, MAX_DISP_RATE, MIN_EXP, PREDICTION_INIT, PRED_TOL},
};

/// Are two payoff predictions close enough to agree?
pub(crate) fn within_tolerance(left: f64, right: f64, tolerance: f64) -> bool {
    (left - right).abs() <= tolerance
}

/// Compact the population by merging agreeing classifiers per action.
///
/// For every action the classifiers form a work list, scanned pairwise. Two
/// experienced classifiers whose predictions agree within [`PRED_TOL`]
/// propose a merged classifier over the interval union of their conditions.
/// Any other experienced classifier of the work list whose condition
/// overlaps the union but whose prediction disagrees *disproves* the merger
/// (and is flagged for the disproving counter); an undisproved candidate
/// replaces its parents, absorbs every classifier its condition subsumes,
/// and rejoins the scan. A work list is done once a full pass merges
/// nothing.
///
/// After all actions, the per-pass disproof flags roll into the `disproving`
/// counters and persistent outliers are removed.
///
/// Returns whether any merge or outlier removal changed the population.
pub fn combine_set(action_space: &ActionSpace, population: &mut Population) -> bool {
    let mut modified = false;
    population.sort_for_combining();

    for &action in action_space {
        let mut work: ClassifierSet = population
            .iter()
            .filter(|classifier| classifier.borrow().rule.action == action)
            .map(SharedClassifier::clone)
            .collect();

        let mut passes_without_merge = 0;
        while passes_without_merge < 2 {
            passes_without_merge += 1;
            let mut i = 0;
            while i < work.len() {
                let mut j = i + 1;
                while j < work.len() {
                    if try_combine_pair(i, &mut j, &mut work, population) {
                        modified = true;
                        passes_without_merge = 0;
                    }
                    j += 1;
                }
                i += 1;
            }
        }
    }

    if MAX_DISP_RATE > 0 {
        for classifier in population.iter() {
            let mut classifier = classifier.borrow_mut();
            if classifier.disproves {
                classifier.disproving += 1;
                classifier.disproves = false;
            }
        }
        modified |= remove_outliers(population);
    }

    modified
}

/// Attempt to merge `work[i]` with `work[*j]`. On approval the parents and
/// all subsumed classifiers are replaced by the merged classifier and `*j`
/// is reset to `i`, so the caller's scan continues against the rebuilt work
/// list.
fn try_combine_pair(
    i: usize,
    j: &mut usize,
    work: &mut ClassifierSet,
    population: &mut Population,
) -> bool {
    let (exp_i, prediction_i, numerosity_i, condition_i) = {
        let parent = work[i].borrow();
        (
            parent.experience,
            parent.prediction,
            parent.numerosity,
            parent.rule.condition.clone(),
        )
    };
    let (exp_j, prediction_j, numerosity_j, condition_j) = {
        let parent = work[*j].borrow();
        (
            parent.experience,
            parent.prediction,
            parent.numerosity,
            parent.rule.condition.clone(),
        )
    };

    if exp_i < MIN_EXP
        || exp_j < MIN_EXP
        || !within_tolerance(prediction_i, prediction_j, PRED_TOL)
    {
        return false;
    }

    let condition = condition_i.union(&condition_j);
    let action = work[i].borrow().rule.action;
    let candidate_prediction = prediction_j.mul_add(
        f64::from(numerosity_j),
        prediction_i * f64::from(numerosity_i),
    ) / f64::from(numerosity_i + numerosity_j);

    // Examination: an experienced sibling that overlaps the union but
    // disagrees on payoff disproves the candidate.
    let mut disproved = false;
    for (k, other) in work.iter().enumerate() {
        if k == i || k == *j {
            continue;
        }
        let mut other = other.borrow_mut();
        if other.experience > 0
            && condition.overlaps(&other.rule.condition)
            && !within_tolerance(candidate_prediction, other.prediction, PRED_TOL)
        {
            disproved = true;
            if MAX_DISP_RATE > 0 {
                other.disproves = true;
            } else {
                break;
            }
        }
    }
    if disproved {
        return false;
    }

    // Approved: the parents leave, the merged classifier inherits their
    // combined statistics.
    population.remove(&work[i]);
    population.remove(&work[*j]);
    work.remove(*j);
    work.remove(i);

    let mut merged = Classifier::new(condition, action);
    merged.experience = exp_i + exp_j;
    merged.numerosity = numerosity_i + numerosity_j;
    let mut prediction_mass = candidate_prediction * f64::from(merged.numerosity);

    // Subsumption sweep: fold every remaining classifier the union covers
    // and agrees with; inexperienced ones are dropped without folding.
    let mut absorbed = Vec::new();
    for (k, other) in work.iter().enumerate() {
        let other = other.borrow();
        let agrees = within_tolerance(candidate_prediction, other.prediction, PRED_TOL);
        if merged.rule.condition.is_more_general(&other.rule.condition)
            && (agrees || other.experience == 0)
        {
            if other.experience > 0 {
                merged.experience += other.experience;
                merged.numerosity += other.numerosity;
                prediction_mass += other.prediction * f64::from(other.numerosity);
            }
            absorbed.push(k);
        }
    }
    merged.prediction = prediction_mass / f64::from(merged.numerosity);
    for &k in absorbed.iter().rev() {
        let handle = work.remove(k);
        population.remove(&handle);
    }

    merged.prediction_error = merged_prediction_error(merged.prediction, merged.experience);
    merged.fitness = (FITNESS_INIT - 1.0) * (1.0 - BETA).powf(f64::from(merged.experience)) + 1.0;
    debug!("combined into {merged}");

    let merged = merged.into_shared();
    work.push(Rc::clone(&merged));
    population.push(merged);

    *j = i;
    true
}

/// The prediction error a merged classifier restarts with: the deviation of
/// its prediction from the initial estimate, averaged over the sample-mean
/// window and decayed exponentially past it.
fn merged_prediction_error(prediction: f64, experience: u32) -> f64 {
    let window = (1.0 / BETA).floor();
    let deviation = (prediction - PREDICTION_INIT).abs();
    if f64::from(experience) <= window {
        deviation / f64::from(experience)
    } else {
        (deviation / window) * (1.0 - BETA).powf(f64::from(experience) - window)
    }
}

/// Remove every experienced classifier whose disproving rate exceeds
/// `10^MAX_DISP_RATE`. Returns whether anything was removed.
pub fn remove_outliers(population: &mut Population) -> bool {
    let threshold = 10_f64.powf(f64::from(MAX_DISP_RATE));
    let outliers: Vec<SharedClassifier> = population
        .iter()
        .filter(|classifier| {
            let classifier = classifier.borrow();
            classifier.experience > 0
                && f64::from(classifier.disproving) / f64::from(classifier.experience) > threshold
        })
        .map(Rc::clone)
        .collect();

    for outlier in &outliers {
        debug!("removing outlier {}", &*outlier.borrow());
        population.remove(outlier);
    }
    !outliers.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{combine_set, remove_outliers, within_tolerance};
    use crate::classifier::{ActionSpace, Classifier};
    use crate::condition::Condition;
    use crate::population::Population;

    fn experienced(pattern: &str, action: u8, prediction: f64) -> Classifier {
        let mut classifier = Classifier::new(Condition::from_pattern(pattern), action);
        classifier.prediction = prediction;
        classifier.experience = 1;
        classifier
    }

    #[test]
    fn tolerance_is_symmetric_and_inclusive() {
        assert!(within_tolerance(500.0, 510.0, 10.0));
        assert!(within_tolerance(510.0, 500.0, 10.0));
        assert!(!within_tolerance(500.0, 510.1, 10.0));
    }

    #[test]
    fn agreeing_twins_merge_into_one_classifier() {
        let space = ActionSpace::from([0, 1]);
        let mut population = Population::new();
        let mut first = experienced("101", 0, 500.0);
        first.experience = 3;
        first.numerosity = 2;
        let mut second = experienced("101", 0, 505.0);
        second.experience = 1;
        second.numerosity = 1;
        population.push(first.into_shared());
        population.push(second.into_shared());

        assert!(combine_set(&space, &mut population));

        assert_eq!(population.len(), 1);
        let merged = population.iter().next().unwrap().borrow();
        assert_eq!(merged.numerosity, 3);
        assert_eq!(merged.experience, 4);
        // Numerosity-weighted average: (500·2 + 505·1) / 3
        assert!((merged.prediction - 1505.0 / 3.0).abs() < 1e-9);
        assert_eq!(merged.rule.condition, Condition::from_pattern("101"));
        assert_eq!(merged.disproving, 0);
    }

    #[test]
    fn merged_statistics_follow_the_reconstruction_formulas() {
        let space = ActionSpace::from([0]);
        let mut population = Population::new();
        population.push(experienced("11", 0, 500.0).into_shared());
        population.push(experienced("11", 0, 500.0).into_shared());
        population.push(experienced("11", 0, 500.0).into_shared());

        assert!(combine_set(&space, &mut population));

        // Pairwise merge (experience 2) then subsumption of the third.
        assert_eq!(population.len(), 1);
        let merged = population.iter().next().unwrap().borrow();
        assert_eq!(merged.experience, 3);
        assert_eq!(merged.numerosity, 3);
        assert_eq!(merged.prediction, 500.0);
        // Experience 3 sits inside the sample-mean window of 1/BETA.
        assert_eq!(merged.prediction_error, 0.0);
        let expected_fitness = 9.0 * 0.85_f64.powi(3) + 1.0;
        assert!((merged.fitness - expected_fitness).abs() < 1e-12);
    }

    #[test]
    fn an_overlapping_dissenter_blocks_the_merge() {
        let space = ActionSpace::from([0, 1]);
        let mut population = Population::new();
        let first = experienced("1#1", 0, 500.0).into_shared();
        let second = experienced("11#", 0, 505.0).into_shared();
        let dissenter = experienced("111", 0, 1000.0).into_shared();
        population.push(std::rc::Rc::clone(&first));
        population.push(std::rc::Rc::clone(&second));
        population.push(std::rc::Rc::clone(&dissenter));

        assert!(!combine_set(&space, &mut population));

        assert_eq!(population.len(), 3, "the disproved merge must not happen");
        assert_eq!(
            dissenter.borrow().disproving,
            1,
            "one combine round disproved a candidate"
        );
        assert!(!dissenter.borrow().disproves, "the flag rolls into the counter");
        assert_eq!(first.borrow().disproving, 0);
        assert_eq!(second.borrow().disproving, 0);
    }

    #[test]
    fn inexperienced_subsumees_are_dropped_without_folding() {
        let space = ActionSpace::from([0]);
        let mut population = Population::new();
        population.push(experienced("1#", 0, 500.0).into_shared());
        population.push(experienced("11", 0, 505.0).into_shared());
        let fresh = Classifier::new(Condition::from_pattern("10"), 0);
        // Fresh classifier: experience 0, prediction at the 500 default.
        population.push(fresh.into_shared());

        assert!(combine_set(&space, &mut population));

        assert_eq!(population.len(), 1);
        let merged = population.iter().next().unwrap().borrow();
        assert_eq!(merged.experience, 2, "only the parents' experience");
        assert_eq!(merged.numerosity, 2, "only the parents' numerosity");
        assert_eq!(merged.rule.condition, Condition::from_pattern("1#"));
    }

    #[test]
    fn combining_is_idempotent() {
        let space = ActionSpace::from([0, 1]);
        let mut population = Population::new();
        population.push(experienced("101", 0, 500.0).into_shared());
        population.push(experienced("101", 0, 505.0).into_shared());

        assert!(combine_set(&space, &mut population));
        let after_first = population.len();

        assert!(
            !combine_set(&space, &mut population),
            "a second pass over a settled population changes nothing"
        );
        assert_eq!(population.len(), after_first);
    }

    #[test]
    fn disagreeing_classifiers_never_merge() {
        let space = ActionSpace::from([0]);
        let mut population = Population::new();
        population.push(experienced("00", 0, 100.0).into_shared());
        population.push(experienced("01", 0, 900.0).into_shared());

        assert!(!combine_set(&space, &mut population));
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn persistent_dissenters_are_removed_as_outliers() {
        let mut population = Population::new();
        let mut outlier = experienced("11", 0, 1000.0);
        outlier.experience = 1;
        outlier.disproving = 101;
        let mut steady = experienced("00", 0, 500.0);
        steady.experience = 2;
        steady.disproving = 101;
        population.push(outlier.into_shared());
        population.push(steady.into_shared());

        assert!(remove_outliers(&mut population));

        // 101/1 > 100 goes; 101/2 stays.
        assert_eq!(population.len(), 1);
        assert_eq!(population.iter().next().unwrap().borrow().disproving, 101);
        assert!(!remove_outliers(&mut population));
    }
}
