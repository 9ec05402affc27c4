//! Reinforcement updates of an action set.

use log::debug;

use crate::{
    classifier::{Action, Classifier, ClassifierSet},
    condition::Condition,
    params::{ALPHA, BETA, EPSILON_ZERO, MIN_EXP, POWER_PARAMETER, PREDICTION_INIT, PRED_ERR_TOL},
    population::Population,
};

/// Apply one reward to every classifier of the action set, then refresh the
/// set's fitness shares.
///
/// Statistics move as sample means while a classifier's experience is below
/// `1/BETA` and as exponential moving averages afterwards, except the
/// action-set-size estimate, which jumps straight to the current total once
/// past that window. A classifier whose prediction error crosses
/// [`PRED_ERR_TOL`] here is removed from the population and replaced by a
/// fresh point-interval classifier built from the current input.
///
/// Returns whether the population changed in a way the combining procedure
/// should see: a classifier reached [`MIN_EXP`], or a replacement occurred.
pub fn update_set(
    input: &[f64],
    action: Action,
    reward: f64,
    action_set: &ClassifierSet,
    population: &mut Population,
) -> bool {
    let mut modified = false;
    let total_numerosity: u32 = action_set
        .iter()
        .map(|classifier| classifier.borrow().numerosity)
        .sum();
    let total_numerosity = f64::from(total_numerosity);

    for handle in action_set {
        let mut classifier = handle.borrow_mut();
        classifier.experience += 1;
        if classifier.experience == MIN_EXP {
            modified = true;
        }

        let experience = f64::from(classifier.experience);
        let in_mean_window = experience < 1.0 / BETA;
        let step = if in_mean_window { 1.0 / experience } else { BETA };

        classifier.prediction += step * (reward - classifier.prediction);

        if in_mean_window {
            classifier.actionset_size +=
                (total_numerosity - classifier.actionset_size) / experience;
        } else {
            classifier.actionset_size = total_numerosity;
        }

        let old_error = classifier.prediction_error;
        let deviation = (reward - classifier.prediction).abs();
        classifier.prediction_error += step * (deviation - classifier.prediction_error);

        if classifier.experience >= 2 * MIN_EXP
            && old_error <= PRED_ERR_TOL
            && classifier.prediction_error > PRED_ERR_TOL
        {
            debug!("replacing drifted classifier {}", &*classifier);
            drop(classifier);
            population.remove(handle);

            let mut replacement = Classifier::new(Condition::point(input), action);
            replacement.prediction = reward;
            replacement.experience = 1;
            replacement.prediction_error = (reward - PREDICTION_INIT).abs();
            population.push(replacement.into_shared());
            modified = true;
        }
    }

    update_fitness(action_set);
    modified
}

/// Redistribute fitness within an action set by relative accuracy: a
/// classifier is fully accurate below [`EPSILON_ZERO`] prediction error and
/// decays polynomially past it.
pub fn update_fitness(action_set: &ClassifierSet) {
    let mut accuracies = Vec::with_capacity(action_set.len());
    let mut accuracy_sum = 0.0;
    for handle in action_set {
        let classifier = handle.borrow();
        let accuracy = if classifier.prediction_error < EPSILON_ZERO {
            1.0
        } else {
            ALPHA * (classifier.prediction_error / EPSILON_ZERO).powf(-POWER_PARAMETER)
        };
        accuracy_sum += accuracy * f64::from(classifier.numerosity);
        accuracies.push(accuracy);
    }

    for (handle, accuracy) in action_set.iter().zip(accuracies) {
        let mut classifier = handle.borrow_mut();
        debug_assert!(accuracy_sum > 0.0, "accuracy mass of a nonempty action set");
        let share = accuracy * f64::from(classifier.numerosity) / accuracy_sum;
        classifier.fitness += BETA * (share - classifier.fitness);
    }
}
