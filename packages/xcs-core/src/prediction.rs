//! The prediction array and action selection.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::classifier::{Action, ActionSpace, ClassifierSet, SharedClassifier};

/// How the learner chooses between the actions of a prediction array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionMode {
    /// Try something new: prefer actions the match set does not predict yet.
    Explore,
    /// Take the action with the best fitness-weighted prediction.
    Exploit,
}

/// The fitness-weighted payoff prediction per action. Actions absent from
/// the match set are absent from the array.
pub type PredictionArray = BTreeMap<Action, f64>;

/// Build the prediction array of a match set: for every represented action,
/// the fitness-weighted mean of its classifiers' predictions.
#[must_use]
pub fn generate_prediction_array(match_set: &ClassifierSet) -> PredictionArray {
    let mut weighted = PredictionArray::new();
    let mut fitness_sums: BTreeMap<Action, f64> = BTreeMap::new();
    for classifier in match_set {
        let classifier = classifier.borrow();
        let action = classifier.rule.action;
        *weighted.entry(action).or_insert(0.0) += classifier.prediction * classifier.fitness;
        *fitness_sums.entry(action).or_insert(0.0) += classifier.fitness;
    }
    for (action, prediction) in &mut weighted {
        let fitness_sum = fitness_sums[action];
        if fitness_sum != 0.0 {
            *prediction /= fitness_sum;
        }
    }
    weighted
}

/// Draw one action uniformly from a set, or nothing from the empty set.
pub fn random_action<R: Rng + ?Sized>(
    actions: &BTreeSet<Action>,
    rng: &mut R,
) -> Option<Action> {
    if actions.is_empty() {
        return None;
    }
    let index = rng.random_range(0..actions.len());
    actions.iter().nth(index).copied()
}

/// Choose an action from a prediction array.
///
/// Exploitation takes the best weighted prediction. Exploration draws
/// uniformly among the actions the array does not cover yet, falling back to
/// the whole action space once every action is represented. An empty array
/// always explores, so the only way to get `None` back is an empty action
/// space.
pub fn select_action<R: Rng + ?Sized>(
    prediction_array: &PredictionArray,
    action_space: &ActionSpace,
    mode: ActionMode,
    rng: &mut R,
) -> Option<Action> {
    if mode == ActionMode::Explore || prediction_array.is_empty() {
        let unrepresented: BTreeSet<Action> = action_space
            .iter()
            .copied()
            .filter(|action| !prediction_array.contains_key(action))
            .collect();
        return random_action(&unrepresented, rng).or_else(|| random_action(action_space, rng));
    }
    prediction_array
        .iter()
        .max_by(|(_, left), (_, right)| left.total_cmp(right))
        .map(|(action, _)| *action)
}

/// The subset of a match set proposing `action`.
#[must_use]
pub fn generate_action_set(match_set: &ClassifierSet, action: Action) -> ClassifierSet {
    match_set
        .iter()
        .filter(|classifier| classifier.borrow().rule.action == action)
        .map(SharedClassifier::clone)
        .collect()
}
