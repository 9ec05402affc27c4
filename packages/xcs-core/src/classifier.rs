//! Classifiers: condition–action rules with learning statistics.

use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeSet,
    fmt::{self, Display},
    rc::Rc,
};

use crate::{
    condition::Condition,
    params::{FITNESS_INIT, PREDICTION_ERROR_INIT, PREDICTION_INIT},
};

/// A discrete action id.
pub type Action = u8;

/// The finite set of actions a learner may propose.
pub type ActionSpace = BTreeSet<Action>;

/// A condition–action pair. Two rules are equal when both parts are.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub condition: Condition,
    pub action: Action,
}

/// A rule plus the statistics the reinforcement and combining procedures
/// maintain about it.
///
/// One record with numerosity `n` stands for `n` identical micro-classifiers;
/// the population cap applies to the numerosity sum, not the record count.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    pub rule: Rule,

    /// Moving average of the reward observed when this classifier fires.
    pub prediction: f64,

    /// Moving average of the absolute deviation between reward and
    /// prediction.
    pub prediction_error: f64,

    /// Relative accuracy within the action sets this classifier joins.
    pub fitness: f64,

    /// Number of action sets this classifier has belonged to.
    pub experience: u32,

    /// Moving average of the numerosity of those action sets.
    pub actionset_size: f64,

    /// Micro-classifier multiplicity. Never below one; a classifier whose
    /// numerosity would reach zero is removed instead.
    pub numerosity: u32,

    /// Combine rounds in which this classifier disproved a candidate merger.
    pub disproving: u32,

    /// Set while one combine pass runs, rolled into `disproving` at its end.
    pub disproves: bool,
}

impl Classifier {
    /// A fresh classifier with the standard initial statistics.
    #[must_use]
    pub fn new(condition: Condition, action: Action) -> Self {
        Self {
            rule: Rule { condition, action },
            prediction: PREDICTION_INIT,
            prediction_error: PREDICTION_ERROR_INIT,
            fitness: FITNESS_INIT,
            experience: 0,
            actionset_size: 1.0,
            numerosity: 1,
            disproving: 0,
            disproves: false,
        }
    }

    #[must_use]
    pub fn matches(&self, input: &[f64]) -> bool {
        self.rule.condition.matches(input)
    }

    /// Wrap this classifier in a shared handle so population, match set, and
    /// action set can all reference it.
    #[must_use]
    pub fn into_shared(self) -> SharedClassifier {
        Rc::new(RefCell::new(self))
    }

    /// The order the combining procedure sorts a population into: action
    /// ascending, then prediction descending, then the numeric encoding of
    /// the printable condition.
    pub(crate) fn combine_order(&self, other: &Self) -> Ordering {
        self.rule
            .action
            .cmp(&other.rule.action)
            .then_with(|| other.prediction.total_cmp(&self.prediction))
            .then_with(|| {
                self.rule
                    .condition
                    .encoding()
                    .total_cmp(&other.rule.condition.encoding())
            })
    }
}

/// Shared handle to a classifier.
///
/// The population owns classifiers through these handles, and match and
/// action sets alias them for the duration of one step; a handle that is
/// removed from the population mid-update stays readable through the views
/// that still hold it.
pub type SharedClassifier = Rc<RefCell<Classifier>>;

/// A non-owning view over classifiers: a match set, action set, or combining
/// work list.
pub type ClassifierSet = Vec<SharedClassifier>;

impl Display for Classifier {
    /// The semicolon-separated text form:
    /// `cond;act;prediction;fitness;prediction_error;numerosity;experience`
    /// with the statistics at three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{:.3};{:.3};{:.3};{};{}",
            self.rule.condition,
            self.rule.action,
            self.prediction,
            self.fitness,
            self.prediction_error,
            self.numerosity,
            self.experience
        )
    }
}
