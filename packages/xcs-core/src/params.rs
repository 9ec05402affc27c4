//! Learning parameters.
//!
//! Every constant here is part of the public contract of the engine: the
//! reinforcement updates, the deletion vote, and the combining procedure all
//! read their thresholds from this module.

/// Discount factor for multi-step problems. The engine currently runs
/// single-step episodes only, so this is carried for the contract.
pub const GAMMA: f64 = 0.71;

/// Probability that a covering condition receives a don't-care interval.
pub const P_DONTCARE: f64 = 0.1;

/// Initial payoff estimate of a freshly created classifier.
pub const PREDICTION_INIT: f64 = 500.0;

/// Initial prediction-error estimate.
pub const PREDICTION_ERROR_INIT: f64 = 0.0;

/// Initial fitness.
pub const FITNESS_INIT: f64 = 10.0;

/// Classifiers with at least this much experience carry their full weight in
/// the deletion vote.
pub const THETA_DEL: u32 = 25;

/// Fraction of the population's mean fitness below which a classifier's low
/// fitness raises its deletion vote.
pub const DELTA_DELETION: f64 = 0.1;

/// Default cap on the population's numerosity sum.
pub const MAX_POP_SIZE: u32 = 2000;

/// Probability of choosing exploration over exploitation in harnesses that
/// randomise the action mode.
pub const PROBABILITY_EXPLORE: f64 = 0.5;

/// Reward granted for a correct answer in the benchmark environments.
pub const REWARD_MAX: f64 = 1000.0;

/// Accuracy falloff coefficient in the fitness update.
pub const ALPHA: f64 = 0.1;

/// Learning rate of the exponential moving averages.
pub const BETA: f64 = 0.15;

/// Prediction-error level below which a classifier counts as fully accurate.
pub const EPSILON_ZERO: f64 = 0.01;

/// Exponent of the accuracy falloff.
pub const POWER_PARAMETER: f64 = 5.0;

/// Experience a subsumer must have before classical subsumption applies.
pub const SUBSUMPTION_THRESHOLD: u32 = 50;

/// Minimum experience both parents need before they may be combined.
pub const MIN_EXP: u32 = 1;

/// Order of magnitude of the tolerated disproving-to-experience ratio;
/// zero disables outlier detection entirely.
pub const MAX_DISP_RATE: u32 = 2;

/// Maximum payoff disagreement between two classifiers that may merge.
pub const PRED_TOL: f64 = 10.0;

/// Prediction-error level past which a classifier is replaced mid-stream.
pub const PRED_ERR_TOL: f64 = 260.0;
