//! The core of an XCS-RC learning classifier system: given an environment
//! state, propose a discrete action; given the reward, adapt a bounded
//! population of condition–action–prediction rules. Generalisation happens
//! by periodic rule combining instead of a genetic algorithm.
//!
//! The entry point is [`learner::XcsLearner`].

pub mod classifier;
pub mod condition;
pub mod error;
pub mod input;
pub mod learner;
pub mod params;
pub mod population;
pub mod prediction;
pub mod update;
