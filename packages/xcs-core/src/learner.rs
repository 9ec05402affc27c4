//! The learner: the engine's public face.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    classifier::{Action, ActionSpace, ClassifierSet},
    error::{EmptyActionSpace, InvalidInput, XcsError},
    input::parse_state,
    params::MAX_POP_SIZE,
    population::{combining::combine_set, matching::generate_match_set, Population},
    prediction::{generate_action_set, generate_prediction_array, select_action, ActionMode},
    update::update_set,
};

/// An XCS-RC learner: propose an action for a state, learn from the reward.
///
/// One step of the environment loop is a [`take_action`](Self::take_action)
/// call followed by an [`update_with_reward`](Self::update_with_reward) call
/// carrying the same state. Every `combining_period` trials the population
/// is compacted by rule combining instead of a genetic algorithm.
///
/// All randomness flows through the generator injected at construction, so
/// a seeded generator makes a whole session deterministic.
#[derive(Debug)]
pub struct XcsLearner<R = SmallRng> {
    population: Population,
    action_set: ClassifierSet,
    action_space: ActionSpace,
    max_pop_size: u32,
    combining_period: u64,
    trials: u64,
    input_len: Option<usize>,
    dirty: bool,
    rng: R,
}

impl XcsLearner<SmallRng> {
    /// A learner over the given actions, drawing randomness from a generator
    /// seeded by the operating system.
    ///
    /// # Errors
    ///
    /// [`EmptyActionSpace`] when no actions are supplied.
    pub fn new(action_space: ActionSpace) -> Result<Self, EmptyActionSpace> {
        Self::with_rng(action_space, SmallRng::from_os_rng())
    }
}

impl<R: Rng> XcsLearner<R> {
    /// A learner over the given actions using an injected random generator.
    ///
    /// # Errors
    ///
    /// [`EmptyActionSpace`] when no actions are supplied.
    pub fn with_rng(action_space: ActionSpace, rng: R) -> Result<Self, EmptyActionSpace> {
        if action_space.is_empty() {
            return Err(EmptyActionSpace);
        }
        Ok(Self {
            population: Population::new(),
            action_set: ClassifierSet::new(),
            action_space,
            max_pop_size: MAX_POP_SIZE,
            combining_period: 0,
            trials: 0,
            input_len: None,
            dirty: false,
            rng,
        })
    }

    /// Cap on the population's numerosity sum (default
    /// [`MAX_POP_SIZE`]).
    pub fn set_max_pop_size(&mut self, max_pop_size: u32) {
        self.max_pop_size = max_pop_size;
    }

    /// How many trials pass between combining rounds; zero disables
    /// combining.
    pub fn set_combining_period(&mut self, combining_period: u64) {
        self.combining_period = combining_period;
    }

    /// Read-only view of the population.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of [`take_action`](Self::take_action) calls this session.
    #[must_use]
    pub fn trials(&self) -> u64 {
        self.trials
    }

    #[must_use]
    pub fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    /// Propose an action for a state and stash the action set for the
    /// upcoming reward. Counts one trial.
    ///
    /// # Errors
    ///
    /// [`XcsError::InvalidInput`] when the state string does not parse or
    /// its dimensionality differs from earlier states of this session.
    pub fn take_action(&mut self, state: &str, mode: ActionMode) -> Result<Action, XcsError> {
        let input = self.parse_session_state(state)?;
        let (match_set, modified) = generate_match_set(
            &mut self.population,
            &self.action_space,
            &input,
            self.max_pop_size,
            &mut self.rng,
        );
        self.dirty |= modified;

        let prediction_array = generate_prediction_array(&match_set);
        let action = select_action(&prediction_array, &self.action_space, mode, &mut self.rng)
            .ok_or(EmptyActionSpace)?;
        self.action_set = generate_action_set(&match_set, action);
        self.trials += 1;
        Ok(action)
    }

    /// Feed the reward for the action proposed by the preceding
    /// [`take_action`](Self::take_action) call; `state` must be the state
    /// that produced it. Runs the reinforcement update and, when the trial
    /// counter hits the combining period and the population has changed
    /// since the last round, rule combining.
    ///
    /// # Errors
    ///
    /// [`XcsError::InvalidInput`] as for [`take_action`](Self::take_action).
    pub fn update_with_reward(
        &mut self,
        state: &str,
        action: Action,
        reward: f64,
    ) -> Result<(), XcsError> {
        let input = self.parse_session_state(state)?;
        self.dirty |= update_set(
            &input,
            action,
            reward,
            &self.action_set,
            &mut self.population,
        );

        if self.combining_period > 0 && self.trials % self.combining_period == 0 && self.dirty {
            combine_set(&self.action_space, &mut self.population);
            // The combine pass settles the population; the next window
            // starts clean.
            self.dirty = false;
        }
        Ok(())
    }

    /// Forget everything: population, stashed action set, trial counter,
    /// and the session's input dimensionality.
    pub fn reset(&mut self) {
        self.population.clear();
        self.action_set.clear();
        self.trials = 0;
        self.input_len = None;
        self.dirty = false;
    }

    fn parse_session_state(&mut self, state: &str) -> Result<Vec<f64>, InvalidInput> {
        let input = parse_state(state)?;
        match self.input_len {
            Some(expected) if expected != input.len() => Err(InvalidInput::DimensionMismatch {
                expected,
                actual: input.len(),
            }),
            _ => {
                self.input_len = Some(input.len());
                Ok(input)
            }
        }
    }
}
