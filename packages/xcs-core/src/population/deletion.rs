//! Roulette deletion.

use std::rc::Rc;

use rand::Rng;

use super::Population;
use crate::{
    classifier::{Classifier, SharedClassifier},
    params::{DELTA_DELETION, THETA_DEL},
};

/// A classifier's share of the deletion roulette.
///
/// The base vote is the estimated action-set size times the numerosity, so
/// crowded niches shed members first. Classifiers that are still fit
/// relative to the population mean, or too young to judge, have their vote
/// scaled by `mean_fitness / (fitness per micro-classifier)`, which shields
/// accurate ones and exposes weak ones.
#[must_use]
pub fn deletion_vote(classifier: &Classifier, mean_fitness: f64) -> f64 {
    let numerosity = f64::from(classifier.numerosity);
    let micro_fitness = classifier.fitness / numerosity;
    let mut vote = classifier.actionset_size * numerosity;
    if micro_fitness >= DELTA_DELETION * mean_fitness || classifier.experience < THETA_DEL {
        vote *= mean_fitness / micro_fitness;
    }
    vote
}

/// Remove one micro-classifier from the population by roulette over the
/// deletion votes, preferring victims that do not match the current input.
///
/// The numerosity sum shrinks by exactly one; a record whose numerosity
/// reaches zero is dropped. Returns `false` only for an empty population.
pub fn delete_from_population<R: Rng + ?Sized>(
    population: &mut Population,
    input: &[f64],
    rng: &mut R,
) -> bool {
    if population.is_empty() {
        return false;
    }

    let mean_fitness = population.total_fitness() / f64::from(population.numerosity());
    let vote_sum: f64 = population
        .iter()
        .map(|classifier| deletion_vote(&classifier.borrow(), mean_fitness))
        .sum();
    debug_assert!(vote_sum > 0.0, "vote mass of a nonempty population");
    let choice_point = rng.random_range(0.0..vote_sum);

    let members: Vec<SharedClassifier> = population.iter().map(Rc::clone).collect();
    let mut accumulated = 0.0;
    for (index, handle) in members.iter().enumerate() {
        accumulated += deletion_vote(&handle.borrow(), mean_fitness);
        if accumulated <= choice_point {
            continue;
        }

        let mut victim = Rc::clone(handle);
        if victim.borrow().matches(input) {
            // Scan forward cyclically for a victim outside the current
            // niche, keeping the roulette pick if the whole population
            // matches.
            for offset in 1..members.len() {
                let candidate = &members[(index + offset) % members.len()];
                if !candidate.borrow().matches(input) {
                    victim = Rc::clone(candidate);
                    break;
                }
            }
        }

        let emptied = {
            let mut victim = victim.borrow_mut();
            victim.numerosity -= 1;
            victim.numerosity == 0
        };
        if emptied {
            population.remove(&victim);
        }
        return true;
    }
    false
}
