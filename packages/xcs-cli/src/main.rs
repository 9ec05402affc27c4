pub mod args;
pub mod multiplexer;
pub mod report;

use std::fs::create_dir_all;

use clap::Parser;
use log::{info, warn};
use miette::IntoDiagnostic;
use rand::{rngs::SmallRng, SeedableRng};
use xcs_core::{
    classifier::ActionSpace,
    learner::XcsLearner,
    params::REWARD_MAX,
    prediction::ActionMode,
};

use crate::{
    args::{Args, Schedule},
    multiplexer::Multiplexer,
    report::{average_performance, save_performance, save_population, PerformanceRow},
};

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let schedule = args.schedule()?;
    let multiplexer = Multiplexer::new(args.address_bits);
    create_dir_all(&args.output_dir).into_diagnostic()?;

    info!(
        "{:?} {}-multiplexer, {} simulations of {} trials (T_comb {}, cap {})",
        args.encoding,
        multiplexer.input_len(),
        args.simulations,
        schedule.trials,
        schedule.combining_period,
        schedule.max_pop_size,
    );
    if schedule.combining_period == 0 {
        warn!("combining period 0: combining and windowed recording are disabled");
    }

    let mut performances = Vec::new();
    for simulation in 0..args.simulations {
        let performance = run_simulation(&args, schedule, &multiplexer, simulation)?;

        let perf_path = args.output_dir.join(format!(
            "MP{}_Perf_{:03}.csv",
            multiplexer.input_len(),
            simulation + 1
        ));
        save_performance(&performance, &perf_path).into_diagnostic()?;
        performances.push(performance);

        info!("simulation {} of {} completed", simulation + 1, args.simulations);
    }

    let average = average_performance(&performances);
    let average_path = args
        .output_dir
        .join(format!("MP{}_Perf_avr.csv", multiplexer.input_len()));
    save_performance(&average, &average_path).into_diagnostic()?;

    Ok(())
}

/// Run one seeded simulation, writing its final population listing and
/// returning its windowed performance rows.
fn run_simulation(
    args: &Args,
    schedule: Schedule,
    multiplexer: &Multiplexer,
    simulation: u64,
) -> miette::Result<Vec<PerformanceRow>> {
    // Separate streams for the environment and the learner keep a
    // simulation reproducible from its index.
    let mut environment_rng = SmallRng::seed_from_u64(2 * simulation);
    let learner_rng = SmallRng::seed_from_u64(2 * simulation + 1);
    let mut learner = XcsLearner::with_rng(ActionSpace::from([0, 1]), learner_rng)?;
    learner.set_combining_period(schedule.combining_period);
    learner.set_max_pop_size(schedule.max_pop_size);

    let mut performance = Vec::new();
    let mut correct_exploits = 0u64;

    for trial in 1..=schedule.trials {
        let mode = if trial % 2 == 0 {
            ActionMode::Explore
        } else {
            ActionMode::Exploit
        };
        let instance = multiplexer.sample(args.encoding, &mut environment_rng);

        let action = learner.take_action(&instance.state, mode)?;
        let answer = multiplexer.correct_action(&instance.lines);
        let reward = if action == answer { REWARD_MAX } else { 0.0 };
        learner.update_with_reward(&instance.state, action, reward)?;

        if mode == ActionMode::Exploit && action == answer {
            correct_exploits += 1;
        }

        if schedule.combining_period > 0 && trial % schedule.combining_period == 0 {
            let summary = learner.population().experienced();
            let row = PerformanceRow {
                trials: learner.trials(),
                correctness_rate: correct_exploits as f64 / (schedule.combining_period / 2) as f64,
                pop_size: learner.population().len() as f64,
                experienced: summary.classifiers as f64,
            };
            info!(
                "trial {}: perf {:.3}, {} classifiers ({} experienced, total experience {})",
                row.trials,
                row.correctness_rate,
                learner.population().len(),
                summary.classifiers,
                summary.total_experience,
            );
            performance.push(row);
            correct_exploits = 0;

            if args.snapshot_populations {
                let snapshot_path = args
                    .output_dir
                    .join(format!("mp_pop_trial_{}.csv", learner.trials()));
                save_population(learner.population(), &snapshot_path).into_diagnostic()?;
            }
        }
    }

    let population_path = args.output_dir.join(format!(
        "MP{}_Pop_{:03}.csv",
        multiplexer.input_len(),
        simulation + 1
    ));
    save_population(learner.population(), &population_path).into_diagnostic()?;

    Ok(performance)
}
