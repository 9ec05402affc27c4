use std::path::PathBuf;

use clap::Parser;

/// How states are rendered for the learner.
#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEncoding {
    /// One `'0'`/`'1'` character per multiplexer line.
    Binary,
    /// `';'`-separated real-valued lines in `[0, 1]`.
    Real,
}

/// Multiplexer benchmark for the XCS-RC learner
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Number of multiplexer address bits (binary: 1-5, real: 1-2)
    #[clap(short, long, default_value_t = 3)]
    pub address_bits: u32,

    /// State encoding presented to the learner
    #[clap(short, long, value_enum, default_value_t = InputEncoding::Binary)]
    pub encoding: InputEncoding,

    /// Number of independent simulations to run and average
    #[clap(short, long, default_value_t = 20)]
    pub simulations: u64,

    /// Trials between combining rounds (defaults per address width; 0
    /// disables combining and windowed recording)
    #[clap(long)]
    pub combining_period: Option<u64>,

    /// Cap on the population numerosity sum (defaults per address width)
    #[clap(long)]
    pub max_pop_size: Option<u32>,

    /// Trials per simulation (defaults per address width)
    #[clap(long)]
    pub trials: Option<u64>,

    /// Directory the CSV reports are written to
    #[clap(short, long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Also write a population snapshot at every recording window
    #[clap(long)]
    pub snapshot_populations: bool,
}

/// The per-run schedule: defaults keyed by address width and encoding, each
/// overridable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub combining_period: u64,
    pub max_pop_size: u32,
    pub trials: u64,
}

const BINARY_COMBINING_PERIODS: [u64; 5] = [40, 100, 200, 500, 1000];
const BINARY_POP_SIZES: [u32; 5] = [100, 400, 800, 1000, 2000];
const BINARY_TRIALS: [u64; 5] = [1000, 10_000, 30_000, 50_000, 100_000];

const REAL_COMBINING_PERIODS: [u64; 2] = [40, 100];
const REAL_POP_SIZES: [u32; 2] = [500, 1000];
const REAL_TRIALS: [u64; 2] = [1000, 40_000];

impl Args {
    /// Resolve the schedule for this run.
    ///
    /// # Errors
    ///
    /// When `address_bits` is outside the supported range for the chosen
    /// encoding.
    pub fn schedule(&self) -> miette::Result<Schedule> {
        let index = self.address_bits as usize;
        let (periods, pop_sizes, trials): (&[u64], &[u32], &[u64]) = match self.encoding {
            InputEncoding::Binary => (
                &BINARY_COMBINING_PERIODS,
                &BINARY_POP_SIZES,
                &BINARY_TRIALS,
            ),
            InputEncoding::Real => (&REAL_COMBINING_PERIODS, &REAL_POP_SIZES, &REAL_TRIALS),
        };
        if index == 0 || index > periods.len() {
            miette::bail!(
                "{:?} multiplexers support 1 to {} address bits, got {}",
                self.encoding,
                periods.len(),
                self.address_bits
            );
        }
        Ok(Schedule {
            combining_period: self.combining_period.unwrap_or(periods[index - 1]),
            max_pop_size: self.max_pop_size.unwrap_or(pop_sizes[index - 1]),
            trials: self.trials.unwrap_or(trials[index - 1]),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use test_case::test_case;

    use super::{Args, InputEncoding, Schedule};

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("xcs-cli").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_describe_the_binary_11_multiplexer() {
        let args = parse(&[]);
        assert_eq!(args.address_bits, 3);
        assert_eq!(args.encoding, InputEncoding::Binary);
        assert_eq!(
            args.schedule().unwrap(),
            Schedule {
                combining_period: 200,
                max_pop_size: 800,
                trials: 30_000
            }
        );
    }

    #[test_case(&["--address-bits", "6"]; "binary too wide")]
    #[test_case(&["--address-bits", "0"]; "no address bits")]
    #[test_case(&["--encoding", "real", "--address-bits", "3"]; "real too wide")]
    fn unsupported_widths_are_rejected(args: &[&str]) {
        assert!(parse(args).schedule().is_err());
    }

    #[test]
    fn overrides_beat_the_schedule_tables() {
        let args = parse(&["--combining-period", "7", "--max-pop-size", "9", "--trials", "11"]);
        assert_eq!(
            args.schedule().unwrap(),
            Schedule {
                combining_period: 7,
                max_pop_size: 9,
                trials: 11
            }
        );
    }
}
