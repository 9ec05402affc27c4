//! The Boolean multiplexer environment.

use rand::Rng;
use xcs_core::classifier::Action;

use crate::args::InputEncoding;

/// An `n`-bit multiplexer with `k` address bits and `2^k` data bits: the
/// address selects the data bit that is the correct answer.
#[derive(Debug, Clone, Copy)]
pub struct Multiplexer {
    address_bits: u32,
}

/// One sampled problem instance: the state string handed to the learner and
/// the underlying Boolean lines the oracle reads.
#[derive(Debug, Clone)]
pub struct Instance {
    pub state: String,
    pub lines: Vec<bool>,
}

impl Multiplexer {
    #[must_use]
    pub const fn new(address_bits: u32) -> Self {
        Self { address_bits }
    }

    /// Total input lines: address bits plus addressed data bits.
    #[must_use]
    pub const fn input_len(&self) -> usize {
        self.address_bits as usize + (1 << self.address_bits)
    }

    /// Sample a uniform problem instance.
    ///
    /// Each line draws a uniform value rounded to three decimals; the binary
    /// rendering (and the oracle) round it to the nearer bit, while the real
    /// rendering keeps the noisy value as a five-character decimal token.
    pub fn sample<R: Rng + ?Sized>(&self, encoding: InputEncoding, rng: &mut R) -> Instance {
        let mut lines = Vec::with_capacity(self.input_len());
        let mut values = Vec::with_capacity(self.input_len());
        for _ in 0..self.input_len() {
            let value = (1000.0 * rng.random_range(0.0_f64..1.0)).round() / 1000.0;
            lines.push(value.round() == 1.0);
            values.push(value);
        }
        let state = match encoding {
            InputEncoding::Binary => lines
                .iter()
                .map(|&line| if line { '1' } else { '0' })
                .collect(),
            InputEncoding::Real => values
                .iter()
                .map(|value| {
                    let mut token = format!("{value:.6}");
                    token.truncate(5);
                    token
                })
                .collect::<Vec<_>>()
                .join(";"),
        };
        Instance { state, lines }
    }

    /// The data bit selected by the address bits.
    #[must_use]
    pub fn correct_action(&self, lines: &[bool]) -> Action {
        let address_bits = self.address_bits as usize;
        let address: usize = lines[..address_bits]
            .iter()
            .fold(0, |address, &bit| (address << 1) | usize::from(bit));
        Action::from(lines[address_bits + address])
    }
}
