//! CSV reports: windowed performance, population listings, and the
//! across-simulation average.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use xcs_core::population::Population;

/// One recording window of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceRow {
    pub trials: u64,
    /// Correct exploit answers per exploit trial in the window.
    pub correctness_rate: f64,
    /// Classifier record count at the end of the window.
    pub pop_size: f64,
    /// Experienced classifier records at the end of the window.
    pub experienced: f64,
}

/// Write performance rows as `trials;correctness_rate;pop_size;experienced`
/// behind the spreadsheet separator preamble.
pub fn save_performance(rows: &[PerformanceRow], path: &Path) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "sep=;")?;
    for row in rows {
        writeln!(
            file,
            "{};{};{};{}",
            row.trials, row.correctness_rate, row.pop_size, row.experienced
        )?;
    }
    Ok(())
}

/// Write a population listing, numbering experienced classifiers first and
/// inexperienced ones after them.
pub fn save_population(population: &Population, path: &Path) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "sep=;")?;
    writeln!(file, "No;Cond;Act;Pred;Fit;PredErr;Num;Exp")?;
    let mut row = 0;
    for experienced_pass in [true, false] {
        for classifier in population.iter() {
            let classifier = classifier.borrow();
            if (classifier.experience > 0) == experienced_pass {
                row += 1;
                writeln!(file, "{row};{}", &*classifier)?;
            }
        }
    }
    Ok(())
}

/// Average the simulations' performance tables row-wise. The trial column is
/// taken from the first simulation; every table must have the same number of
/// rows.
#[must_use]
pub fn average_performance(simulations: &[Vec<PerformanceRow>]) -> Vec<PerformanceRow> {
    let Some(first) = simulations.first() else {
        return Vec::new();
    };
    let count = simulations.len() as f64;
    first
        .iter()
        .enumerate()
        .map(|(index, row)| PerformanceRow {
            trials: row.trials,
            correctness_rate: simulations
                .iter()
                .map(|rows| rows[index].correctness_rate)
                .sum::<f64>()
                / count,
            pop_size: simulations.iter().map(|rows| rows[index].pop_size).sum::<f64>() / count,
            experienced: simulations
                .iter()
                .map(|rows| rows[index].experienced)
                .sum::<f64>()
                / count,
        })
        .collect()
}
