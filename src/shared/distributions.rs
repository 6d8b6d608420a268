//! Randomness capability and the empirical gene-usage distribution
use anyhow::{anyhow, Result};
use rand::{Rng, RngCore};
use std::fmt;

/// Source of randomness threaded through every sampling call. Any `rand`
/// generator implements it; the recombination code only ever sees
/// `&mut dyn RandomSource`, so a single seeded generator drives a whole run.
pub trait RandomSource {
    /// uniform in [0, 1)
    fn uniform(&mut self) -> f64;
    /// uniform in [0, upper), `upper` must be positive
    fn index(&mut self, upper: usize) -> usize;
    /// uniform in [low, high]
    fn inclusive(&mut self, low: usize, high: usize) -> usize;
    fn coin(&mut self) -> bool;
}

impl<R: RngCore> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn index(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }

    fn inclusive(&mut self, low: usize, high: usize) -> usize {
        self.gen_range(low..=high)
    }

    fn coin(&mut self) -> bool {
        self.gen_bool(0.5)
    }
}

/// Gene usage table. Each label is stored with the key `1 - p`, and a draw
/// returns the label(s) whose key is the closest to a uniform number.
///
/// This is a "nearest bucket" selection, the frequency of a label is not
/// proportional to its probability.
#[derive(Clone, Debug, Default)]
pub struct WeightedDistribution {
    // sorted by key, insertion order kept between equal keys
    table: Vec<(f64, String)>,
}

impl WeightedDistribution {
    /// `rows` are `(label, weight)`; weights are percentages if
    /// `percentage` is set, raw fractions otherwise.
    pub fn new<S: AsRef<str>>(rows: &[(S, f64)], percentage: bool) -> Result<Self> {
        if rows.is_empty() {
            return Err(anyhow!(
                "Error when creating distribution: no gene in the table"
            ));
        }
        let scale = if percentage { 100. } else { 1. };
        let mut table: Vec<(f64, String)> = Vec::with_capacity(rows.len());
        for (label, value) in rows {
            if !value.is_finite() {
                return Err(anyhow!(
                    "Error when creating distribution: invalid weight for {}",
                    label.as_ref()
                ));
            }
            table.push((1. - value / scale, label.as_ref().trim().to_string()));
        }
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(WeightedDistribution { table })
    }

    /// Build directly from (key, label) pairs
    pub fn from_keys<S: AsRef<str>>(keys: &[(f64, S)]) -> Result<Self> {
        if keys.is_empty() {
            return Err(anyhow!(
                "Error when creating distribution: no gene in the table"
            ));
        }
        let mut table: Vec<(f64, String)> = keys
            .iter()
            .map(|(k, l)| (*k, l.as_ref().trim().to_string()))
            .collect();
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(WeightedDistribution { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Draw a uniform number and return the closest label
    pub fn sample<'a>(&'a self, rng: &mut dyn RandomSource) -> &'a str {
        let roll = rng.uniform();
        self.draw(roll, rng)
    }

    /// Label whose key is the nearest to `roll`. The keys are scanned in
    /// increasing order until the distance to `roll` goes up again; ties are
    /// broken uniformly.
    pub fn draw<'a>(&'a self, roll: f64, rng: &mut dyn RandomSource) -> &'a str {
        let mut best = f64::INFINITY;
        let mut candidates: Vec<&str> = Vec::new();
        for (key, label) in &self.table {
            let distance = (roll - key).abs();
            if distance < best {
                best = distance;
                candidates.clear();
                candidates.push(label);
            } else if distance == best {
                candidates.push(label);
            } else {
                break;
            }
        }
        match candidates.len() {
            0 => "",
            1 => candidates[0],
            n => candidates[rng.index(n)],
        }
    }
}

impl fmt::Display for WeightedDistribution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines: Vec<String> = self
            .table
            .iter()
            .map(|(key, label)| format!("{:.6}\t{}", key, label))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}
