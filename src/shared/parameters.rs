//! The structs used for specifying the parameters of the recombination
use crate::shared::alignment::MatchMismatch;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecombinationParameters {
    // The conserved cysteine has to be at least that far in the V gene
    pub min_v_anchor_offset: usize,
    // Insertion lengths are uniform in [0, max]
    pub max_palindrome_length: usize,
    pub max_random_insertion: usize,
    // At most ceil(fraction * length) nucleotides are cut on each side of D,
    // and at the start of J
    pub d_cut_fraction: f64,
    pub j_cut_fraction: f64,
    // Number of redraws allowed when looking for a stop-free junction
    pub max_attempts: usize,
    // Truncate the output to a whole number of codons
    pub whole_codon: bool,
    // Amino-acid marking the start of the CDR3 in V
    pub v_anchor: char,
    // regex for the framework 4 motif in J ([F/W]-G-x-G)
    pub j_motif: String,
    pub j_alignment: JAlignmentParameters,
}

impl Default for RecombinationParameters {
    fn default() -> RecombinationParameters {
        RecombinationParameters {
            min_v_anchor_offset: 200,
            max_palindrome_length: 8,
            max_random_insertion: 5,
            d_cut_fraction: 0.3,
            j_cut_fraction: 0.3,
            max_attempts: 100_000,
            whole_codon: false,
            v_anchor: 'C',
            j_motif: "[FW]G.G".to_string(),
            j_alignment: JAlignmentParameters::default(),
        }
    }
}

/// Fallback used when no J motif is found: align the translated J against
/// an amino-acid consensus, then the raw J against a nucleotide consensus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JAlignmentParameters {
    pub consensus_aa: String,
    pub consensus_nt: String,
    // linear gap costs (negative)
    pub aa_insertion_cost: f64,
    pub aa_deletion_cost: f64,
    pub nt_insertion_cost: f64,
    pub nt_deletion_cost: f64,
    pub nt_scores: MatchMismatch,
}

impl Default for JAlignmentParameters {
    fn default() -> JAlignmentParameters {
        JAlignmentParameters {
            // IGHJ4, from the W of the W-G-Q-G motif
            consensus_aa: "WGQGTLVTVSS".to_string(),
            consensus_nt: "TGGGGCCAGGGAACCCTGGTCACCGTCTCCTCA".to_string(),
            aa_insertion_cost: -4.,
            aa_deletion_cost: -4.,
            nt_insertion_cost: -2.,
            nt_deletion_cost: -2.,
            nt_scores: MatchMismatch::default(),
        }
    }
}

impl RecombinationParameters {
    pub fn check(&self) -> Result<()> {
        if !(0. ..=1.).contains(&self.d_cut_fraction) || !(0. ..=1.).contains(&self.j_cut_fraction)
        {
            return Err(anyhow!("Cut fractions must be between 0 and 1"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be positive"));
        }
        Ok(())
    }

    /// Load the parameters from a json file, missing fields take their
    /// default value
    pub fn load_json(filename: &Path) -> Result<RecombinationParameters> {
        let content = fs::read_to_string(filename)
            .with_context(|| format!("Error opening the parameter file {}", filename.display()))?;
        let params: RecombinationParameters = serde_json::from_str(&content)
            .with_context(|| format!("Invalid parameter file {}", filename.display()))?;
        params.check()?;
        Ok(params)
    }

    pub fn save_json(&self, filename: &Path) -> Result<()> {
        let file = File::create(filename)
            .with_context(|| format!("Error creating {}", filename.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Plain values of the command surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfiguration {
    pub number_sequences: usize,
    // fraction of the output that should be productive
    pub productive_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for GeneratorConfiguration {
    fn default() -> GeneratorConfiguration {
        GeneratorConfiguration {
            number_sequences: 1,
            productive_fraction: 1.,
            seed: None,
        }
    }
}

impl GeneratorConfiguration {
    pub fn check(&self) -> Result<()> {
        if !(0. ..=1.).contains(&self.productive_fraction) {
            return Err(anyhow!(
                "The productive fraction must be between 0 and 1 (got {})",
                self.productive_fraction
            ));
        }
        Ok(())
    }
}
