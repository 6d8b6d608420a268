//! Generate a set of recombined sequences from the three germline loci
use crate::shared::distributions::{RandomSource, WeightedDistribution};
use crate::shared::gene::GermlineSequence;
use crate::shared::output::{FastaWriter, ReferenceWriter};
use crate::shared::parameters::{GeneratorConfiguration, RecombinationParameters};
use crate::shared::parser::{read_distribution, read_germline_fasta};
use crate::shared::selector::GermlineSelector;
use crate::shared::sequence::{AminoAcid, Dna};
use crate::vdj::recombination::{Recombination, Recombinator};
use anyhow::Result;
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;

// warn about suspiciously long searches every that many draws
const DRAWS_WARNING: usize = 100_000;

/// One generated sequence
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationResult {
    pub index: usize,
    pub recombination: Recombination,
}

impl GenerationResult {
    pub fn genes(&self) -> &str {
        &self.recombination.sequence.name
    }

    pub fn full_seq(&self) -> &Dna {
        &self.recombination.sequence.seq
    }

    pub fn cdr3_start(&self) -> usize {
        self.recombination.cdr3_start
    }

    pub fn cdr3_end(&self) -> usize {
        self.recombination.cdr3_end
    }

    pub fn cdr3_nt(&self) -> Dna {
        self.recombination.cdr3()
    }

    pub fn cdr3_aa(&self) -> AminoAcid {
        self.recombination.cdr3_aa()
    }

    pub fn productive(&self) -> bool {
        self.recombination.productive
    }
}

/// Drives the recombination: draws V, D and J, retries the failed
/// attempts, and keeps the fraction of productive outputs on target.
#[derive(Clone, Debug)]
pub struct Generator {
    v_genes: GermlineSelector,
    d_genes: GermlineSelector,
    j_genes: GermlineSelector,
    recombinator: Recombinator,
    productive_fraction: f64,
    rng: SmallRng,
    generated: usize,
    generated_productive: usize,
}

impl Generator {
    pub fn new(
        v_genes: GermlineSelector,
        d_genes: GermlineSelector,
        j_genes: GermlineSelector,
        params: &RecombinationParameters,
        config: &GeneratorConfiguration,
    ) -> Result<Generator> {
        config.check()?;
        let rng = match config.seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_entropy(),
        };
        Ok(Generator {
            v_genes,
            d_genes,
            j_genes,
            recombinator: Recombinator::new(params)?,
            productive_fraction: config.productive_fraction,
            rng,
            generated: 0,
            generated_productive: 0,
        })
    }

    /// Number of sequences generated so far
    pub fn generated(&self) -> usize {
        self.generated
    }

    pub fn generated_productive(&self) -> usize {
        self.generated_productive
    }

    /// Generate the next sequence. Attempts that fail (no anchor, junction
    /// impossible to make stop-free) are redrawn with new genes, as are the
    /// non-productive results when a productive one was due.
    pub fn generate(&mut self) -> GenerationResult {
        let productive = self.productive_due();
        let mut draws = 0;
        loop {
            draws += 1;
            if draws % DRAWS_WARNING == 0 {
                warn!(
                    "{} draws without a valid sequence, check the germline databases",
                    draws
                );
            }
            let rng: &mut dyn RandomSource = &mut self.rng;
            let v = self.v_genes.draw(rng);
            let d = self.d_genes.draw(rng);
            let j = self.j_genes.draw(rng);
            let recombination = match self.recombinator.recombine(v, d, j, productive, rng) {
                Ok(r) => r,
                Err(failure) => {
                    debug!("{}, {}, {}: {}", v.name, d.name, j.name, failure);
                    continue;
                }
            };
            if productive && !recombination.productive {
                debug!(
                    "{}: not productive ({:?}), drawing again",
                    recombination.sequence.name, recombination.soft_failures
                );
                continue;
            }

            self.generated += 1;
            if recombination.productive {
                self.generated_productive += 1;
            }
            return GenerationResult {
                index: self.generated,
                recombination,
            };
        }
    }

    /// The next sequence has to be productive if the productive count is
    /// below its quota
    fn productive_due(&self) -> bool {
        (self.generated_productive as f64) < self.productive_fraction * (self.generated + 1) as f64
    }

    /// Generate `number_sequences` sequences, written as FASTA records and,
    /// optionally, as rows of the reference file.
    pub fn generate_to<W: Write, R: Write>(
        &mut self,
        number_sequences: usize,
        fasta: &mut FastaWriter<W>,
        mut reference: Option<&mut ReferenceWriter<R>>,
        mut on_sequence: impl FnMut(&GenerationResult),
    ) -> Result<()> {
        for _ in 0..number_sequences {
            let result = self.generate();
            fasta.write_record(result.index, result.full_seq())?;
            if let Some(writer) = reference.as_deref_mut() {
                writer.write_record(result.genes(), result.cdr3_start(), result.cdr3_end())?;
            }
            on_sequence(&result);
        }
        fasta.flush()?;
        if let Some(writer) = reference {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Iterator for Generator {
    type Item = GenerationResult;

    fn next(&mut self) -> Option<GenerationResult> {
        Some(self.generate())
    }
}

/// Load a locus from its germline database and optional usage file
pub fn load_locus(
    locus: &str,
    germline_path: &Path,
    distribution_path: Option<&Path>,
    percentage: bool,
) -> Result<GermlineSelector> {
    let genes: Vec<GermlineSequence> = read_germline_fasta(germline_path)?;
    if genes.is_empty() {
        warn!("No usable record in {}", germline_path.display());
    }
    let distribution = match distribution_path {
        None => None,
        Some(path) => {
            let rows = read_distribution(path)?;
            if rows.is_empty() {
                warn!(
                    "No usable line in {}, {} genes drawn uniformly",
                    path.display(),
                    locus
                );
                None
            } else {
                let d = WeightedDistribution::new(&rows, percentage)?;
                debug!("{} usage distribution:\n{}", locus, d);
                Some(d)
            }
        }
    };
    GermlineSelector::new(locus, genes, distribution)
}
