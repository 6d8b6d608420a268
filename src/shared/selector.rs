//! Pick germline genes of one locus
use crate::shared::distributions::{RandomSource, WeightedDistribution};
use crate::shared::gene::GermlineSequence;
use anyhow::{anyhow, Result};
use log::{debug, info};

/// All the germline genes of a locus, with an optional usage distribution.
/// Read-only once built.
#[derive(Clone, Debug)]
pub struct GermlineSelector {
    locus: String,
    genes: Vec<GermlineSequence>,
    distribution: Option<WeightedDistribution>,
}

impl GermlineSelector {
    /// Fails if `genes` is empty: nothing could ever be drawn from it.
    pub fn new(
        locus: &str,
        genes: Vec<GermlineSequence>,
        distribution: Option<WeightedDistribution>,
    ) -> Result<GermlineSelector> {
        if genes.is_empty() {
            return Err(anyhow!("No germline gene available for the {} locus", locus));
        }
        info!(
            "{} locus: {} germline genes{}",
            locus,
            genes.len(),
            if distribution.is_some() {
                ", with usage distribution"
            } else {
                ""
            }
        );
        Ok(GermlineSelector {
            locus: locus.to_string(),
            genes,
            distribution,
        })
    }

    pub fn locus(&self) -> &str {
        &self.locus
    }

    pub fn genes(&self) -> &[GermlineSequence] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// All genes matching `query`, at the granularity given by the query
    /// (full allele name, gene name or family name)
    pub fn genes_matching(&self, query: &str) -> Vec<&GermlineSequence> {
        self.genes.iter().filter(|g| g.matches(query)).collect()
    }

    /// Draw one gene. With a usage distribution, a label is drawn first and
    /// the gene is picked among the matching ones; if none matches (or
    /// without distribution) the pick is uniform over the locus.
    pub fn draw(&self, rng: &mut dyn RandomSource) -> &GermlineSequence {
        if let Some(distribution) = &self.distribution {
            let query = distribution.sample(rng);
            if !query.is_empty() {
                let filtered = self.genes_matching(query);
                if !filtered.is_empty() {
                    return filtered[rng.index(filtered.len())];
                }
                debug!(
                    "No {} gene matches {}, uniform draw instead",
                    self.locus, query
                );
            }
        }
        self.random_gene(rng)
    }

    fn random_gene(&self, rng: &mut dyn RandomSource) -> &GermlineSequence {
        &self.genes[rng.index(self.genes.len())]
    }
}
