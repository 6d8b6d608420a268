//! Deal with germline gene names and the labeled sequence value
use crate::shared::sequence::Dna;
use anyhow::{anyhow, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the pieces of a recombined (hybrid) label
pub const HYBRID_DELIMITER: char = ',';
const FAMILY_SEPARATOR: char = '-';
const ALLELE_SEPARATOR: char = '*';

/// A labeled nucleotide sequence. Germline records, trimmed pieces and the
/// recombined output all use this type; it is never modified in place,
/// `trimmed` and `append` return new values.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GermlineSequence {
    pub name: String,
    pub accession: String,
    pub seq: Dna,
}

impl GermlineSequence {
    pub fn new(name: &str, accession: &str, seq: Dna) -> GermlineSequence {
        GermlineSequence {
            name: name.to_string(),
            accession: accession.to_string(),
            seq,
        }
    }

    pub fn from_string(name: &str, accession: &str, seq: &str) -> Result<GermlineSequence> {
        let dna = Dna::from_string(seq)
            .map_err(|e| anyhow!("Invalid sequence for the gene {}: {}", name, e))?;
        Ok(GermlineSequence::new(name, accession, dna))
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Keep `seq[start..end]`, same label.
    pub fn trimmed(&self, start: usize, end: usize) -> GermlineSequence {
        GermlineSequence {
            name: self.name.clone(),
            accession: self.accession.clone(),
            seq: self.seq.extract_subsequence(start, end),
        }
    }

    /// Concatenate two pieces, labels and accessions are joined so that the
    /// result remembers all its germline origins.
    ///```
    /// use igsynth::GermlineSequence;
    /// let v = GermlineSequence::from_string("IGHV1-2*02", "X1", "ACG").unwrap();
    /// let j = GermlineSequence::from_string("IGHJ4*02", "X2", "TT").unwrap();
    /// let vj = v.append(&j);
    /// assert_eq!(vj.name, "IGHV1-2*02,IGHJ4*02");
    /// assert_eq!(vj.accession, "X1,X2");
    /// assert_eq!(vj.seq.get_string(), "ACGTT");
    ///```
    pub fn append(&self, other: &GermlineSequence) -> GermlineSequence {
        let mut seq = self.seq.clone();
        seq.extend(&other.seq);
        GermlineSequence {
            name: format!("{}{}{}", self.name, HYBRID_DELIMITER, other.name),
            accession: format!("{}{}{}", self.accession, HYBRID_DELIMITER, other.accession),
            seq,
        }
    }

    /// Add raw (unlabeled) nucleotides, e.g. junctional insertions.
    pub fn extended(&self, dna: &Dna) -> GermlineSequence {
        let mut seq = self.seq.clone();
        seq.extend(dna);
        GermlineSequence {
            name: self.name.clone(),
            accession: self.accession.clone(),
            seq,
        }
    }

    pub fn truncated(&self, len: usize) -> GermlineSequence {
        self.trimmed(0, len.min(self.len()))
    }

    pub fn family_name(&self) -> String {
        family_name(&self.name)
    }

    pub fn gene_name(&self) -> String {
        gene_name(&self.name)
    }

    /// true if the gene matches the query at the granularity the query is
    /// written with (allele, gene or family)
    pub fn matches(&self, query: &str) -> bool {
        match NameLevel::of(query) {
            NameLevel::Allele => self.name == query,
            NameLevel::Gene => self.gene_name() == query,
            NameLevel::Family => self.family_name() == query,
        }
    }
}

impl fmt::Display for GermlineSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\n{}", self.accession, self.name, self.seq)
    }
}

/// Granularity at which a gene name is written
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameLevel {
    // IGHV1-2*02
    Allele,
    // IGHV1-2
    Gene,
    // IGHV1
    Family,
}

impl NameLevel {
    pub fn of(name: &str) -> NameLevel {
        if name.contains(ALLELE_SEPARATOR) {
            NameLevel::Allele
        } else if name.contains(FAMILY_SEPARATOR) {
            NameLevel::Gene
        } else {
            NameLevel::Family
        }
    }
}

fn single_family_name(name: &str) -> &str {
    let end = name
        .find(|c| c == FAMILY_SEPARATOR || c == ALLELE_SEPARATOR)
        .unwrap_or(name.len());
    &name[..end]
}

fn single_gene_name(name: &str) -> &str {
    let end = name.find(ALLELE_SEPARATOR).unwrap_or(name.len());
    &name[..end]
}

/// Family part of a (possibly hybrid) name
///```
/// use igsynth::shared::gene::family_name;
/// assert_eq!(family_name("IGHV1-2*02"), "IGHV1");
/// assert_eq!(family_name("IGHJ4*02"), "IGHJ4");
/// assert_eq!(family_name("IGHV3-23*01,IGHD3-10*01,IGHJ6*02"), "IGHV3,IGHD3,IGHJ6");
///```
pub fn family_name(name: &str) -> String {
    split_hybrid(name)
        .map(single_family_name)
        .join(&HYBRID_DELIMITER.to_string())
}

/// Gene part (allele removed) of a (possibly hybrid) name
///```
/// use igsynth::shared::gene::gene_name;
/// assert_eq!(gene_name("IGHV1-2*02"), "IGHV1-2");
/// assert_eq!(gene_name("IGHV1-2*02,IGHJ4*02"), "IGHV1-2,IGHJ4");
///```
pub fn gene_name(name: &str) -> String {
    split_hybrid(name)
        .map(single_gene_name)
        .join(&HYBRID_DELIMITER.to_string())
}

pub fn split_hybrid(name: &str) -> impl Iterator<Item = &str> {
    name.split(HYBRID_DELIMITER)
}
