//! Locate the CDR3 anchors: the conserved cysteine in V and the
//! framework 4 motif (F/W-G-x-G) in J.
use crate::shared::alignment::{align, Blosum62, LocalAlignment};
use crate::shared::parameters::{JAlignmentParameters, RecombinationParameters};
use crate::shared::sequence::{translate_slice, Dna};
use anyhow::{anyhow, Result};
use regex::bytes::Regex;

/// Nucleotide offset of the first base of the last `residue` codon of `v`,
/// read in frame 0.
///```
/// use igsynth::{vdj::anchors::find_v_anchor, Dna};
/// let v = Dna::from_string("TGTGCCTGCAAA").unwrap(); // C A C K
/// assert_eq!(find_v_anchor(&v, b'C'), Some(6));
/// assert_eq!(find_v_anchor(&v, b'W'), None);
///```
pub fn find_v_anchor(v: &Dna, residue: u8) -> Option<usize> {
    v.translate()
        .seq
        .iter()
        .rposition(|&aa| aa == residue)
        .map(|idx| 3 * idx)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JAnchorMethod {
    Motif,
    AminoAcidAlignment,
    NucleotideAlignment,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JAnchor {
    // nucleotide offset of the first base of the motif in the J gene
    pub offset: usize,
    pub frame: usize,
    pub score: f64,
    pub method: JAnchorMethod,
}

/// Finds the J anchor: direct motif search in the three frames, then
/// local alignment against the consensus (amino-acids, then nucleotides).
#[derive(Clone, Debug)]
pub struct JAnchorFinder {
    motif: Regex,
    consensus_aa: Vec<u8>,
    consensus_nt: Vec<u8>,
    params: JAlignmentParameters,
}

impl JAnchorFinder {
    pub fn new(params: &RecombinationParameters) -> Result<JAnchorFinder> {
        let motif = Regex::new(&params.j_motif)
            .map_err(|e| anyhow!("Invalid J motif {}: {}", params.j_motif, e))?;
        let p = &params.j_alignment;
        Ok(JAnchorFinder {
            motif,
            consensus_aa: p.consensus_aa.to_ascii_uppercase().into_bytes(),
            consensus_nt: p.consensus_nt.to_ascii_uppercase().into_bytes(),
            params: p.clone(),
        })
    }

    pub fn locate(&self, j: &Dna) -> Option<JAnchor> {
        self.by_motif(j)
            .or_else(|| self.by_amino_acid_alignment(j))
            .or_else(|| self.by_nucleotide_alignment(j))
    }

    fn frames<'a>(&self, j: &'a Dna) -> impl Iterator<Item = (usize, Vec<u8>)> + 'a {
        (0..3)
            .filter(move |&frame| frame < j.len())
            .map(move |frame| (frame, translate_slice(&j.seq[frame..]).seq))
    }

    fn by_motif(&self, j: &Dna) -> Option<JAnchor> {
        let hits = self.frames(j).filter_map(|(frame, aa)| {
            self.motif.find(&aa).map(|m| JAnchor {
                offset: 3 * m.start() + frame,
                frame,
                score: m.len() as f64,
                method: JAnchorMethod::Motif,
            })
        });
        best_anchor(hits)
    }

    fn by_amino_acid_alignment(&self, j: &Dna) -> Option<JAnchor> {
        let hits = self.frames(j).filter_map(|(frame, aa)| {
            let al = align(
                &aa,
                &self.consensus_aa,
                self.params.aa_insertion_cost,
                self.params.aa_deletion_cost,
                &Blosum62,
            );
            valid(al).map(|al| JAnchor {
                offset: 3 * al.start + frame,
                frame,
                score: al.score,
                method: JAnchorMethod::AminoAcidAlignment,
            })
        });
        best_anchor(hits)
    }

    fn by_nucleotide_alignment(&self, j: &Dna) -> Option<JAnchor> {
        let al = align(
            &j.seq,
            &self.consensus_nt,
            self.params.nt_insertion_cost,
            self.params.nt_deletion_cost,
            &self.params.nt_scores,
        );
        valid(al).map(|al| JAnchor {
            offset: al.start,
            frame: al.start % 3,
            score: al.score,
            method: JAnchorMethod::NucleotideAlignment,
        })
    }
}

fn valid(al: LocalAlignment) -> Option<LocalAlignment> {
    if al.is_degenerate() {
        None
    } else {
        Some(al)
    }
}

// highest score, the earliest frame wins ties
fn best_anchor(hits: impl Iterator<Item = JAnchor>) -> Option<JAnchor> {
    hits.fold(None, |best: Option<JAnchor>, hit| match best {
        Some(b) if b.score >= hit.score => Some(b),
        _ => Some(hit),
    })
}
