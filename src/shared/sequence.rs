//! Nucleotide / amino-acid containers, codon translation and the
//! stop-codon-safe nucleotide choice used by the junction generators.
use anyhow::{anyhow, Result};
use log::debug;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

static DNA_TO_AMINO: phf::Map<&'static str, u8> = phf_map! {
    "TTT" => b'F', "TTC" => b'F', "TTA" => b'L', "TTG" => b'L', "TCT" => b'S', "TCC" => b'S',
    "TCA" => b'S', "TCG" => b'S', "TAT" => b'Y', "TAC" => b'Y', "TAA" => b'*', "TAG" => b'*',
    "TGT" => b'C', "TGC" => b'C', "TGA" => b'*', "TGG" => b'W', "CTT" => b'L', "CTC" => b'L',
    "CTA" => b'L', "CTG" => b'L', "CCT" => b'P', "CCC" => b'P', "CCA" => b'P', "CCG" => b'P',
    "CAT" => b'H', "CAC" => b'H', "CAA" => b'Q', "CAG" => b'Q', "CGT" => b'R', "CGC" => b'R',
    "CGA" => b'R', "CGG" => b'R', "ATT" => b'I', "ATC" => b'I', "ATA" => b'I', "ATG" => b'M',
    "ACT" => b'T', "ACC" => b'T', "ACA" => b'T', "ACG" => b'T', "AAT" => b'N', "AAC" => b'N',
    "AAA" => b'K', "AAG" => b'K', "AGT" => b'S', "AGC" => b'S', "AGA" => b'R', "AGG" => b'R',
    "GTT" => b'V', "GTC" => b'V', "GTA" => b'V', "GTG" => b'V', "GCT" => b'A', "GCC" => b'A',
    "GCA" => b'A', "GCG" => b'A', "GAT" => b'D', "GAC" => b'D', "GAA" => b'E', "GAG" => b'E',
    "GGT" => b'G', "GGC" => b'G', "GGA" => b'G', "GGG" => b'G'
};

/// Symbol emitted by [`Dna::translate`] for TAA, TAG and TGA.
pub const STOP: u8 = b'*';

// The standard ACGT nucleotides
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

// accepted on input (IUPAC), only ACGT are ever produced
pub static NUCLEOTIDES_INV: phf::Map<u8, usize> = phf_map! {
    b'A' => 0, b'T' => 3, b'G' => 2, b'C' => 1, b'N' => 4,
    b'R' => 5, b'Y' => 6, b'S' => 7, b'W' => 8, b'K' => 9,
    b'M' => 10, b'B' => 11, b'D' => 12, b'H' => 13, b'V' => 14,
};

static COMPLEMENT: phf::Map<u8, u8> = phf_map! {
    b'A' => b'T', b'T' => b'A', b'G' => b'C', b'C' => b'G', b'N' => b'N',
    b'R' => b'Y', b'Y' => b'R', b'S' => b'S', b'W' => b'W', b'K' => b'M',
    b'M' => b'K', b'B' => b'V', b'D' => b'H', b'H' => b'D', b'V' => b'B',
};

// after "TA", A and G would close a stop codon (TAA, TAG)
const AFTER_TA: [u8; 2] = [b'C', b'T'];
// after "TG", only A closes one (TGA)
const AFTER_TG: [u8; 3] = [b'C', b'G', b'T'];

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dna {
    pub seq: Vec<u8>,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AminoAcid {
    pub seq: Vec<u8>,
}

impl fmt::Display for Dna {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}

impl Dna {
    pub fn new() -> Dna {
        Dna { seq: Vec::new() }
    }

    /// Read a nucleotide string, case-insensitive. Whitespace is not accepted
    /// here, the FASTA parser strips it before.
    ///```
    /// use igsynth::Dna;
    /// assert_eq!(Dna::from_string("acgTn").unwrap().get_string(), "ACGTN");
    /// assert!(Dna::from_string("ACGU").is_err());
    ///```
    pub fn from_string(s: &str) -> Result<Dna> {
        let seq: Vec<u8> = s.bytes().map(|b| b.to_ascii_uppercase()).collect();
        if let Some(&byte) = seq.iter().find(|b| !NUCLEOTIDES_INV.contains_key(*b)) {
            return Err(anyhow!("Invalid nucleotide: {}", byte as char));
        }
        Ok(Dna { seq })
    }

    pub fn get_string(&self) -> String {
        self.to_string()
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Translate the sequence in the frame starting at offset 0. The
    /// trailing incomplete codon (if any) is ignored. Codons containing
    /// anything other than ACGT are skipped, so the amino-acid
    /// index `i` only maps to nucleotide `3*i` when no codon was skipped.
    pub fn translate(&self) -> AminoAcid {
        translate_slice(&self.seq)
    }

    pub fn extend(&mut self, dna: &Dna) {
        self.seq.extend(dna.seq.iter());
    }

    pub fn reverse_complement(&self) -> Dna {
        Dna {
            seq: self
                .seq
                .iter()
                .filter_map(|x| COMPLEMENT.get(x).copied())
                .rev()
                .collect(),
        }
    }

    pub fn extract_subsequence(&self, start: usize, end: usize) -> Dna {
        // Return dna[start:end]
        Dna {
            seq: self.seq[start..end].to_vec(),
        }
    }

    /// true if some base is not A, C, G or T
    pub fn is_ambiguous(&self) -> bool {
        self.seq.iter().any(|n| !NUCLEOTIDES.contains(n))
    }

    pub fn contains_stop_codon(&self) -> bool {
        self.translate().seq.contains(&STOP)
    }
}

/// Same as [`Dna::translate`], on a raw slice.
pub fn translate_slice(seq: &[u8]) -> AminoAcid {
    let amino_sequence: Vec<u8> = seq
        .chunks_exact(3)
        .filter_map(|codon| {
            let aa = codon_to_amino_acid(codon);
            if aa.is_none() {
                debug!(
                    "Unknown codon {} skipped during translation",
                    String::from_utf8_lossy(codon)
                );
            }
            aa
        })
        .collect();
    AminoAcid {
        seq: amino_sequence,
    }
}

pub fn codon_to_amino_acid(codon: &[u8]) -> Option<u8> {
    let codon_str = std::str::from_utf8(codon).ok()?;
    DNA_TO_AMINO.get(codon_str).copied()
}

pub fn complement(nucleotide: u8) -> Option<u8> {
    COMPLEMENT.get(&nucleotide).copied()
}

/// Nucleotides that can follow `partial` (the 0 to 2 bases already placed
/// in the current codon) without closing a stop codon.
///```
/// use igsynth::shared::sequence::allowed_next;
/// assert_eq!(allowed_next(b"TA"), b"CT");
/// assert_eq!(allowed_next(b"TG"), b"CGT");
/// assert_eq!(allowed_next(b""), b"ACGT");
///```
pub fn allowed_next(partial: &[u8]) -> &'static [u8] {
    match partial {
        b"TA" => &AFTER_TA,
        b"TG" => &AFTER_TG,
        _ => &NUCLEOTIDES,
    }
}

impl AminoAcid {
    pub fn from_string(s: &str) -> AminoAcid {
        AminoAcid {
            seq: s.as_bytes().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn has_stop(&self) -> bool {
        self.seq.contains(&STOP)
    }
}
