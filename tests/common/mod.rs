use anyhow::Result;
use igsynth::{GermlineSelector, GermlineSequence};
use std::fs;
use std::path::{Path, PathBuf};

// Q x 70, then V Y Y C A R + 2 nt: the cysteine codon starts at 219
#[allow(dead_code)]
pub const V_ANCHOR_OFFSET: usize = 219;
// IGHJ4*02, the W of W-G-Q-G is in frame 2, at nucleotide 14
#[allow(dead_code)]
pub const J_ANCHOR_OFFSET: usize = 14;
#[allow(dead_code)]
pub const J4_SEQ: &str = "ACTACTTTGACTACTGGGGCCAGGGAACCCTGGTCACCGTCTCCTCAG";
#[allow(dead_code)]
pub const D3_SEQ: &str = "GTATTACTATGGTTCGGGGAGTTATTATAAC";

#[cfg(test)]
#[allow(dead_code)]
pub fn toy_v_seq() -> String {
    format!("{}GTGTATTACTGTGCGAGAGA", "CAG".repeat(70))
}

#[cfg(test)]
#[allow(dead_code)]
pub fn toy_v() -> GermlineSequence {
    GermlineSequence::from_string("IGHV1-2*02", "X62106", &toy_v_seq()).unwrap()
}

#[cfg(test)]
#[allow(dead_code)]
pub fn toy_d() -> GermlineSequence {
    GermlineSequence::from_string("IGHD3-10*01", "X13972", D3_SEQ).unwrap()
}

#[cfg(test)]
#[allow(dead_code)]
pub fn toy_j() -> GermlineSequence {
    GermlineSequence::from_string("IGHJ4*02", "J00256", J4_SEQ).unwrap()
}

#[cfg(test)]
#[allow(dead_code)]
pub fn toy_loci() -> Result<(GermlineSelector, GermlineSelector, GermlineSelector)> {
    Ok((
        GermlineSelector::new("V", vec![toy_v()], None)?,
        GermlineSelector::new("D", vec![toy_d()], None)?,
        GermlineSelector::new("J", vec![toy_j()], None)?,
    ))
}

/// Germline databases of the toy genes, written in `dir`
#[cfg(test)]
#[allow(dead_code)]
pub fn write_toy_databases(dir: &Path) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let v = dir.join("v.fasta");
    let d = dir.join("d.fasta");
    let j = dir.join("j.fasta");
    let v_seq = toy_v_seq();
    // V body split over several lines
    fs::write(
        &v,
        format!(
            ">X62106|IGHV1-2*02|Homo sapiens|F|\n{}\n{}\n",
            &v_seq[..100],
            &v_seq[100..]
        ),
    )?;
    fs::write(&d, format!(">X13972|IGHD3-10*01|Homo sapiens|F|\n{}\n", D3_SEQ))?;
    fs::write(&j, format!(">J00256|IGHJ4*02|Homo sapiens|F|\n{}\n", J4_SEQ))?;
    Ok((v, d, j))
}
