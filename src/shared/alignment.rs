//! Local (Smith-Waterman) alignment with linear gap costs, used to find the
//! framework anchor of J genes when the motif can't be found directly.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

// tolerance when comparing scores during the backtrace
const EPSILON: f64 = 1e-5;

/// Symmetric substitution score between two symbols
pub trait SubstitutionScore {
    fn score(&self, a: u8, b: u8) -> f64;
}

/// Simple match / mismatch table, for nucleotides
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchMismatch {
    pub match_score: f64,
    pub mismatch_score: f64,
}

impl Default for MatchMismatch {
    fn default() -> MatchMismatch {
        MatchMismatch {
            match_score: 1.,
            mismatch_score: -1.,
        }
    }
}

impl SubstitutionScore for MatchMismatch {
    fn score(&self, a: u8, b: u8) -> f64 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// BLOSUM62, for amino-acids
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Blosum62;

impl SubstitutionScore for Blosum62 {
    fn score(&self, a: u8, b: u8) -> f64 {
        let known = |x: u8| x.is_ascii_uppercase() || x == b'*';
        if !(known(a) && known(b)) {
            // lowest value of the matrix
            return -4.;
        }
        bio::scores::blosum62(a, b) as f64
    }
}

/// Result of a local alignment. `start..end` is the aligned span in the
/// first sequence, `query_start..query_end` the one in the second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalAlignment {
    pub score: f64,
    pub start: usize,
    pub end: usize,
    pub query_start: usize,
    pub query_end: usize,
}

impl LocalAlignment {
    /// true when nothing was aligned
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }
}

/// Align `seq2` locally inside `seq1`.
///
/// `M[i][j]` (row `i` runs along `seq2`, column `j` along `seq1`) is the
/// best score of an alignment ending at `seq1[j-1]`, `seq2[i-1]`, floored at
/// 0. The first maximum met during the fill is kept. The backtrace tries,
/// in that order, a deletion (up), an insertion (left) and a diagonal step,
/// and stops on a zero cell, or as soon as no predecessor explains the
/// current value.
///```
/// use igsynth::shared::alignment::{align, MatchMismatch};
/// let al = align(b"TTACGTAA", b"ACGT", -2., -2., &MatchMismatch::default());
/// assert_eq!((al.start, al.end), (2, 6));
/// assert_eq!(al.score, 4.);
///```
pub fn align<S: SubstitutionScore + ?Sized>(
    seq1: &[u8],
    seq2: &[u8],
    insertion_cost: f64,
    deletion_cost: f64,
    score_table: &S,
) -> LocalAlignment {
    let mut m = Array2::<f64>::zeros((seq2.len() + 1, seq1.len() + 1));

    let mut best = 0.;
    let (mut imax, mut jmax) = (0, 0);
    for i in 1..=seq2.len() {
        for j in 1..=seq1.len() {
            let value = (m[[i - 1, j]] + deletion_cost)
                .max(m[[i, j - 1]] + insertion_cost)
                .max(m[[i - 1, j - 1]] + score_table.score(seq1[j - 1], seq2[i - 1]))
                .max(0.);
            m[[i, j]] = value;
            if value > best {
                best = value;
                imax = i;
                jmax = j;
            }
        }
    }

    let (mut i, mut j) = (imax, jmax);
    while m[[i, j]] > 0. {
        let current = m[[i, j]];
        if i > 0 && (current - (m[[i - 1, j]] + deletion_cost)).abs() < EPSILON {
            i -= 1;
        } else if j > 0 && (current - (m[[i, j - 1]] + insertion_cost)).abs() < EPSILON {
            j -= 1;
        } else if i > 0
            && j > 0
            && (current
                - (m[[i - 1, j - 1]] + score_table.score(seq1[j - 1], seq2[i - 1])))
            .abs()
                < EPSILON
        {
            i -= 1;
            j -= 1;
        } else {
            // nothing explains this cell, the alignment starts here
            break;
        }
    }

    LocalAlignment {
        score: best,
        start: j,
        end: jmax,
        query_start: i,
        query_end: imax,
    }
}
