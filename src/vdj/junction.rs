//! Junctional insertions: palindromic (P) and random (N) nucleotides
use crate::shared::distributions::RandomSource;
use crate::shared::sequence::{allowed_next, complement, translate_slice, Dna, NUCLEOTIDES};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertionKind {
    Palindromic,
    Random,
}

/// Keeps track of the codon being filled while nucleotides are added, so
/// that the stop-codon-safe choice knows what precedes.
struct CodonTracker {
    partial: Vec<u8>,
}

impl CodonTracker {
    /// `context` is the sequence so far, read in frame from its start
    fn new(context: &[u8]) -> CodonTracker {
        CodonTracker {
            partial: trailing_partial_codon(context).to_vec(),
        }
    }

    fn push(&mut self, nucleotide: u8) {
        self.partial.push(nucleotide);
        if self.partial.len() == 3 {
            self.partial.clear();
        }
    }

    fn choose(&mut self, productive: bool, rng: &mut dyn RandomSource) -> u8 {
        let allowed: &[u8] = if productive {
            allowed_next(&self.partial)
        } else {
            &NUCLEOTIDES
        };
        let nucleotide = allowed[rng.index(allowed.len())];
        self.push(nucleotide);
        nucleotide
    }
}

/// Bases after the last complete codon of `context`
pub fn trailing_partial_codon(context: &[u8]) -> &[u8] {
    &context[context.len() - context.len() % 3..]
}

/// Palindromic insertion of `length` nucleotides: a random first half, a
/// middle nucleotide if `length` is odd, then the reverse complement of
/// the first half.
///```
/// use igsynth::vdj::junction::palindromic_insertion;
/// use rand::{rngs::SmallRng, SeedableRng};
/// let mut rng = SmallRng::seed_from_u64(3);
/// let p = palindromic_insertion(6, b"", false, &mut rng);
/// assert_eq!(p.extract_subsequence(3, 6), p.extract_subsequence(0, 3).reverse_complement());
///```
pub fn palindromic_insertion(
    length: usize,
    context: &[u8],
    productive: bool,
    rng: &mut dyn RandomSource,
) -> Dna {
    let mut tracker = CodonTracker::new(context);
    let mut seq = Vec::with_capacity(length);
    for _ in 0..length / 2 {
        seq.push(tracker.choose(productive, rng));
    }
    if length % 2 == 1 {
        seq.push(tracker.choose(productive, rng));
    }
    let mirror: Vec<u8> = seq[..length / 2]
        .iter()
        .rev()
        .filter_map(|&n| complement(n))
        .collect();
    seq.extend(mirror);
    Dna { seq }
}

/// Random (non-templated) insertion of `length` nucleotides
pub fn random_insertion(
    length: usize,
    context: &[u8],
    productive: bool,
    rng: &mut dyn RandomSource,
) -> Dna {
    let mut tracker = CodonTracker::new(context);
    Dna {
        seq: (0..length)
            .map(|_| tracker.choose(productive, rng))
            .collect(),
    }
}

/// Generate an insertion of the given kind and length after `context`
/// (the in-frame sequence so far). If `productive`, the insertion is redrawn
/// until `context + insertion` translates without stop codon, at most
/// `max_attempts` times; `None` if no attempt worked.
pub fn insertion(
    kind: InsertionKind,
    length: usize,
    context: &[u8],
    productive: bool,
    max_attempts: usize,
    rng: &mut dyn RandomSource,
) -> Option<Dna> {
    let generate = |rng: &mut dyn RandomSource| match kind {
        InsertionKind::Palindromic => palindromic_insertion(length, context, productive, rng),
        InsertionKind::Random => random_insertion(length, context, productive, rng),
    };

    if !productive {
        return Some(generate(rng));
    }

    let mut candidate = Vec::with_capacity(context.len() + length);
    for _ in 0..max_attempts {
        let ins = generate(rng);
        candidate.clear();
        candidate.extend_from_slice(context);
        candidate.extend_from_slice(&ins.seq);
        if !translate_slice(&candidate).has_stop() {
            return Some(ins);
        }
    }
    None
}
