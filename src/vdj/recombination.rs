//! Assemble one V(D)J sequence from a V, a D and a J germline gene.
//!
//! The assembly goes through the stages
//! `VAnchor -> Junction1 -> DCut -> Junction2 -> JAnchor -> Assemble`.
//! A missing anchor, or a junction that can't be made stop-free, aborts the
//! attempt (the caller draws new genes). When a D or J cut can't be made
//! stop-free the sequence is still built, but is no longer productive.
use crate::shared::distributions::RandomSource;
use crate::shared::gene::GermlineSequence;
use crate::shared::parameters::RecombinationParameters;
use crate::shared::sequence::{translate_slice, AminoAcid, Dna};
use crate::vdj::anchors::{find_v_anchor, JAnchorFinder};
use crate::vdj::junction::{insertion, InsertionKind};
use anyhow::{anyhow, Result};
use log::debug;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    VAnchor,
    Junction1,
    DCut,
    Junction2,
    JAnchor,
    Assemble,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::VAnchor => "V anchor",
            Stage::Junction1 => "V-D junction",
            Stage::DCut => "D cut",
            Stage::Junction2 => "D-J junction",
            Stage::JAnchor => "J anchor",
            Stage::Assemble => "J cut",
        };
        write!(f, "{}", name)
    }
}

/// Why a recombination attempt was abandoned
#[derive(Clone, Debug, PartialEq)]
pub enum RecombinationFailure {
    NoVAnchor { gene: String },
    VAnchorTooClose { gene: String, offset: usize, minimum: usize },
    JunctionExhausted { stage: Stage, attempts: usize },
    NoJAnchor { gene: String },
}

impl RecombinationFailure {
    pub fn stage(&self) -> Stage {
        match self {
            RecombinationFailure::NoVAnchor { .. } => Stage::VAnchor,
            RecombinationFailure::VAnchorTooClose { .. } => Stage::VAnchor,
            RecombinationFailure::JunctionExhausted { stage, .. } => *stage,
            RecombinationFailure::NoJAnchor { .. } => Stage::JAnchor,
        }
    }
}

impl fmt::Display for RecombinationFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecombinationFailure::NoVAnchor { gene } => {
                write!(f, "no conserved cysteine in the V gene {}", gene)
            }
            RecombinationFailure::VAnchorTooClose {
                gene,
                offset,
                minimum,
            } => write!(
                f,
                "the cysteine of {} is at position {} (minimum {})",
                gene, offset, minimum
            ),
            RecombinationFailure::JunctionExhausted { stage, attempts } => write!(
                f,
                "no stop-free {} found after {} attempts",
                stage, attempts
            ),
            RecombinationFailure::NoJAnchor { gene } => {
                write!(f, "no framework 4 anchor in the J gene {}", gene)
            }
        }
    }
}

impl std::error::Error for RecombinationFailure {}

/// A successfully assembled sequence
#[derive(Clone, Debug, PartialEq)]
pub struct Recombination {
    // labeled with the V, D and J names ("V,D,J")
    pub sequence: GermlineSequence,
    // 1-indexed position of the first CDR3 nucleotide
    pub cdr3_start: usize,
    // offset of the first nucleotide of the J anchor
    pub cdr3_end: usize,
    // in-frame CDR3 and no stop codon in the translation
    pub productive: bool,
    // stages where the stop-free constraint had to be given up
    pub soft_failures: Vec<Stage>,
}

impl Recombination {
    pub fn cdr3(&self) -> Dna {
        let start = (self.cdr3_start - 1).min(self.sequence.len());
        let end = self.cdr3_end.clamp(start, self.sequence.len());
        self.sequence.seq.extract_subsequence(start, end)
    }

    pub fn cdr3_aa(&self) -> AminoAcid {
        self.cdr3().translate()
    }
}

/// In-progress assembled sequence. `cdr3_begin` (0-indexed, right after the
/// V anchor codon) is in frame, so everything after it can be translated
/// on its own.
#[derive(Clone, Debug)]
struct RecombinationBuffer {
    assembled: GermlineSequence,
    cdr3_begin: usize,
}

impl RecombinationBuffer {
    fn len(&self) -> usize {
        self.assembled.len()
    }

    fn since_cdr3(&self) -> usize {
        self.len() - self.cdr3_begin
    }

    fn cdr3_so_far(&self) -> &[u8] {
        &self.assembled.seq.seq[self.cdr3_begin..]
    }

    fn push_insertion(&mut self, dna: &Dna) {
        self.assembled = self.assembled.extended(dna);
    }

    fn push_piece(&mut self, piece: &GermlineSequence) {
        self.assembled = self.assembled.append(piece);
    }

    /// true if `cdr3_so_far + piece` has no stop codon
    fn stop_free_with(&self, piece: &[u8]) -> bool {
        let mut candidate = self.cdr3_so_far().to_vec();
        candidate.extend_from_slice(piece);
        !translate_slice(&candidate).has_stop()
    }
}

#[derive(Clone, Debug)]
pub struct Recombinator {
    params: RecombinationParameters,
    v_anchor: u8,
    j_finder: JAnchorFinder,
}

impl Recombinator {
    pub fn new(params: &RecombinationParameters) -> Result<Recombinator> {
        params.check()?;
        if !params.v_anchor.is_ascii_alphabetic() {
            return Err(anyhow!("Invalid V anchor residue {}", params.v_anchor));
        }
        Ok(Recombinator {
            params: params.clone(),
            v_anchor: params.v_anchor.to_ascii_uppercase() as u8,
            j_finder: JAnchorFinder::new(params)?,
        })
    }

    pub fn params(&self) -> &RecombinationParameters {
        &self.params
    }

    /// Assemble `v`, `d` and `j`. If `productive`, junctions and cuts are
    /// drawn so that the CDR3 has no stop codon.
    pub fn recombine(
        &self,
        v: &GermlineSequence,
        d: &GermlineSequence,
        j: &GermlineSequence,
        productive: bool,
        rng: &mut dyn RandomSource,
    ) -> Result<Recombination, RecombinationFailure> {
        let mut enforce = productive;
        let mut soft_failures = Vec::new();

        let (mut buffer, cdr3_start) = self.cut_v(v, rng)?;

        self.junction(&mut buffer, Stage::Junction1, enforce, rng)?;

        if !self.cut_d(&mut buffer, d, enforce, rng) {
            debug!("D cut of {}: no stop-free cut found", d.name);
            soft_failures.push(Stage::DCut);
            enforce = false;
        }

        self.junction(&mut buffer, Stage::Junction2, enforce, rng)?;

        let anchor = self
            .j_finder
            .locate(&j.seq)
            .ok_or_else(|| RecombinationFailure::NoJAnchor {
                gene: j.name.clone(),
            })?;
        debug!(
            "J anchor of {} at {} ({:?}, frame {})",
            j.name, anchor.offset, anchor.method, anchor.frame
        );

        let (trim, stop_free) = self.cut_j(&buffer, j, anchor.offset, enforce, rng);
        if !stop_free {
            debug!("J cut of {}: no stop-free cut found", j.name);
            soft_failures.push(Stage::Assemble);
        }

        let cdr3_end = buffer.len() + anchor.offset.saturating_sub(trim);
        buffer.push_piece(&j.trimmed(trim.min(j.len()), j.len()));

        let mut sequence = buffer.assembled;
        if self.params.whole_codon {
            sequence = sequence.truncated(sequence.len() - sequence.len() % 3);
        }
        let productive = is_productive(&sequence.seq, buffer.cdr3_begin, cdr3_end);

        Ok(Recombination {
            sequence,
            cdr3_start,
            cdr3_end,
            productive,
            soft_failures,
        })
    }

    /// VAnchor: keep V up to the conserved cysteine plus a random part of
    /// what follows it. Returns the buffer and the 1-indexed CDR3 start.
    fn cut_v(
        &self,
        v: &GermlineSequence,
        rng: &mut dyn RandomSource,
    ) -> Result<(RecombinationBuffer, usize), RecombinationFailure> {
        let offset =
            find_v_anchor(&v.seq, self.v_anchor).ok_or_else(|| RecombinationFailure::NoVAnchor {
                gene: v.name.clone(),
            })?;
        if offset < self.params.min_v_anchor_offset {
            return Err(RecombinationFailure::VAnchorTooClose {
                gene: v.name.clone(),
                offset,
                minimum: self.params.min_v_anchor_offset,
            });
        }
        let cdr3_begin = offset + 3;
        let remainder = v.len().saturating_sub(cdr3_begin);
        let trim = rng.inclusive(0, remainder);
        let buffer = RecombinationBuffer {
            assembled: v.trimmed(0, v.len() - trim),
            cdr3_begin,
        };
        Ok((buffer, offset + 4))
    }

    /// Palindromic, random, then palindromic insertion
    fn junction(
        &self,
        buffer: &mut RecombinationBuffer,
        stage: Stage,
        enforce: bool,
        rng: &mut dyn RandomSource,
    ) -> Result<(), RecombinationFailure> {
        let steps = [
            (InsertionKind::Palindromic, self.params.max_palindrome_length),
            (InsertionKind::Random, self.params.max_random_insertion),
            (InsertionKind::Palindromic, self.params.max_palindrome_length),
        ];
        for (kind, max_length) in steps {
            let length = rng.inclusive(0, max_length);
            let ins = insertion(
                kind,
                length,
                buffer.cdr3_so_far(),
                enforce,
                self.params.max_attempts,
                rng,
            )
            .ok_or(RecombinationFailure::JunctionExhausted {
                stage,
                attempts: self.params.max_attempts,
            })?;
            buffer.push_insertion(&ins);
        }
        debug!("{}: CDR3 at {} nucleotides", stage, buffer.since_cdr3());
        Ok(())
    }

    /// DCut: trim both ends of D. Returns false if a stop-free cut was
    /// required and not found (the last cut drawn is used anyway).
    fn cut_d(
        &self,
        buffer: &mut RecombinationBuffer,
        d: &GermlineSequence,
        enforce: bool,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let max_cut = max_cut(d.len(), self.params.d_cut_fraction);
        let mut front = rng.inclusive(0, max_cut);
        let back = rng.inclusive(0, max_cut);
        let end = d.len() - back.min(d.len());

        let mut stop_free = true;
        if enforce {
            stop_free = false;
            for attempt in 0..self.params.max_attempts {
                if attempt > 0 {
                    front = rng.inclusive(0, max_cut);
                }
                if buffer.stop_free_with(&d.seq.seq[front.min(end)..end]) {
                    stop_free = true;
                    break;
                }
            }
        }
        buffer.push_piece(&d.trimmed(front.min(end), end));
        stop_free
    }

    /// Assemble: choose how much of the start of J is removed, keeping the
    /// J anchor in frame with the rest of the sequence. Returns the trim and
    /// false if a stop-free cut was required and not found.
    fn cut_j(
        &self,
        buffer: &RecombinationBuffer,
        j: &GermlineSequence,
        anchor: usize,
        enforce: bool,
        rng: &mut dyn RandomSource,
    ) -> (usize, bool) {
        let max_trim = max_cut(j.len(), self.params.j_cut_fraction).min(anchor);
        let draw = |rng: &mut dyn RandomSource| {
            let candidate = rng.inclusive(0, max_trim);
            frame_corrected_trim(candidate, anchor, buffer.len(), rng)
        };

        if !enforce {
            return (draw(rng), true);
        }
        let mut trim = 0;
        for _ in 0..self.params.max_attempts {
            trim = draw(rng);
            if buffer.stop_free_with(&j.seq.seq[trim.min(j.len())..]) {
                return (trim, true);
            }
        }
        (trim, false)
    }
}

/// Correct a J front trim so that, once J (minus `trim` nucleotides) is
/// appended to a sequence of length `buffer_len`, its anchor starts on a
/// codon boundary. The trim is moved down or up by at most 2; it never
/// increases past the anchor unless it can't decrease.
///```
/// use igsynth::vdj::recombination::frame_corrected_trim;
/// use rand::{rngs::SmallRng, SeedableRng};
/// let mut rng = SmallRng::seed_from_u64(0);
/// for trim in 0..=14 {
///     let t = frame_corrected_trim(trim, 14, 100, &mut rng);
///     assert_eq!((100 + 14 - t) % 3, 0);
/// }
///```
pub fn frame_corrected_trim(
    trim: usize,
    anchor: usize,
    buffer_len: usize,
    rng: &mut dyn RandomSource,
) -> usize {
    // nucleotides missing to complete the last codon of the buffer
    let extras = (3 - buffer_len % 3) % 3;
    if trim < anchor {
        let frame_offset = (anchor as i64 - trim as i64 - extras as i64).rem_euclid(3) as usize;
        let decrease = (3 - frame_offset) % 3;
        let can_decrease = trim >= decrease;
        let past_anchor = trim + frame_offset > anchor;
        if can_decrease && (rng.coin() || past_anchor) {
            trim - decrease
        } else {
            trim + frame_offset
        }
    } else {
        trim.saturating_sub(extras)
    }
}

/// Number of nucleotides that can be cut from a gene of length `len`
pub fn max_cut(len: usize, fraction: f64) -> usize {
    ((fraction * len as f64).ceil() as usize).min(len)
}

/// In-frame CDR3 (`cdr3_begin` is 0-indexed, right after the V anchor) and
/// no stop codon in the whole translation
pub fn is_productive(seq: &Dna, cdr3_begin: usize, cdr3_end: usize) -> bool {
    let in_frame = cdr3_end >= cdr3_begin && (cdr3_end - cdr3_begin) % 3 == 0;
    in_frame && !seq.contains_stop_codon()
}
