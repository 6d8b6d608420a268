//! Shared functionalities: sequences, genes, alignment, sampling and I/O
pub mod alignment;
pub mod distributions;
pub mod gene;
pub mod output;
pub mod parameters;
pub mod parser;
pub mod selector;
pub mod sequence;

pub use alignment::{align, Blosum62, LocalAlignment, MatchMismatch, SubstitutionScore};
pub use distributions::{RandomSource, WeightedDistribution};
pub use gene::{family_name, gene_name, GermlineSequence, NameLevel};
pub use output::{FastaWriter, ReferenceWriter};
pub use parameters::{GeneratorConfiguration, JAlignmentParameters, RecombinationParameters};
pub use selector::GermlineSelector;
pub use sequence::{allowed_next, AminoAcid, Dna};
