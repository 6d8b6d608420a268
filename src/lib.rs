#![warn(clippy::large_types_passed_by_value)]

pub mod shared;
pub mod vdj;

pub use crate::shared::{
    align, allowed_next, AminoAcid, Dna, GeneratorConfiguration, GermlineSelector,
    GermlineSequence, RandomSource, RecombinationParameters, WeightedDistribution,
};
pub use crate::vdj::{GenerationResult, Generator, Recombination, Recombinator};
