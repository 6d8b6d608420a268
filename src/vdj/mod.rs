//! V(D)J recombination: anchors, junctions, assembly and generation

pub mod anchors;
pub mod generator;
pub mod junction;
pub mod recombination;

// Re-exporting for public API
pub use self::anchors::{find_v_anchor, JAnchor, JAnchorFinder, JAnchorMethod};
pub use self::generator::{load_locus, GenerationResult, Generator};
pub use self::junction::{palindromic_insertion, random_insertion, InsertionKind};
pub use self::recombination::{Recombination, RecombinationFailure, Recombinator, Stage};
