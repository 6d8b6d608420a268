use anyhow::Result;
use igsynth::shared::sequence::translate_slice;
use igsynth::vdj::junction::{insertion, trailing_partial_codon};
use igsynth::vdj::{palindromic_insertion, random_insertion, InsertionKind};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn test_palindromes() -> Result<()> {
    for seed in 0..50 {
        let mut rng = SmallRng::seed_from_u64(seed);
        for n in [0, 2, 4, 6, 8] {
            let p = palindromic_insertion(n, b"", false, &mut rng);
            assert_eq!(p.len(), n);
            assert_eq!(
                p.extract_subsequence(n / 2, n),
                p.extract_subsequence(0, n / 2).reverse_complement()
            );
            assert_eq!(p.reverse_complement(), p);
        }
    }
    Ok(())
}

#[test]
fn test_odd_palindromes() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1);
    for n in [1, 3, 5, 7] {
        let p = palindromic_insertion(n, b"", false, &mut rng);
        assert_eq!(p.len(), n);
        // middle nucleotide, then the mirrored first half
        assert_eq!(
            p.extract_subsequence(n / 2 + 1, n),
            p.extract_subsequence(0, n / 2).reverse_complement()
        );
    }
    Ok(())
}

#[test]
fn test_random_insertion_follows_context() -> Result<()> {
    for seed in 0..200 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let after_ta = random_insertion(4, b"CAGTA", true, &mut rng);
        assert!(after_ta.seq[0] == b'C' || after_ta.seq[0] == b'T');
        let after_tg = random_insertion(4, b"TG", true, &mut rng);
        assert_ne!(after_tg.seq[0], b'A');
    }
    assert_eq!(trailing_partial_codon(b"CAGTA"), b"TA");
    assert_eq!(trailing_partial_codon(b"CAG"), b"");
    Ok(())
}

#[test]
fn test_productive_insertions_are_stop_free() -> Result<()> {
    let contexts: [&[u8]; 5] = [b"", b"T", b"TA", b"TG", b"GCGTG"];
    for seed in 0..100 {
        let mut rng = SmallRng::seed_from_u64(seed);
        for context in contexts {
            for length in 0..=8 {
                for kind in [InsertionKind::Palindromic, InsertionKind::Random] {
                    let ins = insertion(kind, length, context, true, 100_000, &mut rng).unwrap();
                    assert_eq!(ins.len(), length);
                    let mut full = context.to_vec();
                    full.extend_from_slice(&ins.seq);
                    assert!(!translate_slice(&full).has_stop());
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_insertion_exhausted() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    // the context already holds a stop codon
    let ins = insertion(InsertionKind::Random, 3, b"TAA", true, 10, &mut rng);
    assert!(ins.is_none());
    // no constraint when the sequence doesn't need to be productive
    let ins = insertion(InsertionKind::Random, 3, b"TAA", false, 10, &mut rng);
    assert_eq!(ins.map(|d| d.len()), Some(3));
    Ok(())
}
