//! Deterministic cell-index permutation.
//!
//! Encoder and decoder must scatter bits over the carrier in exactly the same
//! order without exchanging state, so the order derives entirely from a small
//! integer the carrier itself discloses (image dimensions, audio frame count).
//! The integer is expanded to a full PRNG seed with HKDF-SHA256 under a fixed
//! domain salt, and a ChaCha20-driven Fisher-Yates shuffle of the identity
//! sequence yields the permutation. Each call builds a fresh generator; there
//! is no process-wide PRNG state.

use hkdf::Hkdf;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// HKDF domain salt for permutation seeds.
const SALT_PERMUTE: &[u8] = b"VEILBYTE-PERMUTE-V1";

/// Returns a permutation of `[0, capacity)` fully determined by `seed`.
pub fn permutation(seed: u64, capacity: usize) -> Vec<usize> {
    let mut rng = ChaCha20Rng::from_seed(expand_seed(seed));

    let mut indices: Vec<usize> = (0..capacity).collect();
    indices.shuffle(&mut rng);
    indices
}

/// Expands the integer seed into a 32-byte ChaCha20 seed.
fn expand_seed(seed: u64) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(SALT_PERMUTE), &seed.to_be_bytes());
    let mut output = [0u8; 32];
    hk.expand(b"cell-order", &mut output)
        .expect("HKDF expand should not fail");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_equal_seeds() {
        let a = permutation(42, 1000);
        let b = permutation(42, 1000);

        assert_eq!(a, b);
    }

    #[test]
    fn is_a_permutation() {
        let mut perm = permutation(7, 500);
        perm.sort_unstable();

        let identity: Vec<usize> = (0..500).collect();
        assert_eq!(perm, identity);
    }

    #[test]
    fn different_seeds_differ() {
        let a = permutation(42, 1000);
        let b = permutation(43, 1000);

        assert_ne!(a, b);
    }

    #[test]
    fn empty_capacity() {
        assert!(permutation(42, 0).is_empty());
    }

    #[test]
    fn single_cell() {
        assert_eq!(permutation(42, 1), vec![0]);
    }
}
