//! Deterministic PRNG (spec §4.1).
//!
//! A Mulberry32-style 32-bit generator: small, fully state-exposing, and
//! built from nothing but wrapping integer arithmetic so the bit pattern it
//! produces is identical on every platform. Implements [`rand::RngCore`] so
//! it composes with the rest of the `rand` ecosystem (`Rng::gen_range`,
//! `Rng::gen_bool`, ...) without adopting `rand`'s own algorithms for the
//! core stream — the teacher reaches for `rand_chacha::ChaCha8Rng` for this
//! same reason (determinism you can hand someone else's API around), but
//! ChaCha8's state isn't exposable in the shape this simulation's
//! clone-and-diverge testing needs.

use rand::RngCore;

/// Deterministic uniform + normal stream. `clone()` copies both the
/// generator state and the Box–Muller spare, so a cloned stream is
/// independent from, but equal to, its parent from the clone point on.
#[derive(Debug, Clone, PartialEq)]
pub struct Rng {
    state: u32,
    spare: Option<f64>,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed,
            spare: None,
        }
    }

    /// Raw generator state, exposed for snapshotting/testing.
    pub fn state(&self) -> u32 {
        self.state
    }

    fn next_raw_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform `[0,1)`.
    pub fn uniform(&mut self) -> f64 {
        (self.next_raw_u32() as f64) / 4_294_967_296.0
    }

    /// Inclusive integer range `[lo,hi]` via truncated multiply.
    pub fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo <= hi);
        let span = (hi - lo + 1) as f64;
        lo + (self.uniform() * span).floor() as i64
    }

    /// Float range `[lo,hi)`.
    pub fn float_range(&mut self, lo: f64, hi: f64) -> f64 {
        debug_assert!(lo <= hi);
        lo + self.uniform() * (hi - lo)
    }

    /// `true` with probability `p` (clamped to `[0,1]`).
    pub fn bool_with_prob(&mut self, p: f64) -> bool {
        self.uniform() < p.clamp(0.0, 1.0)
    }

    /// Normal(μ,σ) via Box–Muller, caching the unused spare value across
    /// calls (and across clones) instead of discarding it.
    pub fn normal(&mut self, mu: f64, sigma: f64) -> f64 {
        if let Some(spare) = self.spare.take() {
            return mu + sigma * spare;
        }
        let mut u1;
        loop {
            u1 = self.uniform();
            if u1 > f64::EPSILON {
                break;
            }
        }
        let u2 = self.uniform();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = std::f64::consts::TAU * u2;
        let z0 = radius * theta.cos();
        let z1 = radius * theta.sin();
        self.spare = Some(z1);
        mu + sigma * z0
    }
}

impl RngCore for Rng {
    fn next_u32(&mut self) -> u32 {
        self.next_raw_u32()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_raw_u32() as u64;
        let lo = self.next_raw_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_raw_u32().to_le_bytes());
        }
        let rem = chunks.into_remainder();
        if !rem.is_empty() {
            let bytes = self.next_raw_u32().to_le_bytes();
            rem.copy_from_slice(&bytes[..rem.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Rng::new(1);
        let mut b = Rng::new(2);
        let seq_a: Vec<f64> = (0..10).map(|_| a.uniform()).collect();
        let seq_b: Vec<f64> = (0..10).map(|_| b.uniform()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_uniform_in_bounds() {
        let mut rng = Rng::new(7);
        for _ in 0..1000 {
            let v = rng.uniform();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_int_range_inclusive_bounds() {
        let mut rng = Rng::new(9);
        for _ in 0..1000 {
            let v = rng.int_range(3, 5);
            assert!((3..=5).contains(&v));
        }
    }

    #[test]
    fn test_clone_then_diverge_matches_until_mutation() {
        let mut original = Rng::new(123);
        original.uniform();
        original.uniform();
        let mut cloned = original.clone();
        for _ in 0..50 {
            assert_eq!(original.uniform(), cloned.uniform());
        }
    }

    #[test]
    fn test_clone_preserves_normal_spare() {
        let mut rng = Rng::new(55);
        let _ = rng.normal(0.0, 1.0);
        assert!(rng.spare.is_some());
        let mut cloned = rng.clone();
        assert_eq!(rng.spare, cloned.spare);
        assert_eq!(rng.normal(0.0, 1.0), cloned.normal(0.0, 1.0));
    }

    #[test]
    fn test_normal_distribution_roughly_centered() {
        let mut rng = Rng::new(77);
        let n = 5000;
        let sum: f64 = (0..n).map(|_| rng.normal(0.0, 1.0)).sum();
        let mean = sum / n as f64;
        assert!(mean.abs() < 0.1, "mean was {mean}");
    }
}
