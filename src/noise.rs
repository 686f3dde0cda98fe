//! Seeded 2D gradient noise.
//!
//! [`NoiseSeed`] owns the shuffled permutation table; [`NoiseField`] evaluates
//! classic Perlin noise against it. Both are immutable after construction, so
//! a field can be sampled from any number of threads at once.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// 256 shuffled lattice hashes, stored twice so `perm[i + 1]` never wraps.
#[derive(Clone)]
pub struct NoiseSeed {
    value: u64,
    perm: [u8; 512],
}

impl NoiseSeed {
    /// Shuffles the identity permutation with a ChaCha stream keyed by `seed`.
    ///
    /// The same seed produces the same table on every platform.
    pub fn new(seed: u64) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);

        Self { value: seed, perm }
    }

    /// The seed this table was shuffled from.
    pub fn value(&self) -> u64 {
        self.value
    }

    #[inline]
    fn hash(&self, i: usize) -> u8 {
        self.perm[i]
    }
}

impl std::fmt::Debug for NoiseSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSeed").field("value", &self.value).finish()
    }
}

/// Continuous 2D Perlin noise over the whole plane.
///
/// `sample` is a pure function of its inputs and the seed: no caching, no
/// grid bounds. Output lies in `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: NoiseSeed,
}

impl NoiseField {
    /// Creates a noise field keyed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed: NoiseSeed::new(seed),
        }
    }

    /// Creates a noise field from an existing permutation table.
    pub fn from_seed(seed: NoiseSeed) -> Self {
        Self { seed }
    }

    /// The permutation table behind this field.
    pub fn seed(&self) -> &NoiseSeed {
        &self.seed
    }

    /// Samples the noise at `(x, y)`.
    ///
    /// Integer lattice points always evaluate to exactly `0.0`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = lattice(xf);
        let yi = lattice(yf);
        let dx = x - xf;
        let dy = y - yf;

        let u = fade(dx);
        let v = fade(dy);

        let p = &self.seed;
        let a = p.hash(xi) as usize + yi;
        let b = p.hash(xi + 1) as usize + yi;

        let n00 = grad(p.hash(a), dx, dy);
        let n10 = grad(p.hash(b), dx - 1.0, dy);
        let n01 = grad(p.hash(a + 1), dx, dy - 1.0);
        let n11 = grad(p.hash(b + 1), dx - 1.0, dy - 1.0);

        let value = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);
        // Guards against non-finite input as much as against overshoot.
        if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 }
    }
}

/// Wraps a floored coordinate onto the 256-cell lattice.
#[inline]
fn lattice(floored: f64) -> usize {
    // `as i64` saturates for huge inputs; `& 255` keeps negatives in range.
    ((floored as i64) & 255) as usize
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Dot product of the offset with one of eight lattice gradients.
#[inline]
fn grad(hash: u8, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}
