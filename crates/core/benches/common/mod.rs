use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("SHECLUST_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }

    /// Catalog sizes exercised at this tier.
    pub fn sizes(self) -> &'static [usize] {
        match self {
            Self::Quick => &[1_000, 10_000],
            Self::Full => &[1_000, 10_000, 100_000],
        }
    }
}

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }
}

/// Uniform catalog over a square of side `width`.
pub fn catalog(seed: u64, n: usize, width: f64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = XorShift64::new(seed);
    let x = (0..n).map(|_| rng.gen_f64(0.0, width)).collect();
    let y = (0..n).map(|_| rng.gen_f64(0.0, width)).collect();
    (x, y)
}
