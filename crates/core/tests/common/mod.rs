#![allow(dead_code)]

/// Small deterministic generator for test catalogs.
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

/// `n` points uniformly spread over the unit square.
pub fn unit_square(seed: u64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = XorShift64::new(seed);
    let x = (0..n).map(|_| rng.gen_f64(0.0, 1.0)).collect();
    let y = (0..n).map(|_| rng.gen_f64(0.0, 1.0)).collect();
    (x, y)
}

/// Regular `nx` by `ny` grid with unit spacing, column-major like a catalog
/// built by looping over x then y.
pub fn unit_grid(nx: usize, ny: usize) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::with_capacity(nx * ny);
    let mut y = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            x.push(i as f64);
            y.push(j as f64);
        }
    }
    (x, y)
}
