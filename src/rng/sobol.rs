// src/rng/sobol.rs
//! Sobol low-discrepancy sequence (Gray-code / Antonov–Saleev ordering).
//!
//! The first dimension is the van der Corput sequence in base 2. The next
//! dimensions use the Joe–Kuo primitive polynomials and initial direction
//! numbers; beyond that table, direction numbers are generated from a fixed
//! hash (odd `m_k < 2^k`), which keeps the digital-net structure per
//! dimension. The all-zero first point is never emitted.

use crate::error::{SdeError, SdeResult};

const BITS: usize = 64;
const INV_U64_RANGE: f64 = 1.0 / 18_446_744_073_709_551_616.0;
const TAIL_SEED: u64 = 0x5EED_50B0_1D1E_C7A5;

/// `(degree s, coefficients a, initial m_1..m_s)` for dimensions 2, 3, ...
const JOE_KUO: &[(usize, u64, &[u64])] = &[
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

#[derive(Debug, Clone)]
pub struct SobolSequence {
    dimensions: usize,
    index: u64,
    x: Vec<u64>,
    directions: Vec<[u64; BITS]>,
}

impl SobolSequence {
    pub fn new(dimensions: usize) -> SdeResult<Self> {
        if dimensions == 0 {
            return Err(SdeError::RandomGeneration {
                reason: "Sobol sequence needs at least one dimension".to_string(),
            });
        }

        Ok(Self {
            dimensions,
            index: 0,
            x: vec![0; dimensions],
            directions: (0..dimensions).map(direction_numbers).collect(),
        })
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Positions the sequence so that the next emitted point is point
    /// `index + 1`, i.e. the first `index` non-zero points are discarded.
    pub fn skip_to(&mut self, index: u64) {
        self.index = index;
        let gray = index ^ (index >> 1);
        for (x, directions) in self.x.iter_mut().zip(&self.directions) {
            *x = (0..BITS)
                .filter(|&bit| (gray >> bit) & 1 == 1)
                .fold(0, |acc, bit| acc ^ directions[bit]);
        }
    }

    /// Advances the sequence and writes the next point into `out`.
    pub fn next_into(&mut self, out: &mut [f64]) -> SdeResult<()> {
        let next_index = self.index.checked_add(1).ok_or_else(|| SdeError::RandomGeneration {
            reason: "Sobol sequence exhausted".to_string(),
        })?;
        let c = next_index.trailing_zeros() as usize;
        self.index = next_index;

        for ((x, directions), u) in self.x.iter_mut().zip(&self.directions).zip(out.iter_mut()) {
            *x ^= directions[c];
            *u = *x as f64 * INV_U64_RANGE;
        }
        Ok(())
    }
}

fn direction_numbers(dim: usize) -> [u64; BITS] {
    let mut v = [0_u64; BITS];

    if dim == 0 {
        for (k, item) in v.iter_mut().enumerate() {
            *item = 1_u64 << (63 - k);
        }
        return v;
    }

    if let Some(&(s, a, m)) = JOE_KUO.get(dim - 1) {
        for k in 0..s {
            v[k] = m[k] << (63 - k);
        }
        for k in s..BITS {
            let mut value = v[k - s] ^ (v[k - s] >> s);
            for i in 1..s {
                if (a >> (s - 1 - i)) & 1 == 1 {
                    value ^= v[k - i];
                }
            }
            v[k] = value;
        }
        return v;
    }

    for (k, item) in v.iter_mut().enumerate() {
        let hash = splitmix64(TAIL_SEED ^ ((dim as u64 + 1) << 40) ^ k as u64);
        let mask = if k == 63 {
            u64::MAX
        } else {
            (1_u64 << (k + 1)) - 1
        };
        *item = ((hash | 1) & mask) << (63 - k);
    }
    v
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
