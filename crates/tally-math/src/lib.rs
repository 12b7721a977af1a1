//! Domain functions for tally: integer summation and random integer
//! sequences under three distributions.
//!
//! The generators are generic over [`rand::Rng`] so callers pass
//! `rand::rng()` and tests pass a seeded `SmallRng` for determinism. Each
//! generator validates its inputs and returns a `Domain` error for
//! non-positive counts rather than panicking.

use std::f64::consts::TAU;

use rand::Rng;
use tally_types::error::{Result, TallyError};

/// Sum an arbitrary number of integers.
///
/// Overflow is a domain error, not a wrap or a panic.
pub fn sum(numbers: &[i64]) -> Result<i64> {
    numbers.iter().try_fold(0i64, |total, &n| {
        total
            .checked_add(n)
            .ok_or_else(|| TallyError::Domain("sum overflows a 64-bit integer".to_string()))
    })
}

fn check_count(count: i64) -> Result<usize> {
    if count <= 0 {
        return Err(TallyError::Domain("count must be positive".to_string()));
    }
    Ok(count as usize)
}

/// Generate `count` integers uniformly distributed in `[min, max]`.
///
/// Samples uniform reals over the closed range and rounds to the nearest
/// integer, so the endpoints carry half the weight of interior values.
pub fn uniform<R: Rng>(rng: &mut R, count: i64, min: i64, max: i64) -> Result<Vec<i64>> {
    let n = check_count(count)?;
    if min > max {
        return Err(TallyError::Domain(format!(
            "min ({min}) must not exceed max ({max})"
        )));
    }
    Ok((0..n)
        .map(|_| rng.random_range(min as f64..=max as f64).round() as i64)
        .collect())
}

/// Generate `count` integers from a normal distribution, truncated toward
/// zero.
pub fn normal<R: Rng>(rng: &mut R, count: i64, mean: f64, std_dev: f64) -> Result<Vec<i64>> {
    let n = check_count(count)?;
    Ok((0..n)
        .map(|_| (mean + std_dev * standard_normal(rng)) as i64)
        .collect())
}

/// Generate `count` integers from an exponential distribution with the given
/// scale (mean), truncated toward zero.
pub fn exponential<R: Rng>(rng: &mut R, count: i64, scale: f64) -> Result<Vec<i64>> {
    let n = check_count(count)?;
    if scale <= 0.0 {
        return Err(TallyError::Domain("scale must be positive".to_string()));
    }
    // Inverse CDF: -scale * ln(U) for U in (0, 1].
    Ok((0..n)
        .map(|_| {
            let u: f64 = 1.0 - rng.random::<f64>();
            (-scale * u.ln()) as i64
        })
        .collect())
}

/// One standard-normal sample via the Box-Muller transform.
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>(); // (0, 1], keeps ln finite
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}
