//! Randomness
//!
//! Random numbers in a range, shuffling and dice.

use rand::seq::SliceRandom;
use rand::Rng;

/// Random number in `[min, max)` with `decimals` digits after the point
///
/// The value is floored, never rounded. An empty range returns `min`.
pub fn random(min: f64, max: f64, decimals: u32) -> f64 {
    random_with(&mut rand::rng(), min, max, decimals)
}

/// [`random`] with a caller-supplied generator
pub fn random_with<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, decimals: u32) -> f64 {
    let modifier = 10f64.powi(decimals as i32);
    let (low, high) = (min * modifier, max * modifier);
    
    if high <= low {
        return min;
    }
    
    let scaled = (rng.random::<f64>() * (high - low) + low).floor();
    scaled / modifier
}

/// Random whole number in `[0, max)`
pub fn random_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    rand::rng().random_range(0..max)
}

/// Shuffle a slice in place
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut rand::rng());
}

/// Sum of `throws` rolls of a die with faces `0..sides`
pub fn dice(throws: u32, sides: u64) -> u64 {
    dice_with(&mut rand::rng(), throws, sides)
}

/// [`dice`] with a caller-supplied generator
pub fn dice_with<R: Rng + ?Sized>(rng: &mut R, throws: u32, sides: u64) -> u64 {
    if sides == 0 {
        return 0;
    }
    (0..throws).map(|_| rng.random_range(0..sides)).sum()
}
