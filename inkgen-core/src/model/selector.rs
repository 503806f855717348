use rand::Rng;

use crate::error::{Result, SynthError};

/// Picks the mixture component that governs the next point.
///
/// Categorical draw proportional to `weights`. The weights are expected to
/// sum to 1 but are normalized by their actual total, so small drift from
/// the model is harmless.
///
/// # Errors
/// Returns [`SynthError::InvalidWeights`] if `weights` is empty, contains a
/// negative or non-finite value, or sums to zero.
///
/// # Notes
/// Consumes exactly one uniform draw from `rng`.
pub fn select<R: Rng>(weights: &[f32], rng: &mut R) -> Result<usize> {
	if weights.is_empty() {
		return Err(SynthError::InvalidWeights("no weights to select from".to_owned()));
	}
	if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
		return Err(SynthError::InvalidWeights(format!("weight {bad} is not a finite non-negative number")));
	}

	let total: f64 = weights.iter().map(|w| *w as f64).sum();
	if total <= 0.0 {
		return Err(SynthError::InvalidWeights("weights sum to zero".to_owned()));
	}

	let mut r = rng.random::<f64>() * total;

	let mut fallback = 0;
	for (index, weight) in weights.iter().enumerate() {
		let weight = *weight as f64;
		if weight <= 0.0 {
			continue;
		}
		if r < weight {
			return Ok(index);
		}
		r -= weight;
		fallback = index;
	}

	// Rounding can leave `r` a hair above the last bucket.
	Ok(fallback)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	#[test]
	fn single_component_is_always_chosen() {
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		for _ in 0..100 {
			assert_eq!(select(&[1.0], &mut rng).unwrap(), 0);
		}
	}

	#[test]
	fn zero_weight_components_are_never_chosen() {
		let mut rng = ChaCha8Rng::seed_from_u64(2);
		for _ in 0..1000 {
			let index = select(&[0.0, 0.5, 0.0, 0.5, 0.0], &mut rng).unwrap();
			assert!(index == 1 || index == 3, "picked {index}");
		}
	}

	#[test]
	fn frequencies_follow_weights() {
		let mut rng = ChaCha8Rng::seed_from_u64(3);
		let weights = [0.2, 0.5, 0.3];
		let mut counts = [0usize; 3];
		let n = 30_000;
		for _ in 0..n {
			counts[select(&weights, &mut rng).unwrap()] += 1;
		}
		for (count, weight) in counts.iter().zip(weights) {
			let freq = *count as f32 / n as f32;
			assert!((freq - weight).abs() < 0.02, "freq={freq} weight={weight}");
		}
	}

	#[test]
	fn unnormalized_weights_are_tolerated() {
		let mut rng = ChaCha8Rng::seed_from_u64(4);
		let mut counts = [0usize; 2];
		for _ in 0..10_000 {
			counts[select(&[3.0, 1.0], &mut rng).unwrap()] += 1;
		}
		let freq = counts[0] as f32 / 10_000.0;
		assert!((freq - 0.75).abs() < 0.03, "freq={freq}");
	}

	#[test]
	fn invalid_weights_are_rejected() {
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		assert!(matches!(select(&[], &mut rng), Err(SynthError::InvalidWeights(_))));
		assert!(matches!(select(&[0.0, 0.0], &mut rng), Err(SynthError::InvalidWeights(_))));
		assert!(matches!(select(&[0.5, -0.5, 1.0], &mut rng), Err(SynthError::InvalidWeights(_))));
		assert!(matches!(select(&[f32::NAN, 1.0], &mut rng), Err(SynthError::InvalidWeights(_))));
	}

	#[test]
	fn deterministic_given_seed() {
		let weights = [0.1, 0.2, 0.3, 0.4];
		let mut a = ChaCha8Rng::seed_from_u64(99);
		let mut b = ChaCha8Rng::seed_from_u64(99);
		let picks_a: Vec<usize> = (0..64).map(|_| select(&weights, &mut a).unwrap()).collect();
		let picks_b: Vec<usize> = (0..64).map(|_| select(&weights, &mut b).unwrap()).collect();
		assert_eq!(picks_a, picks_b);
	}
}
