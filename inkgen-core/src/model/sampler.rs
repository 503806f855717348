use rand::Rng;
use rand_distr::{Bernoulli, Distribution, StandardNormal};

use crate::error::{Result, SynthError};
use crate::geometry::Point;

/// Draws one point from a bivariate normal plus a Bernoulli pen-lift.
///
/// The displacement follows `N((mu1, mu2), Σ)` with
/// `Σ = [[std1², std1·std2·rho], [std1·std2·rho, std2²]]`. It is drawn
/// through the Cholesky factor of `Σ`:
///
/// ```text
/// dx = mu1 + std1 · z1
/// dy = mu2 + std2 · (rho · z1 + sqrt(1 - rho²) · z2)
/// ```
///
/// with `z1, z2` standard normal. `pen_lift` is a single Bernoulli trial with
/// success probability `end_probability`.
///
/// # Errors
/// - [`SynthError::InvalidCovariance`] if a std is not a finite positive number,
///   `|rho| >= 1`, or a mean is not finite. No clamping is attempted.
/// - [`SynthError::InvalidProbability`] if `end_probability` is outside `[0, 1]`.
/// - [`SynthError::NonFiniteSample`] if the draw does not fit in an `f32`.
///
/// # Notes
/// Entropy is drawn in a fixed order (`z1`, `z2`, then the Bernoulli trial),
/// so a seeded stream always gives the same point.
pub fn sample<R: Rng>(
	rng: &mut R,
	end_probability: f32,
	mu1: f32,
	mu2: f32,
	std1: f32,
	std2: f32,
	rho: f32,
) -> Result<Point> {
	let valid_std = |s: f32| s.is_finite() && s > 0.0;
	if !valid_std(std1) || !valid_std(std2) || !rho.is_finite() || rho.abs() >= 1.0 {
		return Err(SynthError::InvalidCovariance { std1, std2, rho });
	}
	if !mu1.is_finite() || !mu2.is_finite() {
		return Err(SynthError::InvalidCovariance { std1, std2, rho });
	}
	let pen = Bernoulli::new(end_probability as f64)
		.map_err(|_| SynthError::InvalidProbability(end_probability))?;

	let z1: f32 = StandardNormal.sample(rng);
	let z2: f32 = StandardNormal.sample(rng);

	let (z1, z2, rho) = (z1 as f64, z2 as f64, rho as f64);
	let x = (mu1 as f64 + std1 as f64 * z1) as f32;
	let y = (mu2 as f64 + std2 as f64 * (rho * z1 + (1.0 - rho * rho).sqrt() * z2)) as f32;
	let pen_lift = pen.sample(rng);

	// Huge stds can push a draw past the f32 range
	if !x.is_finite() || !y.is_finite() {
		return Err(SynthError::NonFiniteSample { x, y });
	}
	Ok(Point::new(x, y, pen_lift))
}
