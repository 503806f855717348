use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MalformedOutput, Result};
use crate::geometry::Point;
use super::sampler;

/// One bivariate Gaussian of a mixture density output.
///
/// # Invariants (checked by [`MixtureParameters::validate`])
/// - `weight >= 0`
/// - `std1 > 0`, `std2 > 0`
/// - `-1 < rho < 1`
/// - every field finite
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MixtureComponent {
	pub weight: f32,
	pub mu1: f32,
	pub mu2: f32,
	pub std1: f32,
	pub std2: f32,
	pub rho: f32,
}

impl MixtureComponent {
	/// Draws the next point from this component.
	///
	/// See [`sampler::sample`].
	pub fn sample<R: Rng>(&self, end_probability: f32, rng: &mut R) -> Result<Point> {
		sampler::sample(rng, end_probability, self.mu1, self.mu2, self.std1, self.std2, self.rho)
	}

	fn check(&self, component: usize) -> std::result::Result<(), MalformedOutput> {
		let fields = [
			("weight", self.weight),
			("mu1", self.mu1),
			("mu2", self.mu2),
			("std1", self.std1),
			("std2", self.std2),
			("rho", self.rho),
		];
		for (field, value) in fields {
			if !value.is_finite() {
				return Err(MalformedOutput::NonFinite { component, field });
			}
		}
		if self.weight < 0.0 {
			return Err(MalformedOutput::NegativeWeight { component, value: self.weight });
		}
		for value in [self.std1, self.std2] {
			if value <= 0.0 {
				return Err(MalformedOutput::NonPositiveStd { component, value });
			}
		}
		if self.rho <= -1.0 || self.rho >= 1.0 {
			return Err(MalformedOutput::RhoOutOfRange { component, value: self.rho });
		}
		Ok(())
	}
}

/// Mixture density output of a single model step.
///
/// Weights are expected to sum to 1 but this is the model's guarantee; the
/// selector normalizes anyway.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MixtureParameters {
	pub components: Vec<MixtureComponent>,
	/// Bernoulli probability that the pen lifts after the next point.
	pub end_probability: f32,
}

impl MixtureParameters {
	pub fn new(components: Vec<MixtureComponent>, end_probability: f32) -> Self {
		Self { components, end_probability }
	}

	/// Number of mixture components (`K`).
	pub fn len(&self) -> usize {
		self.components.len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.is_empty()
	}

	pub fn weights(&self) -> Vec<f32> {
		self.components.iter().map(|c| c.weight).collect()
	}

	/// Checks the output contract of the model.
	///
	/// Nothing is clamped: a violation means the model is broken and the run
	/// must not go on with it.
	pub fn validate(&self) -> std::result::Result<(), MalformedOutput> {
		if self.components.is_empty() {
			return Err(MalformedOutput::NoComponents);
		}
		if !(0.0..=1.0).contains(&self.end_probability) {
			return Err(MalformedOutput::EndProbabilityOutOfRange(self.end_probability));
		}
		for (index, component) in self.components.iter().enumerate() {
			component.check(index)?;
		}
		let total: f32 = self.components.iter().map(|c| c.weight).sum();
		if total <= 0.0 {
			return Err(MalformedOutput::ZeroWeights);
		}
		Ok(())
	}
}
