use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/// Input parameters for one generation run.
///
/// # Responsibilities
/// - Track the sampling bias handed to the model on every step
/// - Track the termination policy (`force_run`, `finish_threshold`) and the
///   step budget (`max_steps_per_char`)
/// - Carry an optional seed for reproducible runs
///
/// # Invariants
/// - `bias` is finite and `>= 0`
/// - `finish_threshold` lies in `[0, 1]`
/// - `max_steps_per_char >= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
	/// Higher bias narrows the sampled variance: cleaner strokes, less diversity.
	bias: f32,

	/// Ignore the model's finish signal and always spend the whole step budget.
	pub force_run: bool,

	/// Step budget per input character.
	max_steps_per_char: usize,

	/// The run stops once the finish probability is strictly above this value.
	finish_threshold: f32,

	/// Seed of the random stream; `None` draws one from the OS.
	pub seed: Option<u64>,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			bias: 1.0,
			force_run: false,
			max_steps_per_char: 60,
			finish_threshold: 0.8,
			seed: None,
		}
	}
}

impl GenerationConfig {
	pub fn bias(&self) -> f32 {
		self.bias
	}

	pub fn max_steps_per_char(&self) -> usize {
		self.max_steps_per_char
	}

	pub fn finish_threshold(&self) -> f32 {
		self.finish_threshold
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	pub fn with_force_run(mut self, force_run: bool) -> Self {
		self.force_run = force_run;
		self
	}

	/// Step budget for a text of `char_count` characters.
	///
	/// # Errors
	/// Returns an error if the budget does not fit in a `usize`.
	pub fn max_steps(&self, char_count: usize) -> Result<usize> {
		self.max_steps_per_char.checked_mul(char_count).ok_or_else(|| {
			SynthError::InvalidConfig(format!(
				"step budget of {} per char overflows for {char_count} chars",
				self.max_steps_per_char
			))
		})
	}

	/// Sets the sampling bias.
	///
	/// # Errors
	/// Returns an error if `bias` is negative or not finite.
	pub fn set_bias(&mut self, bias: f32) -> Result<()> {
		if !bias.is_finite() || bias < 0.0 {
			return Err(SynthError::InvalidConfig(format!("bias must be a finite value >= 0, got {bias}")));
		}
		self.bias = bias;
		Ok(())
	}

	/// Sets the per-character step budget.
	///
	/// # Errors
	/// Returns an error if `steps` is zero.
	pub fn set_max_steps_per_char(&mut self, steps: usize) -> Result<()> {
		if steps == 0 {
			return Err(SynthError::InvalidConfig("max_steps_per_char must be >= 1".to_owned()));
		}
		self.max_steps_per_char = steps;
		Ok(())
	}

	/// Sets the finish probability threshold, in `[0.0, 1.0]` inclusive.
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_finish_threshold(&mut self, threshold: f32) -> Result<()> {
		if !(0.0..=1.0).contains(&threshold) {
			return Err(SynthError::InvalidConfig(format!(
				"finish_threshold must be between 0.0 and 1.0, got {threshold}"
			)));
		}
		self.finish_threshold = threshold;
		Ok(())
	}

	/// Re-checks every invariant, for configs that did not go through the
	/// setters (deserialized ones).
	pub fn validate(&self) -> Result<()> {
		let mut copy = self.clone();
		copy.set_bias(self.bias)?;
		copy.set_max_steps_per_char(self.max_steps_per_char)?;
		copy.set_finish_threshold(self.finish_threshold)?;
		Ok(())
	}
}
