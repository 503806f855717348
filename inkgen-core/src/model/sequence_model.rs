use serde::{Deserialize, Serialize};

use crate::error::{MalformedOutput, Result};
use crate::geometry::Point;
use super::mixture::MixtureParameters;
use super::vocabulary::EncodedText;

/// Everything a sequence model returns for one step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelOutput {
	/// Mixture density over the next displacement and pen state.
	pub mixture: MixtureParameters,
	/// Attention weight over text positions (`phi`), one value per character
	/// plus the terminal position.
	pub phi: Vec<f32>,
	/// Attention window: the phi-weighted sum of the one-hot text rows, one
	/// value per vocabulary entry.
	pub window: Vec<f32>,
	/// Attention offsets (`kappa`), one per attention Gaussian.
	pub kappa: Vec<f32>,
	/// Model confidence that the whole text has been written.
	pub finish: f32,
}

impl ModelOutput {
	/// Checks the output contract. Attention vectors are diagnostics only and
	/// are not inspected.
	pub fn validate(&self) -> std::result::Result<(), MalformedOutput> {
		self.mixture.validate()?;
		if !self.finish.is_finite() {
			return Err(MalformedOutput::NonFiniteFinish(self.finish));
		}
		Ok(())
	}
}

/// An already-trained, already-loaded handwriting sequence model.
///
/// The model owns its recurrent state. The engine only ever asks it to
/// forget that state ([`reset_state`](SequenceModel::reset_state)) before a
/// run, then to advance one step at a time.
///
/// # Contract
/// - `reset_state` is called exactly once before the first `step` of every run.
/// - `step` receives the point produced by the previous step (the start token
///   on the first call), the encoded text, and the sampling bias.
pub trait SequenceModel {
	/// Zeroes the hidden recurrent state.
	fn reset_state(&mut self);

	/// Advances the model by one step.
	///
	/// # Errors
	/// Implementations return [`SynthError::Model`](crate::error::SynthError::Model)
	/// when their backend fails. Malformed but successfully computed outputs
	/// are caught by the engine, not here.
	fn step(&mut self, current: &Point, text: &EncodedText, bias: f32) -> Result<ModelOutput>;
}

impl<M: SequenceModel + ?Sized> SequenceModel for Box<M> {
	fn reset_state(&mut self) {
		(**self).reset_state()
	}

	fn step(&mut self, current: &Point, text: &EncodedText, bias: f32) -> Result<ModelOutput> {
		(**self).step(current, text, bias)
	}
}
