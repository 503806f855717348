use crate::error::{Result, SynthError};
use crate::geometry::Point;
use super::sequence_model::{ModelOutput, SequenceModel};
use super::vocabulary::EncodedText;

/// A sequence model that replays a fixed list of outputs.
///
/// Step `i` (0-based since the last reset) returns `outputs[i]`, and the last
/// output once the list runs out. Every fed point is recorded, which makes
/// this the model of choice for exercising the engine and for replaying a
/// captured model session.
#[derive(Clone, Debug)]
pub struct ScriptedModel {
	outputs: Vec<ModelOutput>,
	cursor: usize,
	resets: usize,
	inputs: Vec<Point>,
	biases: Vec<f32>,
}

impl ScriptedModel {
	pub fn new(outputs: Vec<ModelOutput>) -> Self {
		Self { outputs, cursor: 0, resets: 0, inputs: Vec::new(), biases: Vec::new() }
	}

	/// Number of `reset_state` calls so far.
	pub fn resets(&self) -> usize {
		self.resets
	}

	/// Points fed since the last reset, in order.
	pub fn inputs(&self) -> &[Point] {
		&self.inputs
	}

	/// Bias received on each step since the last reset.
	pub fn biases(&self) -> &[f32] {
		&self.biases
	}
}

impl SequenceModel for ScriptedModel {
	fn reset_state(&mut self) {
		self.cursor = 0;
		self.resets += 1;
		self.inputs.clear();
		self.biases.clear();
	}

	fn step(&mut self, current: &Point, _text: &EncodedText, bias: f32) -> Result<ModelOutput> {
		let last = self
			.outputs
			.len()
			.checked_sub(1)
			.ok_or_else(|| SynthError::Model("scripted model has no outputs".to_owned()))?;
		self.inputs.push(*current);
		self.biases.push(bias);
		let output = self.outputs[self.cursor.min(last)].clone();
		self.cursor += 1;
		Ok(output)
	}
}
