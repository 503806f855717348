use std::f32::consts::TAU;

use crate::error::Result;
use crate::geometry::Point;
use super::mixture::{MixtureComponent, MixtureParameters};
use super::sequence_model::{ModelOutput, SequenceModel};
use super::vocabulary::{EncodedText, Vocabulary};

/// Fraction of a character the attention moves per step.
const ADVANCE: f32 = 1.0 / 18.0;
/// Width of the attention bump, in characters.
const ATTENTION_WIDTH: f32 = 0.35;
/// Smallest std the model emits, whatever the bias.
const MIN_STD: f32 = 1e-4;

/// A deterministic stand-in for a trained handwriting network.
///
/// It has no weights: the attention offset slides over the text at a fixed
/// pace, each character is drawn as a loop whose size and tilt depend on its
/// vocabulary index, word breaks lift the pen, and the finish signal rises
/// once attention has moved past the last character. It honors the full
/// [`SequenceModel`] contract, so the binaries can run end to end without
/// restoring a real network.
///
/// # Bias
/// Stds are scaled by `exp(-bias)` and mixture logits by `1 + bias`, the
/// usual way a biased handwriting network trades diversity for legibility.
#[derive(Clone, Debug)]
pub struct SyntheticModel {
	word_break: Option<usize>,
	kappa: f32,
}

impl SyntheticModel {
	/// Creates a model that lifts the pen on `vocabulary`'s space character.
	pub fn new(vocabulary: &Vocabulary) -> Self {
		Self { word_break: vocabulary.index_of(' '), kappa: 0.0 }
	}

	fn attention(&self, text: &EncodedText) -> (Vec<f32>, Vec<f32>) {
		let phi: Vec<f32> = (0..=text.len())
			.map(|u| {
				let d = (self.kappa - (u as f32 + 0.5)) / ATTENTION_WIDTH;
				(-0.5 * d * d).exp()
			})
			.collect();

		let mut window = vec![0.0; text.vocab_size()];
		for (u, index) in text.indices().iter().enumerate() {
			window[*index] += phi[u];
		}
		(phi, window)
	}
}

impl SequenceModel for SyntheticModel {
	fn reset_state(&mut self) {
		self.kappa = 0.0;
	}

	fn step(&mut self, current: &Point, text: &EncodedText, bias: f32) -> Result<ModelOutput> {
		self.kappa += ADVANCE;
		let (phi, window) = self.attention(text);

		let position = (self.kappa.floor() as usize).min(text.len().saturating_sub(1));
		let index = text.indices().get(position).copied().unwrap_or(0);
		let in_word_break = self.word_break == Some(index);

		let phase = TAU * self.kappa.fract();
		let tilt = 0.7 * (index % 7) as f32;
		let radius = 0.6 + 0.15 * (index % 5) as f32;
		let gap = if current.pen_lift { 0.4 } else { 0.0 };

		let dx = 0.25 + gap + radius * (phase + tilt).cos() * ADVANCE * TAU;
		let dy = radius * (phase + tilt).sin() * ADVANCE * TAU;

		let sharpen = 1.0 + bias;
		let logits = [2.0f32, 0.5];
		let scaled: Vec<f32> = logits.iter().map(|l| ((l - logits[0]) * sharpen).exp()).collect();
		let total: f32 = scaled.iter().sum();
		let narrow = (-bias).exp();
		let std = |base: f32| (base * narrow).max(MIN_STD);

		let components = vec![
			MixtureComponent {
				weight: scaled[0] / total,
				mu1: dx,
				mu2: dy,
				std1: std(0.12),
				std2: std(0.12),
				rho: 0.3 * phase.sin(),
			},
			MixtureComponent {
				weight: scaled[1] / total,
				mu1: 0.5 * dx,
				mu2: -dy,
				std1: std(0.25),
				std2: std(0.2),
				rho: 0.0,
			},
		];
		let end_probability = if in_word_break { 0.6 } else { 0.02 };

		let overshoot = self.kappa - text.len() as f32 - 0.25;
		let finish = 1.0 / (1.0 + (-8.0 * overshoot).exp());

		Ok(ModelOutput {
			mixture: MixtureParameters::new(components, end_probability),
			phi,
			window,
			kappa: vec![self.kappa],
			finish,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::config::GenerationConfig;
	use crate::model::engine::{Engine, StopReason};

	#[test]
	fn outputs_honor_the_contract() {
		let vocab = Vocabulary::default_english();
		let text = vocab.encode("hello world");
		let mut model = SyntheticModel::new(&vocab);
		model.reset_state();
		let mut current = Point::origin();
		for bias in [0.0, 1.0, 50.0] {
			model.reset_state();
			for _ in 0..400 {
				let output = model.step(&current, &text, bias).unwrap();
				assert_eq!(output.validate(), Ok(()));
				assert_eq!(output.phi.len(), text.len() + 1);
				assert_eq!(output.window.len(), vocab.len());
				current = Point::new(output.mixture.components[0].mu1, 0.0, false);
			}
		}
	}

	#[test]
	fn finishes_shortly_after_the_text() {
		let vocab = Vocabulary::default_english();
		let mut engine = Engine::new(SyntheticModel::new(&vocab), vocab);
		let config = GenerationConfig::default().with_seed(5);
		let run = engine.generate_seeded("ink", &config).unwrap();
		match run.stop_reason {
			StopReason::Finished { step } => assert!((54..=70).contains(&step), "step={step}"),
			other => panic!("expected natural termination, got {other:?}"),
		}
	}

	#[test]
	fn higher_bias_narrows_the_spread() {
		let vocab = Vocabulary::default_english();
		let text = vocab.encode("a");
		let mut model = SyntheticModel::new(&vocab);
		model.reset_state();
		let loose = model.step(&Point::origin(), &text, 0.0).unwrap();
		model.reset_state();
		let tight = model.step(&Point::origin(), &text, 3.0).unwrap();
		assert!(tight.mixture.components[0].std1 < loose.mixture.components[0].std1);
		assert!(tight.mixture.components[0].weight > loose.mixture.components[0].weight);
	}
}
