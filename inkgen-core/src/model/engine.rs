use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::geometry::{self, Bounds, Point, Stroke};
use super::config::GenerationConfig;
use super::mixture::MixtureComponent;
use super::selector::select;
use super::sequence_model::{ModelOutput, SequenceModel};
use super::vocabulary::{EncodingWarning, Vocabulary};

/// Why a run stopped. Both variants are successful completions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
	/// The model's finish probability crossed the threshold after `step`.
	Finished { step: usize },
	/// The step budget ran out before the model signalled completion.
	StepBudgetExhausted { steps: usize },
}

impl std::fmt::Display for StopReason {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			StopReason::Finished { step } => write!(f, "finished at step {step}"),
			StopReason::StepBudgetExhausted { steps } => write!(f, "step budget of {steps} exhausted"),
		}
	}
}

/// Diagnostic record of one engine step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StepTrace {
	/// 1-based step index.
	pub step: usize,
	pub phi: Vec<f32>,
	pub window: Vec<f32>,
	pub kappa: Vec<f32>,
	/// Index of the mixture component the point was drawn from.
	pub component: usize,
	/// Raw parameters of that component.
	pub parameters: MixtureComponent,
	pub finish: f32,
	/// The point produced by this step, with its sampled pen-lift bit.
	pub point: Point,
}

/// Center and spread of one step's chosen component in absolute coordinates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DensityCenter {
	pub x: f32,
	pub y: f32,
	pub std1: f32,
	pub std2: f32,
	pub rho: f32,
}

/// Complete result of a successful run.
///
/// # Invariants
/// - `points[0]` is the start token, followed by exactly one point per step
/// - `trace.len() == points.len() - 1`
/// - the last point has `pen_lift == true`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunOutput {
	pub text: String,
	pub points: Vec<Point>,
	pub trace: Vec<StepTrace>,
	pub stop_reason: StopReason,
	pub warnings: Vec<EncodingWarning>,
}

impl RunOutput {
	/// Number of model steps taken.
	pub fn steps(&self) -> usize {
		self.trace.len()
	}

	pub fn absolute_points(&self) -> Vec<Point> {
		geometry::accumulate(&self.points)
	}

	/// Pen-down strokes in absolute coordinates, ready to plot.
	pub fn strokes(&self) -> Vec<Stroke> {
		geometry::split_strokes(&self.absolute_points())
	}

	pub fn bounds(&self) -> Option<Bounds> {
		geometry::bounds(&self.absolute_points())
	}

	/// Running sum of the chosen component means, one per step, carrying the
	/// component spread. This is what a density view draws.
	pub fn density_centers(&self) -> Vec<DensityCenter> {
		let mut x = 0.0f32;
		let mut y = 0.0f32;
		self.trace
			.iter()
			.map(|step| {
				x += step.parameters.mu1;
				y += step.parameters.mu2;
				DensityCenter {
					x,
					y,
					std1: step.parameters.std1,
					std2: step.parameters.std2,
					rho: step.parameters.rho,
				}
			})
			.collect()
	}
}

/// Mutable state of a single run. Never escapes the engine: it either
/// becomes a [`RunOutput`] or is dropped with the error.
struct RunState {
	current: Point,
	points: Vec<Point>,
	trace: Vec<StepTrace>,
}

impl RunState {
	// Buffers grow with the steps actually taken, never with the budget.
	fn new() -> Self {
		let start = Point::origin();
		Self { current: start, points: vec![start], trace: Vec::new() }
	}

	fn step(&self) -> usize {
		self.trace.len()
	}

	fn record(&mut self, output: ModelOutput, component: usize, point: Point) {
		let step = self.step() + 1;
		let parameters = output.mixture.components[component];
		self.trace.push(StepTrace {
			step,
			phi: output.phi,
			window: output.window,
			kappa: output.kappa,
			component,
			parameters,
			finish: output.finish,
			point,
		});
		self.points.push(point);
		self.current = point;
	}

	fn into_output(mut self, text: &str, stop_reason: StopReason, warnings: Vec<EncodingWarning>) -> RunOutput {
		if let Some(last) = self.points.last_mut() {
			last.pen_lift = true;
		}
		if let Some(last) = self.trace.last_mut() {
			last.point.pen_lift = true;
		}
		RunOutput {
			text: text.to_owned(),
			points: self.points,
			trace: self.trace,
			stop_reason,
			warnings,
		}
	}
}

/// Builds the random stream of a run: seeded when `seed` is set, drawn from
/// the OS otherwise.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
	match seed {
		Some(seed) => ChaCha8Rng::seed_from_u64(seed),
		None => ChaCha8Rng::from_rng(&mut rand::rng()),
	}
}

/// Autoregressive sampling engine.
///
/// # Responsibilities
/// - Reset the model, then drive it one step at a time
/// - Turn each step's mixture output into a concrete point
/// - Apply the termination policy and the step budget
/// - Hand back the full trace, or nothing at all on failure
pub struct Engine<M: SequenceModel> {
	model: M,
	vocabulary: Vocabulary,
}

impl<M: SequenceModel> Engine<M> {
	pub fn new(model: M, vocabulary: Vocabulary) -> Self {
		Self { model, vocabulary }
	}

	pub fn model(&self) -> &M {
		&self.model
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	/// Generates handwriting for `text`, drawing entropy from `rng`.
	///
	/// See [`Engine::generate_with_cancel`].
	pub fn generate<R: Rng>(&mut self, text: &str, config: &GenerationConfig, rng: &mut R) -> Result<RunOutput> {
		self.generate_with_cancel(text, config, rng, |_| true)
	}

	/// Generates handwriting for `text` with a stream built from `config.seed`.
	pub fn generate_seeded(&mut self, text: &str, config: &GenerationConfig) -> Result<RunOutput> {
		let mut rng = seeded_rng(config.seed);
		self.generate(text, config, &mut rng)
	}

	/// Generates handwriting for `text`.
	///
	/// `should_continue` is polled before every step with the index of the
	/// step about to run; returning `false` abandons the run.
	///
	/// # Behavior
	/// - Encodes `text`; unknown characters are reported, not rejected.
	/// - Resets the model state, then starts from `(0, 0, lift)`.
	/// - Runs at most `max_steps_per_char * chars(text)` steps. Each step
	///   validates the model output, selects a component, samples a point.
	/// - Unless `force_run` is set, stops after the first step whose finish
	///   probability is above `finish_threshold`.
	/// - Forces a pen lift on the last point.
	///
	/// # Errors
	/// - [`SynthError::EmptyText`] if `text` has no characters.
	/// - [`SynthError::InvalidConfig`] if `config` breaks its invariants or the
	///   step budget overflows for this text.
	/// - [`SynthError::ModelOutput`] if the model returns NaN/Inf, a
	///   non-positive std, `|rho| >= 1`, or a negative weight.
	/// - [`SynthError::NonFiniteSample`] if a draw overflows the `f32` range.
	/// - [`SynthError::Cancelled`] if `should_continue` returned `false`.
	/// - Any error returned by the model.
	pub fn generate_with_cancel<R, F>(
		&mut self,
		text: &str,
		config: &GenerationConfig,
		rng: &mut R,
		mut should_continue: F,
	) -> Result<RunOutput>
	where
		R: Rng,
		F: FnMut(usize) -> bool,
	{
		config.validate()?;
		let encoded = self.vocabulary.encode(text);
		if encoded.is_empty() {
			return Err(SynthError::EmptyText);
		}

		let max_steps = config.max_steps(encoded.len())?;
		debug!(
			"generating {} chars (budget {max_steps} steps, bias {}, force_run {})",
			encoded.len(),
			config.bias(),
			config.force_run
		);

		self.model.reset_state();
		let mut state = RunState::new();
		let mut stop_reason = StopReason::StepBudgetExhausted { steps: max_steps };

		for step in 1..=max_steps {
			if !should_continue(step) {
				debug!("run cancelled before step {step}");
				return Err(SynthError::Cancelled { step });
			}

			let output = self.model.step(&state.current, &encoded, config.bias())?;
			output.validate().map_err(|reason| SynthError::ModelOutput { step, reason })?;

			let component = select(&output.mixture.weights(), rng)?;
			let point = output.mixture.components[component].sample(output.mixture.end_probability, rng)?;
			let finish = output.finish;

			trace!("step {step}: component {component}, point ({}, {}, {}), finish {finish}", point.x, point.y, point.pen_lift);
			state.record(output, component, point);

			if !config.force_run && finish > config.finish_threshold() {
				stop_reason = StopReason::Finished { step };
				break;
			}
		}

		info!("{:?}: {stop_reason} after {} steps", text, state.step());
		Ok(state.into_output(text, stop_reason, encoded.warnings().to_vec()))
	}
}
