use thiserror::Error;

/// Reason a model step output was rejected.
///
/// Each variant names the offending mixture component (when there is one)
/// so a broken model can be diagnosed from the error alone.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedOutput {
	#[error("mixture has no components")]
	NoComponents,

	#[error("component {component}: {field} is not finite")]
	NonFinite { component: usize, field: &'static str },

	#[error("component {component}: standard deviation must be > 0, got {value}")]
	NonPositiveStd { component: usize, value: f32 },

	#[error("component {component}: rho must lie in (-1, 1), got {value}")]
	RhoOutOfRange { component: usize, value: f32 },

	#[error("component {component}: mixture weight must be >= 0, got {value}")]
	NegativeWeight { component: usize, value: f32 },

	#[error("mixture weights sum to zero")]
	ZeroWeights,

	#[error("end probability must lie in [0, 1], got {0}")]
	EndProbabilityOutOfRange(f32),

	#[error("finish probability is not finite: {0}")]
	NonFiniteFinish(f32),
}

/// Root error type for the synthesis engine.
#[derive(Error, Debug)]
pub enum SynthError {
	/// The sequence model broke its output contract at `step`.
	#[error("model output at step {step} is malformed: {reason}")]
	ModelOutput { step: usize, reason: MalformedOutput },

	/// The covariance of a bivariate draw is not positive definite.
	#[error("invalid covariance (std1={std1}, std2={std2}, rho={rho})")]
	InvalidCovariance { std1: f32, std2: f32, rho: f32 },

	/// A valid distribution produced a draw outside the `f32` range.
	#[error("sampled point is not finite: ({x}, {y})")]
	NonFiniteSample { x: f32, y: f32 },

	#[error("probability must lie in [0, 1], got {0}")]
	InvalidProbability(f32),

	#[error("invalid mixture weights: {0}")]
	InvalidWeights(String),

	#[error("cannot generate handwriting for an empty text")]
	EmptyText,

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// The caller asked the run to stop before `step` was taken.
	#[error("generation cancelled before step {step}")]
	Cancelled { step: usize },

	/// The sequence model itself failed (backend, shape, ...).
	#[error("sequence model error: {0}")]
	Model(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, SynthError>;
