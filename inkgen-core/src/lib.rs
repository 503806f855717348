//! Handwriting synthesis sampling library.
//!
//! This crate turns the step-by-step output of a trained handwriting
//! sequence model into pen trajectories:
//! - Mixture density sampling with a controllable bias
//! - A bounded autoregressive engine with confidence-based termination
//! - Stroke geometry: absolute coordinates and pen-up segmentation
//! - Run persistence for renderers
//!
//! The sequence model itself is an external collaborator behind the
//! [`model::sequence_model::SequenceModel`] trait.

/// Sampling engine, sampler, selector, configuration and model seam.
pub mod model;

/// Absolute coordinates, stroke segmentation and extents.
pub mod geometry;

/// Error taxonomy.
pub mod error;

/// I/O utilities (batch input files, run persistence).
pub mod io;

pub use error::{MalformedOutput, Result, SynthError};
pub use geometry::{Bounds, Point, Stroke};
pub use model::config::GenerationConfig;
pub use model::engine::{Engine, RunOutput, StepTrace, StopReason};
pub use model::sequence_model::{ModelOutput, SequenceModel};
pub use model::vocabulary::Vocabulary;
