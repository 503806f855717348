//! Top-level module for the handwriting sampling system.
//!
//! This module provides everything between an input string and a pen
//! trajectory, including:
//! - The sequence model seam (`SequenceModel`) and its step output
//! - Mixture density parameters and their validation
//! - Component selection and bivariate Gaussian sampling
//! - The autoregressive control loop (`Engine`)
//! - Run configuration (`GenerationConfig`) and text encoding (`Vocabulary`)

/// Autoregressive control loop.
///
/// Resets the model, drives it one step at a time, applies the termination
/// policy and step budget, and returns the complete run trace.
pub mod engine;

/// Parallel runs over independent models and random streams.
pub mod batch;

/// Run parameters: bias, forced runs, step budget, finish threshold, seed.
pub mod config;

/// Per-step mixture density output and its contract checks.
pub mod mixture;

/// Bivariate Gaussian + Bernoulli point sampler.
pub mod sampler;

/// Categorical choice of the mixture component.
pub mod selector;

/// The trait every handwriting sequence model implements.
pub mod sequence_model;

/// Replays recorded model outputs.
pub mod scripted;

/// Weight-free procedural model used by the binaries.
pub mod synthetic;

/// Character-to-index mapping of the conditioning text.
pub mod vocabulary;
