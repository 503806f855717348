use std::sync::mpsc;
use std::thread;

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use super::config::GenerationConfig;
use super::engine::{Engine, RunOutput};
use super::sequence_model::SequenceModel;
use super::vocabulary::Vocabulary;

/// Builds the random stream of the `index`-th text of a batch.
///
/// All streams share `seed` but use distinct ChaCha stream ids, so they never
/// overlap and do not depend on which thread runs which text.
pub fn batch_rng(seed: u64, index: usize) -> ChaCha8Rng {
	let mut rng = ChaCha8Rng::seed_from_u64(seed);
	rng.set_stream(index as u64);
	rng
}

/// Generates handwriting for several texts in parallel.
///
/// # Parameters
/// - `factory`: builds one fresh model per text; models are never shared.
/// - `vocabulary`: cloned into every engine.
/// - `texts`: inputs, one run each.
/// - `config`: shared, read-only; its `seed` is ignored in favor of `seed`.
/// - `seed`: base seed of the per-text streams (see [`batch_rng`]).
///
/// # Returns
/// One result per text, in input order. A failed run does not affect the
/// others.
///
/// # Behavior
/// - Splits the texts into chunks (based on CPU cores).
/// - Spawns a scoped thread per chunk with its own engine.
/// - Collects `(index, result)` pairs over an MPSC channel.
pub fn generate_batch<M, F>(
	factory: F,
	vocabulary: &Vocabulary,
	texts: &[String],
	config: &GenerationConfig,
	seed: u64,
) -> Vec<Result<RunOutput>>
where
	M: SequenceModel,
	F: Fn() -> M + Sync,
{
	if texts.is_empty() {
		return Vec::new();
	}

	let workers = num_cpus::get().max(1).min(texts.len());
	let chunk_size = texts.len().div_ceil(workers);
	debug!("batch of {} texts on {workers} workers", texts.len());

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for (chunk_index, chunk) in texts.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let factory = &factory;
			scope.spawn(move || {
				let mut engine = Engine::new(factory(), vocabulary.clone());
				for (offset, text) in chunk.iter().enumerate() {
					let index = chunk_index * chunk_size + offset;
					let mut rng = batch_rng(seed, index);
					let result = engine.generate(text, config, &mut rng);
					// The receiver outlives the scope.
					let _ = tx.send((index, result));
				}
			});
		}
	});
	drop(tx);

	let mut slots: Vec<Option<Result<RunOutput>>> = texts.iter().map(|_| None).collect();
	for (index, result) in rx.iter() {
		slots[index] = Some(result);
	}
	slots.into_iter().flatten().collect()
}
