use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};

/// Index every unknown character maps to.
pub const DEFAULT_INDEX: usize = 0;

/// A character the vocabulary does not know.
///
/// Not an error: the character is encoded as [`DEFAULT_INDEX`] and the run
/// goes on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingWarning {
	/// Character position in the input text.
	pub position: usize,
	pub character: char,
}

/// Fixed character-to-index mapping used to encode the conditioning text.
///
/// # Invariants
/// - Index 0 is reserved for unknown characters
/// - Known characters use distinct indices `>= 1`
/// - `size` is one more than the largest index
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Vocabulary {
	translation: HashMap<char, usize>,
	size: usize,
}

impl Vocabulary {
	/// Builds a vocabulary assigning `1, 2, ...` to `chars` in order.
	///
	/// Repeated characters keep their first index.
	pub fn new<I: IntoIterator<Item = char>>(chars: I) -> Self {
		let mut translation = HashMap::new();
		for c in chars {
			let next = translation.len() + 1;
			translation.entry(c).or_insert(next);
		}
		let size = translation.len() + 1;
		Self { translation, size }
	}

	/// Builds a vocabulary from an explicit character-to-index map.
	///
	/// # Errors
	/// Returns an error if a character uses the reserved index 0 or if two
	/// characters share an index.
	pub fn from_translation(translation: HashMap<char, usize>) -> Result<Self> {
		let mut seen = HashSet::new();
		for (c, index) in &translation {
			if *index == DEFAULT_INDEX {
				return Err(SynthError::InvalidConfig(format!(
					"character {c:?} uses the reserved index {DEFAULT_INDEX}"
				)));
			}
			if !seen.insert(*index) {
				return Err(SynthError::InvalidConfig(format!("index {index} is used twice")));
			}
		}
		let size = translation.values().max().map_or(1, |max| max + 1);
		Ok(Self { translation, size })
	}

	/// Printable ASCII (space through `~`).
	pub fn default_english() -> Self {
		Self::new((' '..='~').collect::<Vec<_>>())
	}

	/// Number of one-hot columns, reserved index included.
	pub fn len(&self) -> usize {
		self.size
	}

	/// Always false: the reserved index is always present.
	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn index_of(&self, c: char) -> Option<usize> {
		self.translation.get(&c).copied()
	}

	/// Label of every index, in index order. The reserved index and any gap
	/// in the mapping are labelled with an empty string.
	pub fn charset(&self) -> Vec<String> {
		let mut labels = vec![String::new(); self.size];
		for (c, index) in &self.translation {
			labels[*index] = c.to_string();
		}
		labels
	}

	/// Encodes `text`, one index per character.
	///
	/// Unknown characters become [`DEFAULT_INDEX`] and are reported in
	/// [`EncodedText::warnings`].
	pub fn encode(&self, text: &str) -> EncodedText {
		let mut warnings = Vec::new();
		let indices = text
			.chars()
			.enumerate()
			.map(|(position, character)| match self.translation.get(&character) {
				Some(index) => *index,
				None => {
					warn!("character {character:?} at position {position} is not in the vocabulary");
					warnings.push(EncodingWarning { position, character });
					DEFAULT_INDEX
				}
			})
			.collect();

		EncodedText { indices, vocab_size: self.size, warnings }
	}
}

/// Text encoded against a [`Vocabulary`], ready to condition the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EncodedText {
	indices: Vec<usize>,
	vocab_size: usize,
	warnings: Vec<EncodingWarning>,
}

impl EncodedText {
	pub fn indices(&self) -> &[usize] {
		&self.indices
	}

	/// Number of encoded characters.
	pub fn len(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	pub fn vocab_size(&self) -> usize {
		self.vocab_size
	}

	pub fn warnings(&self) -> &[EncodingWarning] {
		&self.warnings
	}

	/// One-hot rows, one per character, followed by a trailing all-zero row
	/// marking the end of the text.
	pub fn one_hot(&self) -> Vec<Vec<f32>> {
		let mut rows: Vec<Vec<f32>> = self
			.indices
			.iter()
			.map(|index| {
				let mut row = vec![0.0; self.vocab_size];
				row[*index] = 1.0;
				row
			})
			.collect();
		rows.push(vec![0.0; self.vocab_size]);
		rows
	}
}
