use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::error::Result;
use crate::model::engine::RunOutput;

/// Extension of serialized runs.
pub const RUN_EXTENSION: &str = "run";

/// Reads a text file and returns its non-empty lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `out/hello.txt` + `"run"` → `out/hello.run`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Serializes a run with `postcard` so a renderer can pick it up later.
///
/// The extension of `path` is replaced by [`RUN_EXTENSION`]; the path
/// actually written is returned.
pub fn save_run<P: AsRef<Path>>(path: P, run: &RunOutput) -> Result<PathBuf> {
	let output = build_output_path(&path, RUN_EXTENSION)?;
	let bytes = postcard::to_stdvec(run)?;
	fs::write(&output, bytes)?;
	Ok(output)
}

/// Loads a run written by [`save_run`].
pub fn load_run<P: AsRef<Path>>(path: P) -> Result<RunOutput> {
	let bytes = fs::read(path)?;
	Ok(postcard::from_bytes(&bytes)?)
}
