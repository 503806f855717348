use inkgen_core::geometry::split_strokes;
use inkgen_core::io::{load_run, save_run};
use inkgen_core::model::engine::seeded_rng;
use inkgen_core::model::mixture::{MixtureComponent, MixtureParameters};
use inkgen_core::model::scripted::ScriptedModel;
use inkgen_core::model::vocabulary::DEFAULT_INDEX;
use inkgen_core::{Engine, GenerationConfig, ModelOutput, StopReason, SynthError, Vocabulary};

fn output(finish: f32) -> ModelOutput {
	let components = vec![
		MixtureComponent { weight: 0.7, mu1: 0.4, mu2: 0.1, std1: 0.2, std2: 0.3, rho: 0.5 },
		MixtureComponent { weight: 0.3, mu1: -0.1, mu2: 0.6, std1: 0.5, std2: 0.1, rho: -0.2 },
	];
	ModelOutput {
		mixture: MixtureParameters::new(components, 0.3),
		phi: vec![0.5, 0.5, 0.0],
		window: vec![0.0, 0.5, 0.5],
		kappa: vec![0.2],
		finish,
	}
}

fn engine(outputs: Vec<ModelOutput>) -> Engine<ScriptedModel> {
	Engine::new(ScriptedModel::new(outputs), Vocabulary::default_english())
}

#[test]
fn forced_run_spends_the_whole_budget() {
	let mut engine = engine(vec![output(0.99)]);
	let config = GenerationConfig::default().with_force_run(true).with_seed(1);
	for text in ["a", "hello", "two words"] {
		let run = engine.generate_seeded(text, &config).unwrap();
		let expected = 60 * text.chars().count();
		assert_eq!(run.steps(), expected);
		assert_eq!(run.points.len(), expected + 1);
		assert_eq!(run.stop_reason, StopReason::StepBudgetExhausted { steps: expected });
	}
}

#[test]
fn confident_model_stops_at_step_five() {
	let mut script: Vec<ModelOutput> = (0..4).map(|_| output(0.1)).collect();
	script.push(output(0.9));
	script.push(output(0.1));
	let mut engine = engine(script);

	let run = engine.generate_seeded("hello", &GenerationConfig::default().with_seed(2)).unwrap();
	assert_eq!(run.stop_reason, StopReason::Finished { step: 5 });
	assert_eq!(run.steps(), 5);
	assert_eq!(run.points.len(), 6);
	assert!(run.points.last().unwrap().pen_lift);
}

#[test]
fn unknown_characters_do_not_stop_generation() {
	let mut engine = engine(vec![output(0.95)]);
	let run = engine.generate_seeded("é", &GenerationConfig::default().with_seed(3)).unwrap();
	assert_eq!(run.warnings.len(), 1);
	assert_eq!(run.warnings[0].character, 'é');
	assert_eq!(run.steps(), 1);
	assert_eq!(engine.vocabulary().encode("é").indices(), &[DEFAULT_INDEX]);
}

#[test]
fn same_seed_gives_byte_identical_runs() {
	let config = GenerationConfig::default().with_force_run(true).with_seed(1234);
	let first = engine(vec![output(0.0)]).generate_seeded("ink", &config).unwrap();
	let second = engine(vec![output(0.0)]).generate_seeded("ink", &config).unwrap();

	assert_eq!(
		postcard::to_stdvec(&first.points).unwrap(),
		postcard::to_stdvec(&second.points).unwrap()
	);
	assert_eq!(
		postcard::to_stdvec(&first.strokes()).unwrap(),
		postcard::to_stdvec(&second.strokes()).unwrap()
	);

	let other = engine(vec![output(0.0)])
		.generate_seeded("ink", &config.clone().with_seed(4321))
		.unwrap();
	assert_ne!(first.points, other.points);
}

#[test]
fn failed_run_returns_no_partial_output() {
	let mut broken = output(0.1);
	broken.mixture.components[1].rho = 1.0;
	let mut engine = engine(vec![output(0.1), broken]);
	let mut rng = seeded_rng(Some(9));
	let result = engine.generate("abc", &GenerationConfig::default(), &mut rng);
	assert!(matches!(result, Err(SynthError::ModelOutput { step: 2, .. })));

	// The engine stays usable for the next text.
	let mut engine = Engine::new(ScriptedModel::new(vec![output(0.9)]), Vocabulary::default_english());
	assert!(engine.generate("abc", &GenerationConfig::default(), &mut rng).is_ok());
}

#[test]
fn bias_reaches_the_model() {
	let mut engine = engine(vec![output(0.0)]);
	let mut config = GenerationConfig::default().with_seed(5);
	config.set_bias(2.5).unwrap();
	config.set_max_steps_per_char(2).unwrap();
	engine.generate_seeded("ab", &config).unwrap();
	assert_eq!(engine.model().biases(), &[2.5; 4]);
}

#[test]
fn strokes_partition_the_absolute_trajectory() {
	let mut engine = engine(vec![output(0.0)]);
	let config = GenerationConfig::default().with_force_run(true).with_seed(6);
	let run = engine.generate_seeded("strokes", &config).unwrap();

	let absolute = run.absolute_points();
	let strokes = split_strokes(&absolute);
	assert_eq!(strokes, run.strokes());
	let total: usize = strokes.iter().map(|s| s.len()).sum();
	assert_eq!(total, run.points.len());
	assert!(strokes.len() > 2, "a 0.3 lift probability should split the run");

	let bounds = run.bounds().unwrap();
	for point in &absolute {
		assert!(point.x >= bounds.min_x && point.x <= bounds.max_x);
		assert!(point.y >= bounds.min_y && point.y <= bounds.max_y);
	}
}

#[test]
fn saved_run_loads_back() {
	let dir = tempfile::tempdir().unwrap();
	let mut engine = engine(vec![output(0.1), output(0.1), output(0.95)]);
	let run = engine.generate_seeded("save", &GenerationConfig::default().with_seed(8)).unwrap();

	let written = save_run(dir.path().join("save.txt"), &run).unwrap();
	assert_eq!(written, dir.path().join("save.run"));
	let loaded = load_run(&written).unwrap();
	assert_eq!(loaded, run);
}
