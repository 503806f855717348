use actix_cors::Cors;
use actix_web::{get, middleware, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use inkgen_core::model::engine::{seeded_rng, StepTrace};
use inkgen_core::model::synthetic::SyntheticModel;
use inkgen_core::model::vocabulary::EncodingWarning;
use inkgen_core::{Bounds, Engine, GenerationConfig, RunOutput, StopReason, Stroke, SynthError, Vocabulary};

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	text: Option<String>,
	bias: Option<f32>,
	force_run: Option<bool>,
	max_steps_per_char: Option<usize>,
	seed: Option<u64>,
	trace: Option<bool>,
}

#[derive(Serialize)]
struct GenerateResponse {
	text: String,
	stop_reason: StopReason,
	steps: usize,
	strokes: Vec<Stroke>,
	bounds: Option<Bounds>,
	warnings: Vec<EncodingWarning>,
	#[serde(skip_serializing_if = "Option::is_none")]
	trace: Option<Vec<StepTrace>>,
}

struct SharedData {
	vocabulary: Vocabulary,
}

impl GenerateParams {
	/// Builds the run configuration, rejecting out-of-range values.
	fn config(&self) -> Result<GenerationConfig, SynthError> {
		let mut config = GenerationConfig::default().with_force_run(self.force_run.unwrap_or(false));
		if let Some(bias) = self.bias {
			config.set_bias(bias)?;
		}
		if let Some(steps) = self.max_steps_per_char {
			config.set_max_steps_per_char(steps)?;
		}
		config.seed = self.seed;
		Ok(config)
	}
}

impl GenerateResponse {
	fn new(run: RunOutput, with_trace: bool) -> Self {
		Self {
			stop_reason: run.stop_reason,
			steps: run.steps(),
			strokes: run.strokes(),
			bounds: run.bounds(),
			trace: with_trace.then(|| run.trace.clone()),
			warnings: run.warnings,
			text: run.text,
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Runs one independent generation for `text` and returns its strokes as JSON.
/// Every request gets its own model state and random stream.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let text = match &query.text {
		Some(t) if !t.is_empty() => t.clone(),
		_ => return HttpResponse::BadRequest().body("Missing or empty text"),
	};

	let config = match query.config() {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};
	let with_trace = query.trace.unwrap_or(false);

	let vocabulary = data.vocabulary.clone();
	let result = web::block(move || {
		let mut engine = Engine::new(SyntheticModel::new(&vocabulary), vocabulary);
		let mut rng = seeded_rng(config.seed);
		engine.generate(&text, &config, &mut rng)
	})
	.await;

	match result {
		Ok(Ok(run)) => HttpResponse::Ok().json(GenerateResponse::new(run, with_trace)),
		Ok(Err(e @ (SynthError::EmptyText | SynthError::InvalidConfig(_)))) => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		Ok(Err(e)) => {
			warn!("generation failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
		Err(_) => HttpResponse::InternalServerError().body("Generation worker failed"),
	}
}

/// HTTP GET endpoint `/v1/charset`: the characters the model can write.
#[get("/v1/charset")]
async fn get_charset(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.vocabulary.charset())
}

/// Main entry point for the server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Requests are served by the synthetic model; the vocabulary is the
///   printable ASCII set.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = web::Data::new(SharedData {
		vocabulary: Vocabulary::default_english(),
	});
	info!("serving on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_charset)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
