use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use log::info;

use serde::{Deserialize, Serialize};
use wordup_core::io::write_wordlist;
use wordup_core::{
	Engine, Expansion, MarkovConfig, ModelBuilder, ModelStats, SeedCorpus, TransitionModel, WordExtractor, WordGenerator,
};

/// Response header carrying the generation outcome (`complete`, `partial-stalled`, ...).
const OUTCOME_HEADER: &str = "X-Wordup-Outcome";
const DEFAULT_BIND: &str = "127.0.0.1:5000";
/// Largest `count` accepted by `GET /v1/generate`.
const MAX_GENERATE_COUNT: usize = 1_000_000;

/// Optional overrides of the default configuration, from the query string.
#[derive(Deserialize, Default)]
struct ConfigParams {
	order: Option<usize>,
	min_word_len: Option<usize>,
	max_synth_len: Option<usize>,
	multiplier: Option<usize>,
	attempts_per_word: Option<usize>,
	stall_limit: Option<usize>,
}

impl ConfigParams {
	fn apply(&self, base: &MarkovConfig) -> MarkovConfig {
		MarkovConfig {
			order: self.order.unwrap_or(base.order),
			min_word_len: self.min_word_len.unwrap_or(base.min_word_len),
			max_synth_len: self.max_synth_len.unwrap_or(base.max_synth_len),
			multiplier: self.multiplier.unwrap_or(base.multiplier),
			attempts_per_word: self.attempts_per_word.unwrap_or(base.attempts_per_word),
			stall_limit: self.stall_limit.unwrap_or(base.stall_limit),
			sentinel: base.sentinel,
		}
	}
}

#[derive(Deserialize)]
struct GenerateParams {
	count: Option<usize>,
}

/// Body of `POST /v1/expand`.
#[derive(Deserialize)]
struct ExpandRequest {
	words: Vec<String>,
	#[serde(default)]
	config: MarkovConfig,
}

#[derive(Serialize)]
struct StatsResponse {
	seed_words: usize,
	config: MarkovConfig,
	model: ModelStats,
}

/// Model built from the last `PUT /v1/seed`.
struct LoadedSeed {
	config: MarkovConfig,
	/// Seed words the builder accepted.
	seed_words: usize,
	model: Arc<TransitionModel>,
}

#[derive(Default)]
struct SharedData {
	loaded: Option<LoadedSeed>,
}

/// Serializes an expansion as a sorted newline list, outcome in a header.
fn wordlist_response(expansion: &Expansion) -> HttpResponse {
	let mut body = Vec::new();
	if let Err(e) = write_wordlist(&mut body, &expansion.words) {
		return HttpResponse::InternalServerError().body(format!("Failed to write word list: {e}"));
	}
	HttpResponse::Ok()
		.content_type("text/plain; charset=utf-8")
		.insert_header((OUTCOME_HEADER, expansion.outcome.as_str()))
		.body(body)
}

/// HTTP PUT endpoint `/v1/seed`
///
/// Harvests words from the body (plain word list, text or HTML), builds a
/// model with the query's configuration and makes it the current model.
#[put("/v1/seed")]
async fn put_seed(data: web::Data<Mutex<SharedData>>, query: web::Query<ConfigParams>, body: String) -> impl Responder {
	let config = query.apply(&MarkovConfig::default());
	let builder = match ModelBuilder::new(config.clone()) {
		Ok(b) => b,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let built = web::block(move || {
		let extractor = WordExtractor::new(builder.config().min_word_len)?;
		let corpus = SeedCorpus::from_document(&body, &extractor);
		builder.build(&corpus).map(|model| (builder.accepted_count(&corpus), model))
	})
	.await;
	let (seed_words, model) = match built {
		Ok(Ok(built)) => built,
		Ok(Err(e)) => return HttpResponse::InternalServerError().body(e.to_string()),
		Err(_) => return HttpResponse::InternalServerError().body("Model builder failed"),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.loaded = Some(LoadedSeed { config, seed_words, model: Arc::new(model) });

	HttpResponse::Ok().body(format!("Seed loaded: {seed_words} words"))
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates `count` words (default: seed size * multiplier, at most
/// `MAX_GENERATE_COUNT`) from the current model.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	if let Some(count) = query.count.filter(|count| *count > MAX_GENERATE_COUNT) {
		return HttpResponse::BadRequest().body(format!("count must be <= {MAX_GENERATE_COUNT}, got {count}"));
	}
	let (config, model, target) = {
		let shared_data = match data.lock() {
			Ok(m) => m,
			Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
		};
		let Some(loaded) = &shared_data.loaded else {
			return HttpResponse::BadRequest().body("No seed loaded, PUT /v1/seed first");
		};
		let target = query
			.count
			.unwrap_or_else(|| loaded.config.target_count(loaded.seed_words).min(MAX_GENERATE_COUNT));
		(loaded.config.clone(), Arc::clone(&loaded.model), target)
	};

	let generator = match WordGenerator::new(config) {
		Ok(g) => g,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};
	match web::block(move || generator.generate(&model, target, &mut rand::rng())).await {
		Ok(expansion) => wordlist_response(&expansion),
		Err(_) => HttpResponse::InternalServerError().body("Generation failed"),
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.loaded {
		Some(loaded) => HttpResponse::Ok().json(StatsResponse {
			seed_words: loaded.seed_words,
			config: loaded.config.clone(),
			model: loaded.model.stats(),
		}),
		None => HttpResponse::NotFound().body("No seed loaded"),
	}
}

/// HTTP POST endpoint `/v1/expand`
///
/// Stateless: seed words and configuration in, expanded list out.
#[post("/v1/expand")]
async fn post_expand(request: web::Json<ExpandRequest>) -> impl Responder {
	let ExpandRequest { words, config } = request.into_inner();
	let engine = match Engine::new(config) {
		Ok(e) => e,
		Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
	};

	let expanded = web::block(move || {
		let corpus = SeedCorpus::from_words(words, engine.config().min_word_len);
		engine.expand(&corpus, &mut rand::rng())
	})
	.await;
	match expanded {
		Ok(Ok(report)) => wordlist_response(&report.expansion),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(e.to_string()),
		Err(_) => HttpResponse::InternalServerError().body("Generation failed"),
	}
}

#[get("/v1/config")]
async fn get_config() -> impl Responder {
	HttpResponse::Ok().json(MarkovConfig::default())
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(put_seed)
		.service(get_generated)
		.service(get_stats)
		.service(post_expand)
		.service(get_config);
}

/// Main entry point for the server.
///
/// Binds to `WORDUP_BIND` (default 127.0.0.1:5000). Generation runs on the
/// blocking pool so long runs never stall the executor.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let bind = std::env::var("WORDUP_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
	let shared_data = web::Data::new(Mutex::new(SharedData::default()));
	info!("Listening on {bind}");

	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(configure)
	})
		.bind(bind)?
		.run()
		.await
}
