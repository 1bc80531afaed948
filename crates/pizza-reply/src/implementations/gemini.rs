//! Google Gemini reply backend.
//!
//! Calls the Generative Language REST API `generateContent` method with the
//! system instruction as `systemInstruction` and the turn context as a single
//! user message.

use crate::{ReplyError, ReplyFactory, ReplyInterface, ReplyRegistry, ReplyRequest};
use async_trait::async_trait;
use pizza_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini backend settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
	pub api_key: SecretString,
	pub model: String,
	pub endpoint: String,
	pub temperature: f32,
	pub top_p: f32,
	pub top_k: u32,
	pub max_output_tokens: u32,
	pub timeout_seconds: u64,
}

impl GeminiConfig {
	pub fn new(api_key: impl Into<SecretString>) -> Self {
		Self {
			api_key: api_key.into(),
			model: DEFAULT_MODEL.to_string(),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			temperature: 0.7,
			top_p: 0.9,
			top_k: 40,
			max_output_tokens: 1024,
			timeout_seconds: 30,
		}
	}

	/// Reads settings from `[reply.implementations.gemini]`, applying
	/// defaults for everything but the API key.
	pub fn from_toml(config: &toml::Value) -> Result<Self, ReplyError> {
		GeminiConfigSchema
			.validate(config)
			.map_err(|e| ReplyError::Configuration(e.to_string()))?;

		let str_field = |name: &str| config.get(name).and_then(|v| v.as_str());
		let float_field = |name: &str| {
			config
				.get(name)
				.and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
		};
		let int_field = |name: &str| config.get(name).and_then(|v| v.as_integer());
		let u32_field = |name: &str| {
			int_field(name)
				.map(|value| {
					u32::try_from(value).map_err(|_| {
						ReplyError::Configuration(format!("{} is out of range: {}", name, value))
					})
				})
				.transpose()
		};

		let api_key = str_field("api_key")
			.ok_or_else(|| ReplyError::Configuration("api_key is required".into()))?;
		let mut settings = Self::new(api_key);
		if let Some(model) = str_field("model") {
			settings.model = model.to_string();
		}
		if let Some(endpoint) = str_field("endpoint") {
			settings.endpoint = endpoint.trim_end_matches('/').to_string();
		}
		if let Some(temperature) = float_field("temperature") {
			settings.temperature = temperature as f32;
		}
		if let Some(top_p) = float_field("top_p") {
			settings.top_p = top_p as f32;
		}
		if let Some(top_k) = u32_field("top_k")? {
			settings.top_k = top_k;
		}
		if let Some(max_tokens) = u32_field("max_output_tokens")? {
			settings.max_output_tokens = max_tokens;
		}
		if let Some(timeout) = u32_field("timeout_seconds")? {
			settings.timeout_seconds = u64::from(timeout);
		}
		Ok(settings)
	}
}

/// Configuration schema for the Gemini backend.
pub struct GeminiConfigSchema;

impl ConfigSchema for GeminiConfigSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let non_empty = |v: &toml::Value| match v.as_str() {
			Some(s) if !s.trim().is_empty() => Ok(()),
			_ => Err("must not be empty".to_string()),
		};
		let schema = Schema::new(
			vec![Field::new("api_key", FieldType::String).with_validator(non_empty)],
			vec![
				Field::new("model", FieldType::String).with_validator(non_empty),
				Field::new("endpoint", FieldType::String).with_validator(|v| {
					match v.as_str() {
						Some(s) if s.starts_with("http://") || s.starts_with("https://") => Ok(()),
						_ => Err("must be an http(s) URL".to_string()),
					}
				}),
				Field::new(
					"temperature",
					FieldType::Float {
						min: Some(0.0),
						max: Some(2.0),
					},
				),
				Field::new(
					"top_p",
					FieldType::Float {
						min: Some(0.0),
						max: Some(1.0),
					},
				),
				Field::new(
					"top_k",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
				Field::new(
					"max_output_tokens",
					FieldType::Integer {
						min: Some(1),
						max: Some(65536),
					},
				),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
	contents: Vec<Content>,
	#[serde(skip_serializing_if = "Option::is_none")]
	system_instruction: Option<SystemInstruction>,
	generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
	role: &'static str,
	parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
	parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
	text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
	temperature: f32,
	top_p: f32,
	top_k: u32,
	max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
	candidates: Option<Vec<Candidate>>,
	error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
	content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
	#[serde(default)]
	parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
	text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
	message: String,
}

/// Gemini reply backend.
pub struct GeminiReply {
	client: reqwest::Client,
	config: GeminiConfig,
}

impl GeminiReply {
	pub fn new(config: GeminiConfig) -> Result<Self, ReplyError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| ReplyError::Http(e.to_string()))?;
		Ok(Self { client, config })
	}

	fn url(&self) -> String {
		format!(
			"{}/models/{}:generateContent",
			self.config.endpoint, self.config.model
		)
	}

	fn body(&self, request: &ReplyRequest) -> GenerateRequest {
		GenerateRequest {
			contents: vec![Content {
				role: "user",
				parts: vec![Part {
					text: request.context.clone(),
				}],
			}],
			system_instruction: (!request.system.trim().is_empty()).then(|| SystemInstruction {
				parts: vec![Part {
					text: request.system.clone(),
				}],
			}),
			generation_config: GenerationConfig {
				temperature: self.config.temperature,
				top_p: self.config.top_p,
				top_k: self.config.top_k,
				max_output_tokens: self.config.max_output_tokens,
			},
		}
	}
}

/// Pulls the reply text out of a `generateContent` response body.
fn extract_text(body: &str) -> Result<String, ReplyError> {
	let parsed: GenerateResponse =
		serde_json::from_str(body).map_err(|e| ReplyError::Serialization(e.to_string()))?;

	if let Some(error) = parsed.error {
		return Err(ReplyError::Response(format!(
			"Gemini API error: {}",
			error.message
		)));
	}

	let text: String = parsed
		.candidates
		.and_then(|c| c.into_iter().next())
		.and_then(|c| c.content)
		.map(|content| {
			content
				.parts
				.into_iter()
				.filter_map(|p| p.text)
				.collect::<String>()
		})
		.unwrap_or_default();

	if text.trim().is_empty() {
		return Err(ReplyError::Response("No content in response".to_string()));
	}
	Ok(text)
}

#[async_trait]
impl ReplyInterface for GeminiReply {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(GeminiConfigSchema)
	}

	async fn generate(&self, request: &ReplyRequest) -> Result<String, ReplyError> {
		let response = self
			.client
			.post(self.url())
			.header("x-goog-api-key", self.config.api_key.expose_secret())
			.json(&self.body(request))
			.send()
			.await
			.map_err(|e| ReplyError::Http(e.to_string()))?;

		let status = response.status();
		let text = response
			.text()
			.await
			.map_err(|e| ReplyError::Http(e.to_string()))?;

		if !status.is_success() {
			return Err(ReplyError::Response(format!("HTTP {}: {}", status, text)));
		}

		extract_text(&text)
	}
}

/// Factory function to create a Gemini backend from configuration.
///
/// Configuration parameters:
/// - `api_key` (required): usually `${GEMINI_API_KEY}`
/// - `model`, `endpoint`, `temperature`, `top_p`, `top_k`,
///   `max_output_tokens`, `timeout_seconds` (optional)
pub fn create_reply(config: &toml::Value) -> Result<Box<dyn ReplyInterface>, ReplyError> {
	let settings = GeminiConfig::from_toml(config)?;
	tracing::debug!(model = %settings.model, "Configured Gemini reply backend");
	Ok(Box::new(GeminiReply::new(settings)?))
}

/// Registry for the Gemini implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "gemini";
	type Factory = ReplyFactory;

	fn factory() -> Self::Factory {
		create_reply
	}
}

impl ReplyRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use pizza_types::Step;

	#[test]
	fn test_defaults_from_minimal_table() {
		let config: toml::Value = toml::from_str("api_key = \"k\"").unwrap();
		let settings = GeminiConfig::from_toml(&config).unwrap();
		assert_eq!(settings.model, "gemini-2.5-flash");
		assert_eq!(settings.top_k, 40);
		assert_eq!(settings.max_output_tokens, 1024);
		assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
		assert_eq!(settings.api_key.expose_secret(), "k");
	}

	#[test]
	fn test_missing_api_key_rejected() {
		let config: toml::Value = toml::from_str("model = \"gemini-2.5-pro\"").unwrap();
		let err = GeminiConfig::from_toml(&config).err().unwrap();
		assert!(err.to_string().contains("api_key"));
	}

	#[test]
	fn test_out_of_range_temperature_rejected() {
		let config: toml::Value = toml::from_str("api_key = \"k\"\ntemperature = 3.0").unwrap();
		assert!(matches!(
			GeminiConfig::from_toml(&config),
			Err(ReplyError::Configuration(_))
		));
	}

	#[test]
	fn test_oversized_top_k_rejected() {
		let config: toml::Value =
			toml::from_str("api_key = \"k\"\ntop_k = 4294967337").unwrap();
		let err = GeminiConfig::from_toml(&config).err().unwrap();
		assert!(matches!(err, ReplyError::Configuration(ref m) if m.contains("top_k")));
	}

	#[test]
	fn test_integer_settings_read_exactly() {
		let config: toml::Value = toml::from_str(
			"api_key = \"k\"\ntop_k = 64\nmax_output_tokens = 2048\ntimeout_seconds = 45",
		)
		.unwrap();
		let settings = GeminiConfig::from_toml(&config).unwrap();
		assert_eq!(settings.top_k, 64);
		assert_eq!(settings.max_output_tokens, 2048);
		assert_eq!(settings.timeout_seconds, 45);
	}

	#[test]
	fn test_url_keeps_key_out() {
		let mut settings = GeminiConfig::new("secret");
		settings.endpoint = "http://localhost:9999/v1beta".into();
		let backend = GeminiReply::new(settings).unwrap();
		let url = backend.url();
		assert_eq!(
			url,
			"http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
		);
		assert!(!url.contains("secret"));
	}

	#[test]
	fn test_request_body_shape() {
		let backend = GeminiReply::new(GeminiConfig::new("k")).unwrap();
		let body = backend.body(&ReplyRequest {
			system: "You are PizzaBahn".into(),
			context: "Current Step: ask_pizzas".into(),
			step: Step::AskPizzas,
		});
		let json = serde_json::to_value(&body).unwrap();
		assert_eq!(json["contents"][0]["role"], "user");
		assert_eq!(json["contents"][0]["parts"][0]["text"], "Current Step: ask_pizzas");
		assert_eq!(json["systemInstruction"]["parts"][0]["text"], "You are PizzaBahn");
		assert_eq!(json["generationConfig"]["topK"], 40);
		assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
	}

	#[test]
	fn test_extract_text_joins_parts() {
		let body = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"there!"}]}}]}"#;
		assert_eq!(extract_text(body).unwrap(), "Hello there!");
	}

	#[test]
	fn test_extract_text_errors() {
		let api_error = r#"{"error":{"message":"API key not valid","code":400}}"#;
		assert!(extract_text(api_error)
			.unwrap_err()
			.to_string()
			.contains("API key not valid"));

		let empty = r#"{"candidates":[{"content":{"parts":[]}}]}"#;
		assert!(matches!(extract_text(empty), Err(ReplyError::Response(_))));

		assert!(matches!(
			extract_text("not json"),
			Err(ReplyError::Serialization(_))
		));
	}

	#[tokio::test]
	async fn test_unreachable_endpoint_is_http_error() {
		let mut settings = GeminiConfig::new("k");
		settings.endpoint = "http://127.0.0.1:9".into();
		settings.timeout_seconds = 2;
		let backend = GeminiReply::new(settings).unwrap();
		let result = backend
			.generate(&ReplyRequest {
				system: String::new(),
				context: "hi".into(),
				step: Step::Greeting,
			})
			.await;
		assert!(matches!(result, Err(ReplyError::Http(_))));
	}

	#[tokio::test]
	#[ignore = "requires live GEMINI_API_KEY and network"]
	async fn test_live_gemini_reply_when_env_set() {
		let api_key = match std::env::var("GEMINI_API_KEY") {
			Ok(v) if !v.trim().is_empty() => v,
			_ => return,
		};
		let backend = GeminiReply::new(GeminiConfig::new(api_key)).unwrap();
		let reply = backend
			.generate(&ReplyRequest {
				system: "You are a concise assistant.".into(),
				context: "Reply with exactly: OK".into(),
				step: Step::Greeting,
			})
			.await
			.unwrap();
		assert!(!reply.trim().is_empty());
	}
}
