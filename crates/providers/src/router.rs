//! Backend selection: builds the configured reasoner from `AppConfig`.

use std::sync::Arc;

use billwise_config::AppConfig;
use billwise_core::error::ReasoningError;
use billwise_core::reasoner::Reasoner;

use crate::DEFAULT_SYSTEM_PROMPT;
use crate::openai_compat::OpenAiCompatReasoner;

/// Backends that run locally and need no API key.
pub const KEYLESS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

pub fn is_keyless(provider_name: &str) -> bool {
    KEYLESS.contains(&provider_name)
}

/// True when the default backend is hosted and no key is available for it.
pub fn missing_api_key(config: &AppConfig) -> bool {
    !config.has_api_key() && !is_keyless(&config.default_provider)
}

/// Build the default reasoner described by `config`.
///
/// Fails with `NotConfigured` when a hosted backend has no API key.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Reasoner>, ReasoningError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = match config.api_key_for(name) {
        Some(key) => key,
        None if is_keyless(name) => name.to_string(),
        None => {
            return Err(ReasoningError::NotConfigured(format!(
                "no API key for backend '{name}'"
            )));
        }
    };

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    let model = provider_config
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());

    let system_prompt = config
        .agent
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    tracing::debug!(backend = name, %base_url, %model, "Building reasoner");

    let reasoner = OpenAiCompatReasoner::new(name, base_url, api_key, model)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_system_prompt(system_prompt);

    Ok(Arc::new(reasoner))
}

/// Get the default base URL for well-known backends.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "fireworks" => "https://api.fireworks.ai/inference/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
