//! LLM Provider implementations for Shellwright.
//!
//! All providers implement the `shellwright_core::Provider` trait.

pub mod gemini;

use std::sync::Arc;

use shellwright_config::AppConfig;
use shellwright_core::error::ProviderError;
use shellwright_core::provider::Provider;

pub use gemini::GeminiProvider;

/// Build the configured provider.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;
    let provider = GeminiProvider::new(api_key)?.with_base_url(&config.base_url);
    Ok(Arc::new(provider))
}
