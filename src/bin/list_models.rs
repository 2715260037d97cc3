//! Lists the Gemini models available to `GEMINI_API_KEY` that can serve
//! `generateContent`, for choosing a value of `GEMINI_MODEL`.

use anyhow::{Context, Result};
use forum_seo_agent::llm::GeminiClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
    let client = GeminiClient::new(api_key, forum_seo_agent::config::DEFAULT_GEMINI_MODEL);

    println!("--- Available Gemini Models ---");
    let models = client
        .list_models()
        .await
        .context("Failed to list models; check that GEMINI_API_KEY is valid")?;

    let usable: Vec<_> = models
        .iter()
        .filter(|m| m.supports_generate_content())
        .collect();

    if usable.is_empty() {
        println!("No models supporting 'generateContent' were found for this API key.");
        return Ok(());
    }

    for model in &usable {
        println!("Model name:        {}", model.name);
        if let Some(display_name) = &model.display_name {
            println!("Display name:      {}", display_name);
        }
        println!(
            "Supported methods: {}\n",
            model.supported_generation_methods.join(", ")
        );
    }

    println!("Set GEMINI_MODEL to one of the model names above.");
    Ok(())
}
