use forum_seo_agent::corpus::DirectorySource;
use forum_seo_agent::forum::RedditClient;
use forum_seo_agent::llm::GeminiClient;
use forum_seo_agent::{Agent, Config, TokioPacer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("Forum SEO agent initializing");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let forum = match RedditClient::new(&config.reddit.user_agent) {
        Ok(forum) => forum,
        Err(e) => {
            tracing::error!("Failed to create Reddit client: {}", e);
            std::process::exit(1);
        }
    };
    let generator = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let corpus_source = DirectorySource::new(&config.corpus_dir);

    tracing::info!(
        keyword = %config.target_keyword,
        model = %generator.model(),
        corpus = %config.corpus_dir.display(),
        ledger = %config.ledger_path.display(),
        "Configuration loaded"
    );

    let agent = Agent::new(&config, forum, generator, TokioPacer);
    match agent.run(&corpus_source).await {
        Ok(summary) => {
            if let Some(reason) = summary.aborted {
                tracing::warn!("Run stopped early: {}", reason);
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
