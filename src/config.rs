//! Agent configuration.
//!
//! All settings are read once at startup into a [`Config`] value which is then
//! passed by reference into the agent. Nothing below `main` reads the process
//! environment.
//!
//! Required variables:
//! - `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`, `REDDIT_REFRESH_TOKEN`, `REDDIT_USER_AGENT`
//! - `GEMINI_API_KEY`
//! - `TARGET_KEYWORD` - matched case-insensitively against post titles
//! - `YOUR_BLOG_BASE_URL` - prefix for citation links
//!
//! Optional variables:
//! - `HOT_POST_LIMIT` (default 10)
//! - `SUBREDDIT_SEARCH_LIMIT` (default 5)
//! - `COOLDOWN_SECS` (default 600)
//! - `GEMINI_MODEL` (default `gemini-2.5-pro`)
//! - `BLOG_POSTS_DIR` (default `blog_posts`)
//! - `COMMENTED_LOG_FILE` (default `commented_posts.log`)
//! - `EXCERPT_CHARS` (default 4000)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HOT_POST_LIMIT: usize = 10;
pub const DEFAULT_SUBREDDIT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_COOLDOWN_SECS: u64 = 600;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_CORPUS_DIR: &str = "blog_posts";
pub const DEFAULT_LEDGER_PATH: &str = "commented_posts.log";
pub const DEFAULT_EXCERPT_CHARS: usize = 4000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Reddit OAuth credentials for a script/installed app using a refresh token.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Settings for reply composition.
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    /// Prefix for citation links; the document id is appended verbatim.
    pub base_url: String,
    /// Number of characters of the document shown to the generator.
    pub excerpt_chars: usize,
}

#[derive(Clone)]
pub struct Config {
    pub reddit: RedditCredentials,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Lower-cased search keyword.
    pub target_keyword: String,
    pub responder: ResponderSettings,
    pub corpus_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub hot_post_limit: usize,
    pub subreddit_search_limit: usize,
    /// Pause after every successful reply.
    pub cooldown: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("reddit", &self.reddit)
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("target_keyword", &self.target_keyword)
            .field("responder", &self.responder)
            .field("corpus_dir", &self.corpus_dir)
            .field("ledger_path", &self.ledger_path)
            .field("hot_post_limit", &self.hot_post_limit)
            .field("subreddit_search_limit", &self.subreddit_search_limit)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let optional = |key: &'static str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let reddit = RedditCredentials {
            client_id: required("REDDIT_CLIENT_ID")?,
            client_secret: required("REDDIT_CLIENT_SECRET")?,
            refresh_token: required("REDDIT_REFRESH_TOKEN")?,
            user_agent: required("REDDIT_USER_AGENT")?,
        };

        Ok(Self {
            reddit,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            target_keyword: required("TARGET_KEYWORD")?.to_lowercase(),
            responder: ResponderSettings {
                base_url: required("YOUR_BLOG_BASE_URL")?,
                excerpt_chars: parse_or(
                    "EXCERPT_CHARS",
                    optional("EXCERPT_CHARS"),
                    DEFAULT_EXCERPT_CHARS,
                )?,
            },
            corpus_dir: optional("BLOG_POSTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_DIR)),
            ledger_path: optional("COMMENTED_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            hot_post_limit: parse_or(
                "HOT_POST_LIMIT",
                optional("HOT_POST_LIMIT"),
                DEFAULT_HOT_POST_LIMIT,
            )?,
            subreddit_search_limit: parse_or(
                "SUBREDDIT_SEARCH_LIMIT",
                optional("SUBREDDIT_SEARCH_LIMIT"),
                DEFAULT_SUBREDDIT_SEARCH_LIMIT,
            )?,
            cooldown: Duration::from_secs(parse_or(
                "COOLDOWN_SECS",
                optional("COOLDOWN_SECS"),
                DEFAULT_COOLDOWN_SECS,
            )?),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("REDDIT_CLIENT_ID", "cid"),
            ("REDDIT_CLIENT_SECRET", "secret"),
            ("REDDIT_REFRESH_TOKEN", "refresh"),
            ("REDDIT_USER_AGENT", "seo-agent/0.1"),
            ("GEMINI_API_KEY", "AIza-key"),
            ("TARGET_KEYWORD", "Python"),
            ("YOUR_BLOG_BASE_URL", "https://blog.example.com/"),
        ])
    }

    fn build(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = build(&base_env()).unwrap();
        assert_eq!(config.hot_post_limit, 10);
        assert_eq!(config.subreddit_search_limit, 5);
        assert_eq!(config.cooldown, Duration::from_secs(600));
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.corpus_dir, PathBuf::from("blog_posts"));
        assert_eq!(config.ledger_path, PathBuf::from("commented_posts.log"));
        assert_eq!(config.responder.excerpt_chars, 4000);
    }

    #[test]
    fn test_keyword_is_lowercased() {
        let config = build(&base_env()).unwrap();
        assert_eq!(config.target_keyword, "python");
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.insert("HOT_POST_LIMIT", "25");
        env.insert("SUBREDDIT_SEARCH_LIMIT", "2");
        env.insert("COOLDOWN_SECS", "0");
        let config = build(&env).unwrap();
        assert_eq!(config.hot_post_limit, 25);
        assert_eq!(config.subreddit_search_limit, 2);
        assert_eq!(config.cooldown, Duration::ZERO);
    }

    #[test]
    fn test_missing_required_key() {
        let mut env = base_env();
        env.remove("GEMINI_API_KEY");
        assert_eq!(
            build(&env).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
    }

    #[test]
    fn test_blank_required_key_counts_as_missing() {
        let mut env = base_env();
        env.insert("TARGET_KEYWORD", "   ");
        assert_eq!(
            build(&env).unwrap_err(),
            ConfigError::Missing("TARGET_KEYWORD")
        );
    }

    #[test]
    fn test_invalid_number() {
        let mut env = base_env();
        env.insert("COOLDOWN_SECS", "ten minutes");
        match build(&env).unwrap_err() {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "COOLDOWN_SECS");
                assert_eq!(value, "ten minutes");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = build(&base_env()).unwrap();
        let rendered = format!("{:?}", config.reddit);
        assert!(!rendered.contains("refresh\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_debug_redacts_all_secrets() {
        let config = build(&base_env()).unwrap();
        let rendered = format!("{:?}", config);
        for secret in ["AIza-key", "\"secret\"", "\"refresh\""] {
            assert!(!rendered.contains(secret), "{secret} leaked: {rendered}");
        }
        assert!(rendered.contains("gemini-2.5-pro"));
        assert!(rendered.contains("cid"));
    }
}
