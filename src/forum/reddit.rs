//! Reddit OAuth API client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{CandidateItem, ForumClient, ForumError, Session, Subreddit};
use crate::config::RedditCredentials;

const REDDIT_AUTH_URL: &str = "https://www.reddit.com";
const REDDIT_API_URL: &str = "https://oauth.reddit.com";

/// Base URLs for the two Reddit hosts.
#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    /// Host serving `/api/v1/access_token`.
    pub auth_base: String,
    /// Host serving authenticated API calls.
    pub api_base: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            auth_base: REDDIT_AUTH_URL.to_string(),
            api_base: REDDIT_API_URL.to_string(),
        }
    }
}

impl RedditEndpoints {
    /// Point both hosts at one server (used by tests).
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            auth_base: base.clone(),
            api_base: base,
        }
    }
}

pub struct RedditClient {
    client: Client,
    endpoints: RedditEndpoints,
}

impl RedditClient {
    pub fn new(user_agent: &str) -> Result<Self, ForumError> {
        Self::with_endpoints(user_agent, RedditEndpoints::default())
    }

    pub fn with_endpoints(
        user_agent: &str,
        endpoints: RedditEndpoints,
    ) -> Result<Self, ForumError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ForumError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoints })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.api_base, path)
    }

    async fn send(request: RequestBuilder) -> Result<Response, ForumError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ForumError::Network(format!("Request timeout: {}", e))
            } else if e.is_connect() {
                ForumError::Network(format!("Connection failed: {}", e))
            } else {
                ForumError::Network(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForumError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ForumError> {
        let body = response
            .text()
            .await
            .map_err(|e| ForumError::Network(format!("Failed to read body: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| ForumError::Decode(format!("{}, body: {}", e, body)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ForumError> {
        let request = self
            .client
            .get(self.api_url(path))
            .bearer_auth(&session.access_token)
            .query(query)
            .query(&[("raw_json", "1")]);
        Self::decode(Self::send(request).await?).await
    }
}

#[async_trait]
impl ForumClient for RedditClient {
    async fn authenticate(&self, credentials: &RedditCredentials) -> Result<Session, ForumError> {
        let request = self
            .client
            .post(format!("{}/api/v1/access_token", self.endpoints.auth_base))
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ]);

        let response = Self::send(request).await.map_err(|e| match e {
            ForumError::Http { status, body } => {
                ForumError::Auth(format!("token endpoint returned HTTP {}: {}", status, body))
            }
            other => other,
        })?;

        let token: TokenResponse = Self::decode(response).await?;
        let access_token = match (token.access_token, token.error) {
            (Some(access_token), None) => access_token,
            (_, Some(error)) => return Err(ForumError::Auth(error)),
            (None, None) => return Err(ForumError::Auth("no access token in response".into())),
        };

        let me_request = self
            .client
            .get(self.api_url("/api/v1/me"))
            .bearer_auth(&access_token);
        let me_response = Self::send(me_request)
            .await
            .map_err(|e| ForumError::Auth(format!("failed to resolve identity: {}", e)))?;
        let me: MeResponse = Self::decode(me_response).await?;

        tracing::debug!(scope = ?token.scope, "Obtained Reddit access token");

        Ok(Session {
            access_token,
            username: me.name,
        })
    }

    async fn search_subreddits(
        &self,
        session: &Session,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Subreddit>, ForumError> {
        let listing: Listing<SubredditData> = self
            .get_json(
                session,
                "/subreddits/search",
                &[("q", keyword.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(listing
            .into_items()
            .take(limit)
            .map(|s| Subreddit {
                display_name: s.display_name,
            })
            .collect())
    }

    async fn hot_posts(
        &self,
        session: &Session,
        subreddit: &Subreddit,
        limit: usize,
    ) -> Result<Vec<CandidateItem>, ForumError> {
        let path = format!("/r/{}/hot", subreddit.display_name);
        let listing: Listing<PostData> = self
            .get_json(session, &path, &[("limit", limit.to_string())])
            .await?;

        Ok(listing
            .into_items()
            .take(limit)
            .map(|p| CandidateItem {
                id: p.id,
                title: p.title,
                archived: p.archived,
            })
            .collect())
    }

    async fn reply(&self, session: &Session, post_id: &str, body: &str) -> Result<(), ForumError> {
        let thing_id = format!("t3_{}", post_id);
        let request = self
            .client
            .post(self.api_url("/api/comment"))
            .bearer_auth(&session.access_token)
            .form(&[
                ("api_type", "json"),
                ("thing_id", thing_id.as_str()),
                ("text", body),
            ]);

        let response: CommentResponse = Self::decode(Self::send(request).await?).await?;
        let errors = response.json.map(|j| j.errors).unwrap_or_default();
        if !errors.is_empty() {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(ForumError::Rejected(rendered.join("; ")));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

impl<T> Listing<T> {
    fn into_items(self) -> impl Iterator<Item = T> {
        self.data.children.into_iter().map(|c| c.data)
    }
}

#[derive(Debug, Deserialize)]
struct SubredditData {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: String,
    title: String,
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    #[serde(default)]
    json: Option<CommentJson>,
}

#[derive(Debug, Deserialize)]
struct CommentJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}
