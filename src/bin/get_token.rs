//! One-time helper that obtains a Reddit refresh token.
//!
//! Prints an authorization URL, waits for Reddit to redirect the browser to a
//! temporary local server, checks the `state` value and exchanges the code
//! for a permanent refresh token.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use rand::Rng;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const LISTEN_ADDR: &str = "localhost:8080";
const AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const SCOPES: &str = "identity read submit";
const USER_AGENT: &str = "forum-seo-agent token helper";

const DONE_PAGE: &str =
    "<html><body>Token received. You can close this window.</body></html>";
const WAITING_PAGE: &str = "<html><body>Waiting for the Reddit redirect...</body></html>";

#[derive(Debug, PartialEq, Eq)]
struct Redirect {
    code: String,
    state: String,
}

/// Query string of the redirect back from Reddit.
#[derive(Debug, Default, Deserialize)]
struct RedirectParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl RedirectParams {
    /// `None` when the request is not the authorization redirect at all.
    fn outcome(self) -> Option<Result<Redirect>> {
        if let Some(error) = self.error {
            return Some(Err(anyhow!("Authorization was denied: {}", error)));
        }
        match (self.code, self.state) {
            (Some(code), Some(state)) => Some(Ok(Redirect { code, state })),
            (Some(_), None) => Some(Err(anyhow!("Redirect carried a code but no state"))),
            (None, _) => None,
        }
    }
}

/// Sender for the first redirect outcome; taken once.
type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<Result<Redirect>>>>>;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn authorize_url(client_id: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("state", state),
            ("redirect_uri", REDIRECT_URI),
            ("duration", "permanent"),
            ("scope", SCOPES),
        ],
    )
    .context("Failed to build authorization URL")
}

async fn handle_redirect(
    State(slot): State<OutcomeSlot>,
    Query(params): Query<RedirectParams>,
) -> Html<&'static str> {
    let Some(outcome) = params.outcome() else {
        return Html(WAITING_PAGE);
    };
    if let Some(tx) = slot.lock().await.take() {
        let _ = tx.send(outcome);
    }
    Html(DONE_PAGE)
}

fn redirect_router(slot: OutcomeSlot) -> Router {
    Router::new()
        .route("/", get(handle_redirect))
        .with_state(slot)
}

/// Serve on `listener` until a request carrying `code` or `error` arrives.
///
/// Preconnects, favicon fetches and other stray requests are answered and
/// ignored.
async fn serve_redirect(listener: TcpListener) -> Result<Redirect> {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = redirect_router(Arc::new(Mutex::new(Some(outcome_tx))));

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let outcome = outcome_rx
        .await
        .context("Redirect server stopped before a redirect arrived")?;

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(Duration::from_secs(2), server).await {
        Ok(Ok(Err(e))) => eprintln!("Redirect server error: {}", e),
        Ok(Err(e)) => eprintln!("Redirect server task failed: {}", e),
        Ok(Ok(Ok(()))) | Err(_) => {}
    }

    outcome
}

async fn wait_for_redirect() -> Result<Redirect> {
    let listener = TcpListener::bind(LISTEN_ADDR).await.with_context(|| {
        format!("Failed to listen on {} (is another server running?)", LISTEN_ADDR)
    })?;
    serve_redirect(listener).await
}

async fn exchange_code(client_id: &str, client_secret: &str, code: &str) -> Result<String> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let response = client
        .post(TOKEN_URL)
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
        ])
        .send()
        .await
        .context("Token request failed")?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("Token endpoint returned HTTP {}: {}", status, body);
    }

    let token: TokenResponse =
        serde_json::from_str(&body).with_context(|| format!("Unexpected token response: {body}"))?;
    match (token.refresh_token, token.error) {
        (Some(refresh_token), None) => Ok(refresh_token),
        (_, Some(error)) => bail!("Token endpoint rejected the code: {}", error),
        (None, None) => bail!("No refresh token in response (was duration=permanent requested?)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("--- Reddit Refresh Token Generator ---");

    let client_id = prompt("Enter your Reddit App Client ID: ")?;
    let client_secret = prompt("Enter your Reddit App Client Secret: ")?;

    println!("\nMake sure your app's redirect uri is set to EXACTLY: {}", REDIRECT_URI);
    prompt("Press ENTER to continue if this is correct...")?;

    let state = rand::thread_rng().gen_range(0..65000).to_string();
    let url = authorize_url(&client_id, &state)?;

    println!("\nOpen this URL in your browser, log in and click 'Allow':\n\n{}\n", url);
    println!("Waiting for authorization code...");

    let redirect = wait_for_redirect().await?;
    if redirect.state != state {
        bail!("State mismatch. Please run the helper again.");
    }

    println!("\nAuthorization code received! Fetching refresh token...");
    let refresh_token = exchange_code(&client_id, &client_secret, &redirect.code).await?;

    println!("\n--- SUCCESS! ---");
    println!("Your refresh token is:\n\n{}\n", refresh_token);
    println!("Store it as REDDIT_REFRESH_TOKEN. Do NOT share it.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> RedirectParams {
        let uri: axum::http::Uri = format!("/?{query}").parse().unwrap();
        let Query(params) = Query::<RedirectParams>::try_from_uri(&uri).unwrap();
        params
    }

    #[test]
    fn test_redirect_params() {
        assert_eq!(
            params("state=4242&code=abc-123").outcome().unwrap().unwrap(),
            Redirect {
                code: "abc-123".into(),
                state: "4242".into()
            }
        );
    }

    #[test]
    fn test_redirect_params_denied() {
        let err = params("state=1&error=access_denied")
            .outcome()
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn test_unrelated_request_is_not_an_outcome() {
        assert!(params("").outcome().is_none());
        assert!(params("state=1").outcome().is_none());
        assert!(params("code=abc").outcome().unwrap().is_err());
    }

    #[tokio::test]
    async fn test_server_skips_stray_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_redirect(listener));

        // Browser preconnect that never sends a request.
        let idle = tokio::net::TcpStream::connect(addr).await.unwrap();
        drop(idle);

        let client = reqwest::Client::new();
        let favicon = client
            .get(format!("http://{addr}/favicon.ico"))
            .send()
            .await
            .unwrap();
        assert_eq!(favicon.status(), reqwest::StatusCode::NOT_FOUND);

        let bare = client.get(format!("http://{addr}/")).send().await.unwrap();
        assert_eq!(bare.text().await.unwrap(), WAITING_PAGE);

        let redirect = client
            .get(format!("http://{addr}/?state=1&code=abc"))
            .send()
            .await
            .unwrap();
        assert_eq!(redirect.text().await.unwrap(), DONE_PAGE);

        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(
            result,
            Redirect {
                code: "abc".into(),
                state: "1".into()
            }
        );
    }

    #[test]
    fn test_authorize_url() {
        let url = authorize_url("cid", "77").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("duration".into(), "permanent".into())));
        assert!(pairs.contains(&("scope".into(), "identity read submit".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:8080".into())));
        assert!(pairs.contains(&("state".into(), "77".into())));
    }
}
