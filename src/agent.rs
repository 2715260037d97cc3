//! The agent loop.
//!
//! One sequential pass over the forum:
//!
//! ```text
//! Authenticating -> LoadingCorpus -> LoadingLedger -> Searching
//!     -> ScanningSubreddit -> EvaluatingPost
//!         -> Matching -> Generating -> Posting -> Cooldown
//!     -> ... -> Done
//! ```
//!
//! Every admitted post ends up in the ledger whatever happens to it, so it is
//! never considered again. Only a successful reply is followed by a cooldown.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::corpus::{Corpus, CorpusError, CorpusSource};
use crate::forum::{CandidateItem, ForumClient, ForumError, Session, Subreddit};
use crate::ledger::Ledger;
use crate::llm::TextGenerator;
use crate::matcher;
use crate::responder;

/// Failures that stop the agent before it scans anything.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to authenticate with the forum: {0}")]
    Auth(#[source] ForumError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("failed to open ledger {path}: {source}")]
    Ledger {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Authenticating,
    LoadingCorpus,
    LoadingLedger,
    Searching,
    ScanningSubreddit,
    EvaluatingPost,
    Matching,
    Generating,
    Posting,
    Cooldown,
    Done,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authenticating => "authenticating",
            Self::LoadingCorpus => "loading_corpus",
            Self::LoadingLedger => "loading_ledger",
            Self::Searching => "searching",
            Self::ScanningSubreddit => "scanning_subreddit",
            Self::EvaluatingPost => "evaluating_post",
            Self::Matching => "matching",
            Self::Generating => "generating",
            Self::Posting => "posting",
            Self::Cooldown => "cooldown",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Delay between outbound actions.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What happened to one admitted post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Posted,
    Unmatched,
    GenerationFailed,
    PostFailed,
}

/// Counters reported when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub subreddits_scanned: usize,
    pub posts_seen: usize,
    pub posts_admitted: usize,
    pub replies_posted: usize,
    pub unmatched: usize,
    pub generation_failures: usize,
    pub post_failures: usize,
    /// Set when searching or scanning failed and the run stopped early.
    pub aborted: Option<String>,
}

impl RunSummary {
    fn record(&mut self, outcome: PostOutcome) {
        match outcome {
            PostOutcome::Posted => self.replies_posted += 1,
            PostOutcome::Unmatched => self.unmatched += 1,
            PostOutcome::GenerationFailed => self.generation_failures += 1,
            PostOutcome::PostFailed => self.post_failures += 1,
        }
    }
}

pub struct Agent<'a, F, G, P> {
    config: &'a Config,
    forum: F,
    generator: G,
    pacer: P,
}

impl<'a, F, G, P> Agent<'a, F, G, P>
where
    F: ForumClient,
    G: TextGenerator,
    P: Pacer,
{
    pub fn new(config: &'a Config, forum: F, generator: G, pacer: P) -> Self {
        Self {
            config,
            forum,
            generator,
            pacer,
        }
    }

    fn enter(&self, state: AgentState) {
        tracing::debug!(%state, "Agent state");
    }

    /// Authenticate, load the corpus and ledger, then scan the forum once.
    pub async fn run(&self, corpus_source: &dyn CorpusSource) -> Result<RunSummary, SetupError> {
        self.enter(AgentState::Authenticating);
        let session = self
            .forum
            .authenticate(&self.config.reddit)
            .await
            .map_err(SetupError::Auth)?;
        tracing::info!("Authenticated as forum user: {}", session.username);

        self.enter(AgentState::LoadingCorpus);
        let corpus = Corpus::load(corpus_source)?;

        self.enter(AgentState::LoadingLedger);
        let mut ledger =
            Ledger::open(&self.config.ledger_path).map_err(|source| SetupError::Ledger {
                path: self.config.ledger_path.display().to_string(),
                source,
            })?;

        let summary = self.scan(&session, &corpus, &mut ledger).await;

        self.enter(AgentState::Done);
        tracing::info!(
            subreddits = summary.subreddits_scanned,
            seen = summary.posts_seen,
            admitted = summary.posts_admitted,
            posted = summary.replies_posted,
            unmatched = summary.unmatched,
            generation_failures = summary.generation_failures,
            post_failures = summary.post_failures,
            aborted = summary.aborted.is_some(),
            "Agent has finished its run"
        );

        Ok(summary)
    }

    /// Search for communities and walk their hot posts.
    pub async fn scan(
        &self,
        session: &Session,
        corpus: &Corpus,
        ledger: &mut Ledger,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let keyword = &self.config.target_keyword;

        self.enter(AgentState::Searching);
        tracing::info!("Searching for posts related to keyword: '{}'", keyword);
        let subreddits = match self
            .forum
            .search_subreddits(session, keyword, self.config.subreddit_search_limit)
            .await
        {
            Ok(subreddits) => subreddits,
            Err(e) => {
                tracing::error!("An error occurred while searching subreddits: {}", e);
                summary.aborted = Some(e.to_string());
                return summary;
            }
        };

        for subreddit in &subreddits {
            if let Err(e) = self
                .scan_subreddit(session, subreddit, corpus, ledger, &mut summary)
                .await
            {
                tracing::error!(
                    "An error occurred while scanning r/{}: {}",
                    subreddit.display_name,
                    e
                );
                summary.aborted = Some(e.to_string());
                break;
            }
        }

        summary
    }

    async fn scan_subreddit(
        &self,
        session: &Session,
        subreddit: &Subreddit,
        corpus: &Corpus,
        ledger: &mut Ledger,
        summary: &mut RunSummary,
    ) -> Result<(), ForumError> {
        self.enter(AgentState::ScanningSubreddit);
        tracing::info!("Scanning subreddit: r/{}", subreddit.display_name);

        let posts = self
            .forum
            .hot_posts(session, subreddit, self.config.hot_post_limit)
            .await?;
        summary.subreddits_scanned += 1;

        for post in &posts {
            summary.posts_seen += 1;
            self.enter(AgentState::EvaluatingPost);
            if !self.admits(post, ledger) {
                continue;
            }

            summary.posts_admitted += 1;
            tracing::info!("Found a relevant post: '{}' (ID: {})", post.title, post.id);
            let outcome = self.handle_post(session, post, corpus, ledger).await;
            summary.record(outcome);
        }

        Ok(())
    }

    /// Keyword in title, not yet handled, not archived.
    pub fn admits(&self, post: &CandidateItem, ledger: &Ledger) -> bool {
        post.title.to_lowercase().contains(&self.config.target_keyword)
            && !ledger.contains(&post.id)
            && !post.archived
    }

    async fn handle_post(
        &self,
        session: &Session,
        post: &CandidateItem,
        corpus: &Corpus,
        ledger: &mut Ledger,
    ) -> PostOutcome {
        let outcome = self.respond(session, post, corpus, ledger).await;

        // Marked whatever the outcome; a successful reply was already
        // recorded before its cooldown and is recorded again here.
        self.mark_processed(ledger, &post.id);
        outcome
    }

    async fn respond(
        &self,
        session: &Session,
        post: &CandidateItem,
        corpus: &Corpus,
        ledger: &mut Ledger,
    ) -> PostOutcome {
        self.enter(AgentState::Matching);
        let Some(document_id) = matcher::best_match(&post.title, corpus) else {
            tracing::info!("No relevant document found for this title");
            return PostOutcome::Unmatched;
        };
        tracing::info!("Best document match: '{}'", document_id);

        self.enter(AgentState::Generating);
        let document_text = corpus.get(document_id).unwrap_or_default();
        let message = match responder::compose(
            &post.title,
            document_id,
            document_text,
            &self.generator,
            &self.config.responder,
        )
        .await
        {
            Ok(message) => message,
            Err(_) => {
                tracing::info!("Could not generate a reply");
                return PostOutcome::GenerationFailed;
            }
        };

        tracing::info!("Preview of reply:\n{}", message.body);

        self.enter(AgentState::Posting);
        match self.forum.reply(session, &post.id, &message.body).await {
            Ok(()) => {
                tracing::info!(post = %post.id, "Successfully posted reply");
                self.mark_processed(ledger, &post.id);

                self.enter(AgentState::Cooldown);
                tracing::info!("Waiting {:?} before next action", self.config.cooldown);
                self.pacer.pause(self.config.cooldown).await;
                PostOutcome::Posted
            }
            Err(e) => {
                tracing::error!(post = %post.id, "Failed to post reply: {}", e);
                PostOutcome::PostFailed
            }
        }
    }

    fn mark_processed(&self, ledger: &mut Ledger, id: &str) {
        if let Err(e) = ledger.append(id) {
            tracing::error!(
                post = id,
                "Failed to persist ledger entry to {}: {}",
                ledger.path().display(),
                e
            );
        }
    }
}
