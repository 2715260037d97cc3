//! # Forum SEO Agent
//!
//! An autonomous agent that answers forum posts with helpful replies grounded
//! in a local corpus of blog posts, citing the post it drew from.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────┐   posts    ┌─────────┐  document  ┌───────────┐
//!   │ ForumClient  │──────────▶│ Matcher │──────────▶│ Responder │──▶ TextGenerator
//!   │  (Reddit)    │            └─────────┘            └─────┬─────┘     (Gemini)
//!   └──────▲───────┘                                         │
//!          │ reply                                            │ message
//!          └────────────────────── Agent ◀────────────────────┘
//!                                    │
//!                                    ▼
//!                                 Ledger (append-only file)
//! ```
//!
//! ## Run Flow
//! 1. Authenticate with the forum
//! 2. Load the corpus and the ledger of handled posts
//! 3. Search communities for the target keyword and walk their hot posts
//! 4. Match, generate, reply, record, cool down
//!
//! ## Modules
//! - `agent`: the sequential run loop and its pacing
//! - `config`: settings read once from the environment
//! - `corpus`: reference documents
//! - `forum`: forum capability and the Reddit client
//! - `ledger`: durable record of handled posts
//! - `llm`: text-generation capability and the Gemini client
//! - `matcher`: title to document selection
//! - `responder`: prompt and citation composition

pub mod agent;
pub mod config;
pub mod corpus;
pub mod forum;
pub mod ledger;
pub mod llm;
pub mod matcher;
pub mod responder;

pub use agent::{Agent, AgentState, Pacer, RunSummary, SetupError, TokioPacer};
pub use config::Config;
