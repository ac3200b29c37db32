//! kaiwa-core: Embeddable engine for the kaiwa enterprise chat client.
//!
//! Provides the conversation transcript, the chat-completion API client
//! (streaming SSE decode and blocking fallback), the credential provider
//! seam with the group-membership gate, and session orchestration.
//!
//! # Quick Start
//!
//! ```no_run
//! // Requires ~/.kaiwa/config.toml with a base_url and an access token.
//! use kaiwa_core::{CollectingSink, Config, Session, StaticTokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = Config::load()?;
//!     let provider = StaticTokenProvider::from_config(&config)?;
//!     let mut session = Session::new(config)?;
//!     let mut sink = CollectingSink::new();
//!
//!     session.send("Hello!", &provider, &mut sink).await?;
//!     println!("Response: {}", sink.text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use api::{CollectingSink, ResponseEvent, ResponseSink, Usage};
pub use auth::{StaticTokenProvider, TokenProvider};
pub use config::Config;
pub use session::Session;
pub use transcript::{EntryId, Message, Role, Transcript};
