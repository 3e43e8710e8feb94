//! # Parley
//!
//! Activity dispatch and typed turn contexts for conversational agents.
//!
//! ## Overview
//!
//! A channel delivers an inbound [`Activity`](parley_core::Activity); Parley
//! wraps it in a turn, classifies it by its type tag and calls the matching
//! hook of your [`ActivityHandler`](parley_framework::ActivityHandler).
//!
//! ```text
//! ┌────────────────┐     ┌───────────────┐     ┌────────────┐     ┌─────────────────┐
//! │ ChannelAdapter │────▶│ ParleyRuntime │────▶│ dispatcher │────▶│ ActivityHandler │
//! │  (transport)   │◀────│  TurnContext  │     │            │     │   hooks         │
//! └────────────────┘     └───────────────┘     └────────────┘     └─────────────────┘
//! ```
//!
//! - **Core**: the activity schema, the turn object and the adapter boundary
//! - **Framework**: the dispatcher, the handler trait and typed turn views
//! - **Runtime**: configuration, logging and the turn loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl ActivityHandler for Echo {
//!     async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
//!         turn.send_text(turn.activity().text()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder()
//!         .adapter(MyChannel::new())
//!         .handler(Echo)
//!         .build()?;
//!
//!     let (tx, rx) = runtime.inbound_channel();
//!     // feed `tx` from the channel
//!     runtime.run_until_signal(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log lines

pub use parley_core as core;
pub use parley_framework as framework;
pub use parley_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use parley_runtime::{ParleyConfig, ParleyRuntime, RuntimeError};

    // Handlers and typed turns
    pub use parley_framework::{
        ActivityHandler, BoxedHandler, ConversationUpdate, ConversationUpdateActivity, Message,
        MessageActivity, TypedTurn,
    };

    // Turn object and activity schema
    pub use parley_core::{
        Activity, ActivityType, AdapterError, AdapterResult, BoxedAdapter, CancellationToken,
        ChannelAccount, ChannelAdapter, ConversationAccount, ConversationReference, InputHint,
        ResourceResponse, TurnContext, TurnError, TurnResult, TurnState,
    };

    // Interception hooks
    pub use parley_core::{
        DeleteActivityHook, DeleteNext, SendActivitiesHook, SendNext, UpdateActivityHook,
        UpdateNext,
    };
}
