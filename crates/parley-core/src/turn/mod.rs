//! The turn object: one inbound activity plus the means to respond.

pub mod context;
pub mod hooks;
pub mod state;

pub use context::TurnContext;
pub use hooks::{
    DeleteActivityHook, DeleteNext, SendActivitiesHook, SendNext, UpdateActivityHook, UpdateNext,
};
pub use state::TurnState;
