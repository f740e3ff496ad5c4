//! Core domain logic for beckon, a Discord summon bot.
//!
//! Everything in this crate is platform-agnostic and synchronous:
//! - `config` - layered configuration (defaults, TOML file, env, overrides)
//! - `announce` - the announcement formatter
//! - `picker` - member-picker selection state and session timeout
//! - `reconcile` - the "is a summon button already posted?" decision
//!
//! The Discord integration lives in `beckon-discord`; this crate never
//! touches the network.

pub mod announce;
pub mod config;
pub mod picker;
pub mod reconcile;

pub use announce::{format_announcement, mention_token, UserRef};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use picker::{
    PickerError, SelectionBuffer, SessionStore, MAX_SELECTION, MIN_SELECTION, PICKER_TIMEOUT,
};
pub use reconcile::{decide, ReconcileAction, ScannedMessage, HISTORY_SCAN_LIMIT};
