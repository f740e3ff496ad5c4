//! Discord integration for beckon.
//!
//! This crate wires the platform-agnostic core to the Discord gateway:
//! - **Gateway seam** (`gateway`) - traits the side-effecting operations go
//!   through, so the flows are testable with scripted fakes
//! - **Reconciler** (`reconciler`) - per-guild startup pass that ensures the
//!   persistent summon button exists in the button channel
//! - **Summon flow** (`summon`) - confirm-time channel resolution, send, and
//!   per-outcome ephemeral reply text
//! - **Components** (`components`) - fixed component identifiers, serenity
//!   UI builders, and the custom-id router
//! - **Handler** (`handler`) - the serenity `EventHandler` and the real
//!   gateway implementation over `serenity::http`
//!
//! # Key Types
//!
//! - `SummonBot` - the event handler object, constructed once at startup
//! - `GuildGateway` / `AnnouncePort` - the seams the reconciler and summon
//!   flow run against
//! - `build_client` - serenity client construction with the right intents

pub mod components;
pub mod gateway;
pub mod handler;
pub mod reconciler;
pub mod summon;

pub use handler::{build_client, SummonBot};

// The binary crate names these without depending on serenity itself.
pub use serenity::{Client, Error as ClientError};
