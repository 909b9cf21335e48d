//! Pure effect interfaces.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effects
//! - **Implementation**: `vitalis-effects` (production), `vitalis-testkit` (deterministic)
//! - **Usage**: step controllers and the credential gateway in `vitalis-app`
//!
//! Controllers receive these as `Arc<dyn ...>` at mount time. Nothing here
//! holds global state, so two workflow instances never share a handler
//! unless the host passes them the same one.

pub mod navigation;
pub mod network;
pub mod storage;
pub mod time;

pub use navigation::{NavigationEffects, NavigationPayload};
pub use network::{HttpEffects, HttpResponse, NetworkError};
pub use storage::TokenStore;
pub use time::{TimeError, TimerEffects, TimerHandle, TimerTask};
