//! Vitalis Core - Shared Foundation
//!
//! This crate provides the identifiers and effect interfaces that
//! the account workflows are written against. It contains no handlers and no
//! application logic.
//!
//! # Architecture Layers
//!
//! ## Identifiers
//! - `Origin`: why a workflow was entered (forgot password, sign-up)
//! - `Route`: the screens a navigation can land on
//!
//! ## Effect Interfaces (Pure Signatures)
//! - `TimerEffects`: cancellable one-shot timers
//! - `NavigationEffects`: screen transitions carrying a key-value payload
//! - `HttpEffects`: authenticated JSON writes
//! - `TokenStore`: bearer token lookup from ambient client storage
//!
//! Handlers live in `vitalis-effects` (production) and `vitalis-testkit`
//! (deterministic test doubles).

#![forbid(unsafe_code)]

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Workflow origins and screen routes
pub mod identifiers;

// === Public API Re-exports ===

pub use effects::{
    HttpEffects, HttpResponse, NavigationEffects, NavigationPayload, NetworkError, TimeError,
    TimerEffects, TimerHandle, TimerTask, TokenStore,
};
pub use identifiers::{Origin, Route};
