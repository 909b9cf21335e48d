//! Navigation effect interface.
//!
//! The host router performs the actual screen change. The workflow only relies
//! on two capabilities: attaching a key-value payload to a transition, and
//! reading the payload the current screen arrived with.

use crate::identifiers::Route;

/// Key-value payload attached to a navigation.
pub type NavigationPayload = serde_json::Map<String, serde_json::Value>;

/// Screen transitions carrying an optional payload.
pub trait NavigationEffects: Send + Sync {
    /// Move to `route`, handing `payload` to the screen that mounts there.
    fn navigate(&self, route: Route, payload: Option<NavigationPayload>);

    /// Payload the currently mounted screen arrived with, if any.
    fn arrival_payload(&self) -> Option<NavigationPayload>;
}
