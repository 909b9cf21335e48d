//! Navigator for a terminal host.
//!
//! There is no screen stack: a navigation records the payload for the next
//! step to read and wakes the host loop with the new route.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use vitalis_core::{NavigationEffects, NavigationPayload, Route};

pub struct ChannelNavigator {
    arrival: Mutex<Option<NavigationPayload>>,
    routes: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    /// Navigator plus the receiving end the host loop waits on.
    pub fn new(arrival: Option<NavigationPayload>) -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (routes, receiver) = mpsc::unbounded_channel();
        let navigator = Self {
            arrival: Mutex::new(arrival),
            routes,
        };
        (navigator, receiver)
    }
}

impl NavigationEffects for ChannelNavigator {
    fn navigate(&self, route: Route, payload: Option<NavigationPayload>) {
        tracing::debug!(%route, "navigate");
        *self.arrival.lock() = payload;
        if self.routes.send(route).is_err() {
            tracing::warn!(%route, "navigation after the host loop ended");
        }
    }

    fn arrival_payload(&self) -> Option<NavigationPayload> {
        self.arrival.lock().clone()
    }
}
