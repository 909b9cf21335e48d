//! Navigation double.

use parking_lot::Mutex;
use vitalis_core::{NavigationEffects, NavigationPayload, Route};

/// One recorded navigation.
#[derive(Clone, Debug, PartialEq)]
pub struct Visit {
    /// Screen navigated to
    pub route: Route,
    /// Payload attached to the navigation
    pub payload: Option<NavigationPayload>,
}

#[derive(Debug, Default)]
struct History {
    visits: Vec<Visit>,
    arrival: Option<NavigationPayload>,
}

/// Records navigations. The payload of the latest navigation becomes the
/// arrival payload, the way a router hands state to the screen it mounts.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<History>,
}

impl RecordingNavigator {
    /// Navigator with no arrival payload and no visits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the current screen was entered with `payload`.
    pub fn set_arrival(&self, payload: Option<NavigationPayload>) {
        self.history.lock().arrival = payload;
    }

    /// Every navigation so far, in order.
    pub fn visits(&self) -> Vec<Visit> {
        self.history.lock().visits.clone()
    }

    /// Most recent navigation.
    pub fn last_visit(&self) -> Option<Visit> {
        self.history.lock().visits.last().cloned()
    }

    /// Route of the most recent navigation.
    pub fn last_route(&self) -> Option<Route> {
        self.history.lock().visits.last().map(|visit| visit.route)
    }
}

impl NavigationEffects for RecordingNavigator {
    fn navigate(&self, route: Route, payload: Option<NavigationPayload>) {
        let mut history = self.history.lock();
        history.arrival = payload.clone();
        history.visits.push(Visit { route, payload });
    }

    fn arrival_payload(&self) -> Option<NavigationPayload> {
        self.history.lock().arrival.clone()
    }
}
