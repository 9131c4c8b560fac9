//! Request bookkeeping for the two fetch slots of the dashboard.

use crate::forecast::ForecastBundle;
use std::cell::Cell;
use std::rc::Rc;

/// Identifies one issued request within a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Monotonic counter guarding a single logical request slot. A response is
/// applied only if its ticket is still the latest one issued, so a slow
/// earlier request can never overwrite a newer selection.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: Cell<u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestTicket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        RequestTicket(next)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.get() == ticket.0
    }

    /// Makes every outstanding ticket stale without issuing a new request.
    pub fn invalidate(&self) {
        self.issue();
    }
}

/// What the forecast action button should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastAction {
    Fetch,
    Discard,
    Ignore,
}

/// Lifecycle of the forecast panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ForecastRequest {
    #[default]
    Idle,
    Loading,
    Loaded(Rc<ForecastBundle>),
    Error(String),
}

impl ForecastRequest {
    /// `loaded` goes back to `idle`; `idle` and `error` fetch; clicks while
    /// loading are ignored.
    pub fn on_action(&self) -> ForecastAction {
        match self {
            ForecastRequest::Idle | ForecastRequest::Error(_) => ForecastAction::Fetch,
            ForecastRequest::Loaded(_) => ForecastAction::Discard,
            ForecastRequest::Loading => ForecastAction::Ignore,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ForecastRequest::Loading)
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            ForecastRequest::Idle | ForecastRequest::Error(_) => "Generar pronóstico",
            ForecastRequest::Loading => "Generando…",
            ForecastRequest::Loaded(_) => "Ocultar pronóstico",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let seq = RequestSequence::new();
        let first = seq.issue();
        let second = seq.issue();

        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));

        seq.invalidate();
        assert!(!seq.is_current(second));
    }

    #[test]
    fn test_forecast_action_transitions() {
        assert_eq!(ForecastRequest::Idle.on_action(), ForecastAction::Fetch);
        assert_eq!(
            ForecastRequest::Error("boom".to_string()).on_action(),
            ForecastAction::Fetch
        );
        assert_eq!(
            ForecastRequest::Loaded(Rc::new(ForecastBundle::default())).on_action(),
            ForecastAction::Discard
        );
        assert_eq!(ForecastRequest::Loading.on_action(), ForecastAction::Ignore);
    }
}
