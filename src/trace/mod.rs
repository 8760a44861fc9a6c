//! Interaction traces captured from the agent-execution engine.
//!
//! A [`Trace`] is the ordered, classified record of one scenario execution.
//! It holds at most one terminal result, and only as its last element.

pub mod event;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub use event::{classify, Role, TraceEvent, MAX_EXCERPT_CHARS};

/// Ordered sequence of classified events.
///
/// Serialized as a plain array. Deserialization goes through [`Trace::push`],
/// so a decoded trace keeps the terminal-last rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TraceEvent>", into = "Vec<TraceEvent>")]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies and collects raw engine events in order.
    pub fn from_raw<'a>(raw: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut trace = Self::new();
        for value in raw {
            trace.push(classify(value));
        }
        trace
    }

    /// Appends an event. Anything arriving after the terminal result is dropped.
    ///
    /// Returns false when the event was dropped.
    pub fn push(&mut self, event: TraceEvent) -> bool {
        if self.is_closed() {
            debug!(role = %event.role, "Dropping event received after terminal result");
            return false;
        }
        self.events.push(event);
        true
    }

    /// Whether a terminal result has been recorded.
    pub fn is_closed(&self) -> bool {
        self.events.last().is_some_and(TraceEvent::is_terminal)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// The terminal result, if the run produced one.
    pub fn terminal(&self) -> Option<&TraceEvent> {
        self.events.last().filter(|e| e.is_terminal())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEvent> {
        self.events.iter()
    }
}

impl FromIterator<TraceEvent> for Trace {
    fn from_iter<I: IntoIterator<Item = TraceEvent>>(iter: I) -> Self {
        let mut trace = Trace::new();
        for event in iter {
            trace.push(event);
        }
        trace
    }
}

impl From<Vec<TraceEvent>> for Trace {
    fn from(events: Vec<TraceEvent>) -> Self {
        events.into_iter().collect()
    }
}

impl From<Trace> for Vec<TraceEvent> {
    fn from(trace: Trace) -> Self {
        trace.events
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
