//! Time-windowed tactical event memory.
//!
//! A double-ended queue bounded by retention time: appends trim expired
//! events from the front, so the functional bound is temporal, not count.

use std::collections::VecDeque;

use vanguard_core::constants::DEFAULT_RETENTION_MS;
use vanguard_core::enums::EventType;
use vanguard_core::events::EventRecord;

#[derive(Debug)]
pub struct EventMemory {
    retention_ms: i64,
    events: VecDeque<EventRecord>,
}

impl Default for EventMemory {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_MS)
    }
}

impl EventMemory {
    pub fn new(retention_ms: i64) -> Self {
        Self {
            retention_ms,
            events: VecDeque::new(),
        }
    }

    /// Append one event and trim everything older than the retention window.
    pub fn add_event(&mut self, event: EventRecord) {
        let now_ms = event.timestamp_ms;
        self.events.push_back(event);
        self.trim(now_ms);
    }

    /// Append a batch of events.
    pub fn add_events(&mut self, events: impl IntoIterator<Item = EventRecord>) {
        for event in events {
            self.add_event(event);
        }
    }

    /// Events within the window, most recent first.
    pub fn query_recent(&self, now_ms: i64, window_ms: i64) -> Vec<EventRecord> {
        let mut out = Vec::new();
        for event in self.events.iter().rev() {
            if now_ms - event.timestamp_ms > window_ms {
                break;
            }
            out.push(event.clone());
        }
        out
    }

    /// Render the recent window as `[t=<ts>] <type>: <message>` lines.
    pub fn build_context(&self, now_ms: i64, window_ms: i64) -> String {
        let mut out = String::new();
        for event in self.query_recent(now_ms, window_ms) {
            out.push_str(&format!(
                "[t={}] {}: {}\n",
                event.timestamp_ms,
                event.event_type.label(),
                event.message
            ));
        }
        out
    }

    /// Most recent event of the given type within the window.
    pub fn last_event_by_type(
        &self,
        event_type: EventType,
        now_ms: i64,
        window_ms: i64,
    ) -> Option<&EventRecord> {
        self.events
            .iter()
            .rev()
            .take_while(|e| now_ms - e.timestamp_ms <= window_ms)
            .find(|e| e.event_type == event_type)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn trim(&mut self, now_ms: i64) {
        while let Some(front) = self.events.front() {
            if now_ms - front.timestamp_ms > self.retention_ms {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}
