//! One-shot publication cell for the document header.

use crate::error::ParseError;
use crate::header::Header;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A write-once slot the parser thread fills with the header outcome.
///
/// The slot holds a `Result`: a parser that fails before reaching the
/// entity data fulfills it with the error instead, so a consumer
/// blocked in [`HeaderCell::wait`] always wakes up with something to
/// act on. The first fulfillment wins; later ones are ignored.
#[derive(Default)]
pub struct HeaderCell {
    slot: Mutex<Option<Result<Header, ParseError>>>,
    ready: Condvar,
}

impl HeaderCell {
    /// An unfulfilled cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the cell, waking all waiters.
    ///
    /// Returns `true` if this call installed the outcome, `false` if
    /// the cell was already fulfilled.
    pub fn fulfill(&self, outcome: Result<Header, ParseError>) -> bool {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        self.ready.notify_all();
        true
    }

    /// Block until the cell is fulfilled, then clone the outcome.
    pub fn wait(&self) -> Result<Header, ParseError> {
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            slot = self.ready.wait(slot).unwrap();
        }
    }

    /// Block until the cell is fulfilled or `timeout` elapses,
    /// returning the outcome if one arrived in time.
    pub fn wait_for(&self, timeout: Duration) -> Option<Result<Header, ParseError>> {
        let slot = self.slot.lock().unwrap();
        let (slot, _) = self
            .ready
            .wait_timeout_while(slot, timeout, |slot| slot.is_none())
            .unwrap();
        slot.clone()
    }

    /// The outcome, if the cell has been fulfilled yet.
    pub fn try_get(&self) -> Option<Result<Header, ParseError>> {
        self.slot.lock().unwrap().clone()
    }

    /// Whether the cell has been fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

// Shared between the parser thread and any number of header waiters.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HeaderCell>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn first_fulfillment_wins() {
        let cell = HeaderCell::new();
        let mut header = Header::new();
        header.set("generator", "first");
        assert!(cell.fulfill(Ok(header)));
        assert!(!cell.fulfill(Err(ParseError::markup(1, 0, "late"))));
        let outcome = cell.wait().unwrap();
        assert_eq!(outcome.get("generator"), Some("first"));
    }

    #[test]
    fn try_get_reports_fulfillment() {
        let cell = HeaderCell::new();
        assert!(!cell.is_fulfilled());
        assert!(cell.try_get().is_none());
        cell.fulfill(Ok(Header::new()));
        assert!(cell.is_fulfilled());
        assert!(cell.try_get().is_some());
    }

    #[test]
    fn errors_flow_to_waiters() {
        let cell = HeaderCell::new();
        cell.fulfill(Err(ParseError::Version {
            version: "0.5".into(),
        }));
        assert_eq!(
            cell.wait(),
            Err(ParseError::Version {
                version: "0.5".into()
            })
        );
    }

    #[test]
    fn wait_for_times_out_on_an_empty_cell() {
        let cell = HeaderCell::new();
        assert!(cell.wait_for(Duration::from_millis(10)).is_none());
        cell.fulfill(Ok(Header::new()));
        assert!(cell.wait_for(Duration::from_millis(10)).is_some());
    }

    #[test]
    fn wait_blocks_until_another_thread_fulfills() {
        let cell = Arc::new(HeaderCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                let mut header = Header::new();
                header.set_version("0.6");
                cell.fulfill(Ok(header));
            })
        };
        let outcome = cell.wait().unwrap();
        assert_eq!(outcome.version(), "0.6");
        writer.join().unwrap();
    }
}
