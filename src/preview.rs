//! Live-preview sequencing.
//!
//! Every edit produces a request with a strictly increasing sequence number.
//! Requests are debounced: [`PreviewSession::poll`] hands out only the latest
//! input, and only after a quiet period without newer requests. Renders may
//! finish in any order; [`PreviewSession::complete`] applies an output only if
//! it is newer than everything applied before, so the freshest result wins.
//!
//! Time is passed in by the caller as a [`Duration`] since an arbitrary epoch,
//! which keeps the session usable where no monotonic clock is available.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Quiet period applied by [`PreviewSession::default`].
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Sequence number of one preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Rebuild a ticket from a sequence number that crossed a boundary
    /// (a JS caller, say).
    pub fn from_sequence(sequence: u64) -> Ticket {
        Ticket(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Outcome of handing a finished render to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The output is now the displayed one.
    Applied,
    /// A newer output was already applied; this one was discarded.
    Stale,
}

/// Reports whether the request it was issued for has been superseded.
#[derive(Debug, Clone)]
pub struct CancelToken {
    ticket: Ticket,
    latest: Arc<AtomicU64>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.latest.load(Ordering::Acquire) > self.ticket.0
    }
}

#[derive(Debug)]
struct Pending<I> {
    ticket: Ticket,
    input: I,
    requested_at: Duration,
}

#[derive(Debug)]
struct State<I, O> {
    pending: Option<Pending<I>>,
    applied: u64,
    displayed: Option<O>,
}

/// Debounce and ordering state of one preview pane.
#[derive(Debug)]
pub struct PreviewSession<I, O> {
    quiet_period: Duration,
    latest: Arc<AtomicU64>,
    state: Mutex<State<I, O>>,
}

impl<I, O> Default for PreviewSession<I, O> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<I, O> PreviewSession<I, O> {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            latest: Arc::new(AtomicU64::new(0)),
            state: Mutex::new(State {
                pending: None,
                applied: 0,
                displayed: None,
            }),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record a new input, replacing any input not yet handed out.
    pub fn request(&self, input: I, now: Duration) -> Ticket {
        let mut state = self.lock();
        let ticket = Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1);
        if let Some(previous) = state.pending.replace(Pending {
            ticket,
            input,
            requested_at: now,
        }) {
            log::trace!("preview request {} superseded by {}", previous.ticket.0, ticket.0);
        }
        ticket
    }

    /// The pending input, once the quiet period has elapsed since it arrived.
    pub fn poll(&self, now: Duration) -> Option<(Ticket, I)> {
        let mut state = self.lock();
        let due = state
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_sub(p.requested_at) >= self.quiet_period);
        if !due {
            return None;
        }
        state.pending.take().map(|p| (p.ticket, p.input))
    }

    /// Hand a finished render to the session.
    pub fn complete(&self, ticket: Ticket, output: O) -> Completion {
        let mut state = self.lock();
        if ticket.0 <= state.applied {
            log::debug!(
                "discarding stale preview {} (applied {})",
                ticket.0,
                state.applied
            );
            return Completion::Stale;
        }
        state.applied = ticket.0;
        state.displayed = Some(output);
        Completion::Applied
    }

    /// A token that reports cancellation once a newer request exists.
    pub fn cancel_token(&self, ticket: Ticket) -> CancelToken {
        CancelToken {
            ticket,
            latest: Arc::clone(&self.latest),
        }
    }

    /// The most recently issued ticket, if any.
    pub fn latest_ticket(&self) -> Option<Ticket> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(Ticket(n)),
        }
    }

    /// Sequence number of the displayed output; zero before the first.
    pub fn applied_sequence(&self) -> u64 {
        self.lock().applied
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<I, O>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<I, O: Clone> PreviewSession<I, O> {
    /// The currently displayed output.
    pub fn displayed(&self) -> Option<O> {
        self.lock().displayed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_out_of_order_completion_freshest_wins() {
        let session: PreviewSession<&str, &str> = PreviewSession::new(ms(0));
        let first = session.request("v1", ms(0));
        let second = session.request("v2", ms(1));

        assert_eq!(session.complete(second, "render 2"), Completion::Applied);
        assert_eq!(session.complete(first, "render 1"), Completion::Stale);
        assert_eq!(session.displayed(), Some("render 2"));
        assert_eq!(session.applied_sequence(), 2);
    }

    #[test]
    fn test_in_order_completion_applies_both() {
        let session: PreviewSession<u32, u32> = PreviewSession::default();
        let a = session.request(1, ms(0));
        let b = session.request(2, ms(10));
        assert_eq!(session.complete(a, 10), Completion::Applied);
        assert_eq!(session.complete(b, 20), Completion::Applied);
        assert_eq!(session.displayed(), Some(20));
    }

    #[test]
    fn test_duplicate_completion_is_stale() {
        let session: PreviewSession<(), u8> = PreviewSession::default();
        let t = session.request((), ms(0));
        assert_eq!(session.complete(t, 1), Completion::Applied);
        assert_eq!(session.complete(t, 2), Completion::Stale);
        assert_eq!(session.displayed(), Some(1));
    }

    #[test]
    fn test_debounce_hands_out_latest_input_only() {
        let session: PreviewSession<&str, ()> = PreviewSession::new(ms(300));
        session.request("a", ms(0));
        session.request("ab", ms(100));
        assert!(session.poll(ms(350)).is_none());

        let (ticket, input) = session.poll(ms(400)).unwrap();
        assert_eq!(input, "ab");
        assert_eq!(ticket.sequence(), 2);
        assert!(session.poll(ms(1000)).is_none());
    }

    #[test]
    fn test_cancel_token() {
        let session: PreviewSession<u8, ()> = PreviewSession::default();
        let first = session.request(1, ms(0));
        let token = session.cancel_token(first);
        assert!(!token.is_cancelled());
        session.request(2, ms(5));
        assert!(token.is_cancelled());
        assert_eq!(session.latest_ticket().map(|t| t.sequence()), Some(2));
    }

    #[test]
    fn test_session_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PreviewSession<String, Vec<u8>>>();
    }
}
