//! Coalescing of compile requests.
//!
//! Hosts tend to ask for the same compile many times in a row: one request
//! per keystroke, one per open editor pane. [`CompileQueue`] merges requests
//! for the same root so that a drain compiles each root once and answers
//! every ticket with the same program. [`Debouncer`] holds items back until
//! a burst of pushes has gone quiet.
//!
//! Neither reads the clock. Callers pass `now`, which keeps both
//! deterministic under test.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::program::Program;
use crate::workspace::Workspace;

/// Handle for one compile request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct CompileQueue {
    next: u64,
    /// Tickets per root, in first-request order.
    pending: IndexMap<String, Vec<Ticket>>,
}

impl CompileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, uri: &str) -> Ticket {
        let ticket = Ticket(self.next);
        self.next += 1;
        self.pending.entry(uri.to_string()).or_default().push(ticket);
        trace!(uri, ?ticket, "compile requested");
        ticket
    }

    /// Number of roots waiting to compile.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, uri: &str) -> bool {
        self.pending.contains_key(uri)
    }

    /// Compile every pending root once and answer all of its tickets.
    pub fn run(&mut self, workspace: &mut Workspace) -> Vec<(Ticket, Arc<Program>)> {
        let pending = std::mem::take(&mut self.pending);
        let mut answered = Vec::new();
        for (uri, tickets) in pending {
            let program = workspace.compile(&uri);
            debug!(uri = %uri, tickets = tickets.len(), "compile queue drained root");
            answered.extend(tickets.into_iter().map(|ticket| (ticket, Arc::clone(&program))));
        }
        answered
    }
}

/// Collects items until `delay` has passed since the last push.
#[derive(Debug)]
pub struct Debouncer<T: Hash + Eq> {
    delay: Duration,
    pending: IndexSet<T>,
    last_push: Option<Instant>,
}

impl<T: Hash + Eq> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: IndexSet::new(),
            last_push: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `item`, restarting the quiet period. Duplicates collapse.
    pub fn push(&mut self, item: T, now: Instant) {
        self.pending.insert(item);
        self.last_push = Some(now);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the quiet period has elapsed with items waiting.
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_push {
            Some(last) if !self.pending.is_empty() => now.saturating_duration_since(last) >= self.delay,
            _ => false,
        }
    }

    /// Take the pending items if ready, in first-push order.
    pub fn poll(&mut self, now: Instant) -> Vec<T> {
        if !self.ready(now) {
            return Vec::new();
        }
        self.flush()
    }

    /// Take the pending items regardless of timing.
    pub fn flush(&mut self) -> Vec<T> {
        self.last_push = None;
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_requests_for_one_root_share_a_program() {
        let mut workspace = Workspace::new();
        workspace.add_document("a.tale", 1, "A\n");
        workspace.add_document("b.tale", 1, "B\n");
        let mut queue = CompileQueue::new();
        let first = queue.request("a.tale");
        let other = queue.request("b.tale");
        let second = queue.request("a.tale");
        assert_eq!(queue.len(), 2);
        assert!(queue.is_pending("a.tale"));

        let answered = queue.run(&mut workspace);
        assert!(queue.is_empty());
        let tickets: Vec<Ticket> = answered.iter().map(|(ticket, _)| *ticket).collect();
        assert_eq!(tickets, vec![first, second, other]);
        assert!(Arc::ptr_eq(&answered[0].1, &answered[1].1));
        assert_eq!(answered[2].1.uri, "b.tale");
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut queue = CompileQueue::new();
        let a = queue.request("a.tale");
        let b = queue.request("a.tale");
        assert!(a < b);
    }

    #[test]
    fn test_debouncer_waits_for_quiet() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(!debouncer.ready(start));

        debouncer.push("a.tale", start);
        debouncer.push("b.tale", start + Duration::from_millis(60));
        debouncer.push("a.tale", start + Duration::from_millis(90));
        assert!(debouncer.poll(start + Duration::from_millis(150)).is_empty());

        let items = debouncer.poll(start + Duration::from_millis(190));
        assert_eq!(items, vec!["a.tale", "b.tale"]);
        assert!(debouncer.is_empty());
        assert!(!debouncer.ready(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_flush_ignores_timing() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(5));
        debouncer.push(1, start);
        assert_eq!(debouncer.flush(), vec![1]);
        assert!(debouncer.flush().is_empty());
    }
}
