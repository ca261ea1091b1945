//! Streaming relay
//!
//! Converts a provider fragment sequence into a [`RelayEvent`] sequence:
//! `Partial* Done` on success, `Partial* Error` on failure. The transport
//! adapters serialise this one event stream, so framing and termination
//! rules live here and nowhere else.

use std::future::Future;
use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::chat::{RelayEvent, ResponseFragment};

/// Type alias for a relay event stream
pub type RelayStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send>>;

/// Relay lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayState {
    /// Nothing received yet
    #[default]
    Idle,
    /// Fragments are being forwarded
    Emitting,
    /// `Done` was emitted
    Done,
    /// `Error` was emitted
    Failed,
}

impl RelayState {
    /// Check if no further event may be emitted
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Relay state machine
///
/// Every method returns the event to emit, if any. Once a terminal event has
/// been returned all methods return `None`.
#[derive(Debug, Default)]
pub struct Relay {
    state: RelayState,
    partials: usize,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Number of `Partial` events emitted so far
    pub fn partials(&self) -> usize {
        self.partials
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Feed one fragment; empty fragments are dropped
    pub fn on_fragment(&mut self, fragment: ResponseFragment) -> Option<RelayEvent> {
        if self.is_finished() {
            return None;
        }
        self.state = RelayState::Emitting;
        if fragment.is_empty() {
            return None;
        }
        self.partials += 1;
        Some(RelayEvent::Partial {
            delta: fragment.into_text(),
        })
    }

    /// The fragment sequence is exhausted
    pub fn on_end(&mut self) -> Option<RelayEvent> {
        if self.is_finished() {
            return None;
        }
        self.state = RelayState::Done;
        Some(RelayEvent::Done)
    }

    /// The gateway failed
    pub fn on_error(&mut self, message: impl Into<String>) -> Option<RelayEvent> {
        if self.is_finished() {
            return None;
        }
        self.state = RelayState::Failed;
        Some(RelayEvent::Error {
            message: message.into(),
        })
    }
}

/// Drive a [`Relay`] over a lazily started fragment stream
///
/// `start` performs the provider call and resolves to the fragment stream;
/// a failure there is reported like any mid-stream failure. `describe` turns
/// a gateway error into the client-facing error message. Fragments are
/// pulled one at a time, each forwarded before the next is requested.
pub fn relay<Fut, S, E, F>(start: Fut, describe: F) -> RelayStream
where
    Fut: Future<Output = Result<S, E>> + Send + 'static,
    S: Stream<Item = Result<ResponseFragment, E>> + Send + 'static,
    E: Send + 'static,
    F: Fn(&E) -> String + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut relay = Relay::new();

        let fragments = match start.await {
            Ok(fragments) => fragments,
            Err(e) => {
                if let Some(event) = relay.on_error(describe(&e)) {
                    yield event;
                }
                return;
            }
        };
        futures::pin_mut!(fragments);

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    if let Some(event) = relay.on_fragment(fragment) {
                        yield event;
                    }
                }
                Err(e) => {
                    if let Some(event) = relay.on_error(describe(&e)) {
                        yield event;
                    }
                    return;
                }
            }
        }

        if let Some(event) = relay.on_end() {
            yield event;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct StubError(&'static str);

    type Item = Result<ResponseFragment, StubError>;

    fn describe(e: &StubError) -> String {
        e.0.to_string()
    }

    async fn collect(items: Vec<Item>) -> Vec<RelayEvent> {
        let start = async move { Ok::<_, StubError>(stream::iter(items)) };
        relay(start, describe).collect().await
    }

    fn ok(text: &str) -> Item {
        Ok(ResponseFragment::new(text))
    }

    #[test]
    fn test_state_machine_success() {
        let mut relay = Relay::new();
        assert_eq!(relay.state(), RelayState::Idle);

        assert_eq!(relay.on_fragment("a".into()), Some(RelayEvent::partial("a")));
        assert_eq!(relay.state(), RelayState::Emitting);
        assert_eq!(relay.on_fragment("".into()), None);
        assert_eq!(relay.on_end(), Some(RelayEvent::Done));
        assert_eq!(relay.state(), RelayState::Done);
        assert_eq!(relay.partials(), 1);
    }

    #[test]
    fn test_state_machine_silent_after_terminal() {
        let mut relay = Relay::new();
        assert!(relay.on_error("boom").is_some());
        assert_eq!(relay.state(), RelayState::Failed);

        assert_eq!(relay.on_fragment("late".into()), None);
        assert_eq!(relay.on_end(), None);
        assert_eq!(relay.on_error("again"), None);
        assert_eq!(relay.partials(), 0);
    }

    #[tokio::test]
    async fn test_relay_forwards_fragments_in_order() {
        for n in 0..6 {
            let texts: Vec<String> = (0..n).map(|i| format!("frag-{}", i)).collect();
            let items = texts.iter().map(|t| ok(t)).collect();

            let events = collect(items).await;

            assert_eq!(events.len(), n + 1);
            for (event, text) in events.iter().zip(&texts) {
                assert_eq!(event, &RelayEvent::partial(text.clone()));
            }
            assert_eq!(events.last(), Some(&RelayEvent::Done));
            assert!(!events.iter().any(RelayEvent::is_error));
        }
    }

    #[tokio::test]
    async fn test_relay_error_after_k_fragments() {
        let n = 4;
        for k in 0..=n {
            let mut items: Vec<Item> = (0..k).map(|i| Ok(ResponseFragment::new(format!("t{}", i)))).collect();
            items.push(Err(StubError("quota exceeded")));
            // Anything after the failure must never be consumed
            items.extend((k..n).map(|i| Ok(ResponseFragment::new(format!("t{}", i)))));

            let events = collect(items).await;

            assert_eq!(events.len(), k + 1);
            assert!(events[..k].iter().all(|e| matches!(e, RelayEvent::Partial { .. })));
            assert_eq!(events[k], RelayEvent::error("quota exceeded"));
            assert!(!events.iter().any(RelayEvent::is_done));
        }
    }

    #[tokio::test]
    async fn test_relay_drops_empty_fragments() {
        let items = vec![ok(""), ok("Hel"), ok(""), ok(""), ok("lo"), ok("")];

        let events = collect(items).await;

        assert_eq!(
            events,
            vec![RelayEvent::partial("Hel"), RelayEvent::partial("lo"), RelayEvent::Done]
        );
    }

    #[tokio::test]
    async fn test_relay_only_empty_fragments() {
        let events = collect(vec![ok(""), ok("")]).await;
        assert_eq!(events, vec![RelayEvent::Done]);
    }

    #[tokio::test]
    async fn test_relay_start_failure() {
        let start = async { Err::<stream::Iter<std::vec::IntoIter<Item>>, _>(StubError("no network")) };

        let events: Vec<RelayEvent> = relay(start, describe).collect().await;

        assert_eq!(events, vec![RelayEvent::error("no network")]);
    }

    #[tokio::test]
    async fn test_relay_stops_pulling_after_error() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let items: Vec<Item> = vec![ok("a"), Err(StubError("boom")), ok("b"), ok("c")];
        let fragments = stream::iter(items).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let events: Vec<RelayEvent> = relay(async move { Ok::<_, StubError>(fragments) }, describe).collect().await;

        assert_eq!(events, vec![RelayEvent::partial("a"), RelayEvent::error("boom")]);
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }
}
