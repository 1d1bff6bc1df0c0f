//! Action Bus implementation.
//!
//! Provides the `ActionBus` struct: an ordered, multi-subscriber channel
//! carrying every dispatched action to the store, to synchronous handlers
//! and to asynchronous readers such as epics.
//!
//! Each `action_stream()` reader owns an unbounded queue, so a reader that
//! falls behind delays only itself and never loses an action. The bounded
//! broadcast side behind `receiver()` is for manual polling and may lag.

use futures::stream::{BoxStream, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::actions::{Action, ActionCategory};
use crate::error::BusError;

/// Stream of actions as seen by an asynchronous reader
pub type ActionStream = BoxStream<'static, Action>;

/// Subscription handle for unsubscribing from actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific action kinds
#[derive(Debug, Clone, Default)]
pub enum ActionFilter {
    /// Receive all actions.
    #[default]
    All,
    /// Receive actions matching any of these categories.
    Categories(Vec<ActionCategory>),
}

impl ActionFilter {
    /// Check if an action matches this filter
    pub fn matches(&self, action: &Action) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Categories(categories) => categories.contains(&action.category()),
        }
    }
}

type ActionHandler = Arc<dyn Fn(&Action) + Send + Sync>;

/// Receives subscriber failures instead of the dispatcher
pub type ErrorSink = Arc<dyn Fn(&BusError) + Send + Sync>;

/// Configuration for the action bus
#[derive(Debug, Clone)]
pub struct ActionBusConfig {
    /// Capacity of the broadcast channel behind `receiver()`.
    pub channel_capacity: usize,
}

impl Default for ActionBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    filter: ActionFilter,
    handler: ActionHandler,
}

/// Ordered broadcast channel for dispatched actions
///
/// Synchronous subscribers run on the dispatching thread in the order they
/// were attached. Asynchronous readers get each action after every
/// synchronous subscriber has seen it, so state derived by a reducer
/// subscriber is already in place when an epic observes the action.
pub struct ActionBus {
    /// Broadcast channel sender
    sender: broadcast::Sender<Action>,
    /// Synchronous subscribers in attachment order
    subscribers: RwLock<Vec<Subscriber>>,
    /// One unbounded queue per `action_stream()` reader
    readers: Mutex<Vec<mpsc::UnboundedSender<Action>>>,
    /// Actions dispatched while another dispatch is delivering
    pending: Mutex<VecDeque<Action>>,
    delivering: AtomicBool,
    error_sink: RwLock<Option<ErrorSink>>,
    failures: AtomicU64,
    /// Configuration
    config: ActionBusConfig,
}

impl ActionBus {
    /// Create a new action bus with default configuration
    pub fn new() -> Self {
        Self::with_config(ActionBusConfig::default())
    }

    /// Create a new action bus with custom configuration
    pub fn with_config(config: ActionBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            subscribers: RwLock::new(Vec::new()),
            readers: Mutex::new(Vec::new()),
            pending: Mutex::new(VecDeque::new()),
            delivering: AtomicBool::new(false),
            error_sink: RwLock::new(None),
            failures: AtomicU64::new(0),
            config,
        }
    }

    /// Dispatch an action to every subscriber
    ///
    /// Never blocks on slow readers and never fails. If called while the bus
    /// is already delivering (for example from inside a subscriber), the
    /// action is queued and delivered once the current action has reached
    /// every subscriber.
    pub fn dispatch(&self, action: impl Into<Action>) {
        self.pending.lock().push_back(action.into());

        loop {
            if self.delivering.swap(true, Ordering::AcqRel) {
                // Another dispatch owns delivery and will drain the queue.
                return;
            }

            loop {
                let next = self.pending.lock().pop_front();
                match next {
                    Some(action) => self.deliver(action),
                    None => break,
                }
            }

            self.delivering.store(false, Ordering::Release);

            // An action may have been queued between the last pop and the
            // release above; pick it up unless another dispatch already has.
            if self.pending.lock().is_empty() {
                return;
            }
        }
    }

    fn deliver(&self, action: Action) {
        // Snapshot so subscribers attached during this delivery miss it.
        let subscribers: Vec<Subscriber> = self.subscribers.read().clone();

        for subscriber in &subscribers {
            if !subscriber.filter.matches(&action) {
                continue;
            }
            let handler = &subscriber.handler;
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(&action))) {
                self.report(BusError::SubscriberPanicked {
                    subscription: subscriber.id,
                    action: action.tag(),
                    message: panic_message(payload.as_ref()),
                });
            }
        }

        {
            let mut readers = self.readers.lock();
            let before = readers.len();
            readers.retain(|reader| reader.send(action.clone()).is_ok());
            if readers.len() != before {
                tracing::debug!("Pruned {} closed action readers", before - readers.len());
            }
        }

        let tag = action.tag();
        if self.sender.send(action).is_err() {
            tracing::trace!("No broadcast receivers for {}", tag);
        }
    }

    fn report(&self, error: BusError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        let sink = self.error_sink.read().clone();
        match sink {
            Some(sink) => {
                if catch_unwind(AssertUnwindSafe(|| sink(&error))).is_err() {
                    tracing::error!("Error sink panicked while reporting: {}", error);
                }
            }
            None => tracing::error!("{}", error),
        }
    }

    /// Subscribe to actions with a synchronous handler
    ///
    /// The handler will be called on the dispatching thread, so it should
    /// return quickly to avoid delaying the remaining subscribers.
    pub fn subscribe<F>(&self, filter: ActionFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&Action) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.subscribers.write().push(Subscriber {
            id,
            filter,
            handler: Arc::new(handler),
        });
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for manual action polling
    ///
    /// The receiver is bounded by `channel_capacity`; one that falls further
    /// behind gets `RecvError::Lagged` and misses actions. Use
    /// `action_stream()` when every action must be seen.
    pub fn receiver(&self) -> broadcast::Receiver<Action> {
        self.sender.subscribe()
    }

    /// Subscribe as an asynchronous reader and receive actions as a stream
    ///
    /// The subscription starts now: actions dispatched after this call are
    /// observed, in dispatch order, without loss. Dropping the stream
    /// detaches the reader on the next delivery.
    pub fn action_stream(&self) -> ActionStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.readers.lock().push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }

    /// Number of attached `action_stream()` readers, closed ones included
    /// until the next delivery prunes them
    pub fn reader_count(&self) -> usize {
        self.readers.lock().len()
    }

    /// Unsubscribe from actions
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        let removed = subscribers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Remove every synchronous subscriber, returning how many were removed
    pub fn unsubscribe_all(&self) -> usize {
        let removed = std::mem::take(&mut *self.subscribers.write()).len();
        tracing::debug!("Removed {} subscriptions", removed);
        removed
    }

    /// Route subscriber failures to `sink` instead of the log
    pub fn set_error_sink<F>(&self, sink: F)
    where
        F: Fn(&BusError) + Send + Sync + 'static,
    {
        *self.error_sink.write() = Some(Arc::new(sink));
    }

    /// Get the number of active synchronous subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Number of subscriber failures reported since creation
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Get the current configuration
    pub fn config(&self) -> &ActionBusConfig {
        &self.config
    }
}

impl Default for ActionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBus")
            .field("subscribers", &self.subscriber_count())
            .field("readers", &self.reader_count())
            .field("config", &self.config)
            .finish()
    }
}

/// Render a panic payload as text
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_bus::actions::{ConfigAction, FocusAction};
    use crate::document::ContentRef;
    use std::sync::atomic::AtomicUsize;

    fn set_config(key: &str) -> Action {
        Action::Config(ConfigAction::SetConfig {
            key: key.to_string(),
            value: serde_json::Value::Bool(true),
        })
    }

    fn key_of(action: &Action) -> String {
        match action {
            Action::Config(ConfigAction::SetConfig { key, .. }) => key.clone(),
            other => other.tag().to_string(),
        }
    }

    #[test]
    fn test_action_bus_creation() {
        let bus = ActionBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.config().channel_capacity, 1024);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = ActionBus::new();

        let id = bus.subscribe(ActionFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_dispatch_without_subscribers_is_fine() {
        let bus = ActionBus::new();
        bus.dispatch(set_config("a"));
        assert_eq!(bus.failure_count(), 0);
    }

    #[test]
    fn test_delivery_in_attachment_order() {
        let bus = ActionBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.subscribe(ActionFilter::All, move |_| log.lock().push(name));
        }

        bus.dispatch(set_config("a"));
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_action_filtering() {
        let bus = ActionBus::new();
        let config_count = Arc::new(AtomicUsize::new(0));
        let focus_count = Arc::new(AtomicUsize::new(0));

        let cc = config_count.clone();
        bus.subscribe(
            ActionFilter::Categories(vec![ActionCategory::Config]),
            move |_| {
                cc.fetch_add(1, Ordering::SeqCst);
            },
        );

        let fc = focus_count.clone();
        bus.subscribe(
            ActionFilter::Categories(vec![ActionCategory::Focus]),
            move |_| {
                fc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.dispatch(set_config("a"));
        bus.dispatch(FocusAction::FocusCellEditor {
            content_ref: ContentRef::new(),
            id: None,
        });

        assert_eq!(config_count.load(Ordering::SeqCst), 1);
        assert_eq!(focus_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_added_during_dispatch_misses_it() {
        let bus = Arc::new(ActionBus::new());
        let late_count = Arc::new(AtomicUsize::new(0));

        let inner_bus = Arc::clone(&bus);
        let inner_count = Arc::clone(&late_count);
        let attached = Arc::new(AtomicBool::new(false));
        bus.subscribe(ActionFilter::All, move |_| {
            if !attached.swap(true, Ordering::SeqCst) {
                let count = Arc::clone(&inner_count);
                inner_bus.subscribe(ActionFilter::All, move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        bus.dispatch(set_config("a"));
        assert_eq!(late_count.load(Ordering::SeqCst), 0);

        bus.dispatch(set_config("b"));
        assert_eq!(late_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_dispatch_is_delivered_after_current_action() {
        let bus = Arc::new(ActionBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = Arc::clone(&bus);
        bus.subscribe(ActionFilter::All, move |action| {
            if key_of(action) == "trigger" {
                inner_bus.dispatch(set_config("derived"));
            }
        });
        let recorder = Arc::clone(&log);
        bus.subscribe(ActionFilter::All, move |action| {
            recorder.lock().push(key_of(action));
        });

        bus.dispatch(set_config("trigger"));
        assert_eq!(*log.lock(), vec!["trigger", "derived"]);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let bus = ActionBus::new();
        let delivered = Arc::new(AtomicUsize::new(0));
        let reported = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&reported);
        bus.set_error_sink(move |error| sink.lock().push(error.clone()));

        let failing = bus.subscribe(ActionFilter::All, |_| panic!("subscriber bug"));
        let counter = Arc::clone(&delivered);
        bus.subscribe(ActionFilter::All, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.dispatch(set_config("a"));
        bus.dispatch(set_config("b"));

        assert_eq!(delivered.load(Ordering::SeqCst), 2);
        assert_eq!(bus.failure_count(), 2);
        let reported = reported.lock();
        assert_eq!(
            reported[0],
            BusError::SubscriberPanicked {
                subscription: failing,
                action: "SET_CONFIG",
                message: "subscriber bug".to_string(),
            }
        );
    }

    #[test]
    fn test_unsubscribe_all() {
        let bus = ActionBus::new();
        bus.subscribe(ActionFilter::All, |_| {});
        bus.subscribe(ActionFilter::All, |_| {});
        assert_eq!(bus.unsubscribe_all(), 2);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_filter_matches() {
        let action = set_config("a");

        assert!(ActionFilter::All.matches(&action));
        assert!(ActionFilter::Categories(vec![ActionCategory::Config]).matches(&action));
        assert!(!ActionFilter::Categories(vec![ActionCategory::Focus]).matches(&action));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = ActionBus::new();
        let mut receiver = bus.receiver();

        bus.dispatch(set_config("theme"));

        let received = receiver.try_recv();
        match received {
            Ok(action) => assert_eq!(key_of(&action), "theme"),
            Err(err) => panic!("Wrong action received: {err}"),
        }
    }

    #[tokio::test]
    async fn test_action_stream_preserves_order() {
        let bus = ActionBus::new();
        let stream = bus.action_stream();

        bus.dispatch(set_config("a"));
        bus.dispatch(set_config("b"));

        let keys: Vec<String> = stream.take(2).map(|a| key_of(&a)).collect().await;
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_action_stream_keeps_burst_beyond_capacity() {
        let bus = ActionBus::with_config(ActionBusConfig {
            channel_capacity: 16,
        });
        let stream = bus.action_stream();

        let total = bus.config().channel_capacity * 4 + 3;
        for i in 0..total {
            bus.dispatch(set_config(&format!("k{}", i)));
        }

        let keys: Vec<String> = stream.take(total).map(|a| key_of(&a)).collect().await;
        assert_eq!(keys.len(), total);
        assert_eq!(keys[0], "k0");
        assert_eq!(keys[total - 1], format!("k{}", total - 1));
    }

    #[test]
    fn test_dropped_action_stream_is_pruned() {
        let bus = ActionBus::new();
        let kept = bus.action_stream();
        drop(bus.action_stream());
        assert_eq!(bus.reader_count(), 2);

        bus.dispatch(set_config("a"));
        assert_eq!(bus.reader_count(), 1);
        drop(kept);
    }
}
