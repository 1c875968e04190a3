//! Notifications broadcast by the window, slider, and overlay controller.
//!
//! Each component owns its own [`Notifier`]; listeners (details panel, media
//! module, scrollbar widgets) subscribe to the instance they care about and
//! receive notifications over a `std::sync::mpsc` channel in send order.

use crate::model::{FileId, FileRecord};
use std::sync::mpsc::{self, Receiver, Sender};

/// Direction of an overlay navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    /// Towards the end of the navigation set.
    Next,
    /// Towards the start of the navigation set.
    Previous,
    /// Direct jump by index or id.
    Jump,
}

/// Payloads delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Overlay opened on `file_id`; `total` is the navigation set size.
    OverlayEnter { file_id: FileId, total: usize },

    /// Overlay moved to a new current file.
    OverlayNavigate {
        direction: NavDirection,
        file_id: FileId,
        index: usize,
        has_next: bool,
        has_prev: bool,
    },

    /// Overlay closed.
    OverlayExit,

    /// Current file for the details panel, sent after every enter/navigate.
    DetailsChanged { file_id: FileId, file: Box<FileRecord> },

    /// Slider window size changed.
    WindowSizeChanged { size: usize },

    /// Slider offset changed; `limit` is the maximum valid offset.
    OffsetChanged { offset: usize, limit: usize },
}

/// Fan-out of notifications to channel subscribers.
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<Notification>>,
}

impl Notifier {
    /// Notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the receiver unsubscribes it.
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers as of the last send.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver to every subscriber, pruning the ones that hung up.
    pub fn send(&mut self, notification: Notification) {
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_in_send_order() {
        let mut notifier = Notifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.send(Notification::WindowSizeChanged { size: 12 });
        notifier.send(Notification::OffsetChanged { offset: 3, limit: 8 });

        for rx in [&a, &b] {
            let got: Vec<_> = rx.try_iter().collect();
            assert_eq!(
                got,
                vec![
                    Notification::WindowSizeChanged { size: 12 },
                    Notification::OffsetChanged { offset: 3, limit: 8 },
                ]
            );
        }
    }

    #[test]
    fn dropped_receiver_is_pruned_on_next_send() {
        let mut notifier = Notifier::new();
        let keep = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.send(Notification::OverlayExit);

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Ok(Notification::OverlayExit));
    }

    #[test]
    fn send_without_subscribers_is_noop() {
        let mut notifier = Notifier::new();
        notifier.send(Notification::OverlayExit);
        assert_eq!(notifier.subscriber_count(), 0);
    }
}
