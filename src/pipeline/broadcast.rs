// SPDX-FileCopyrightText: 2025 Robin Vobruba <hoijui.quaero@gmail.com>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::{BoxStream, StreamExt};

/// Pushes each published value to all current subscribers.
///
/// Values are not replayed to late subscribers.
/// Subscribers that went away are dropped on the next publish.
pub struct Broadcaster<T> {
    subscribers: Vec<UnboundedSender<T>>,
    completed: bool,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            completed: false,
        }
    }
}

impl<T: Clone + Send + 'static> Broadcaster<T> {
    /// Returns a stream of all values published from now on.
    /// If this broadcaster is already completed, the stream ends right away.
    pub fn subscribe(&mut self) -> BoxStream<'static, T> {
        let (sender, receiver) = mpsc::unbounded();
        if self.completed {
            sender.close_channel();
        } else {
            self.subscribers.push(sender);
        }
        receiver.boxed()
    }

    pub fn publish(&mut self, value: &T) {
        self.subscribers
            .retain(|subscriber| subscriber.unbounded_send(value.clone()).is_ok());
    }

    /// Ends the streams of all subscribers.
    pub fn complete(&mut self) {
        for subscriber in self.subscribers.drain(..) {
            subscriber.close_channel();
        }
        self.completed = true;
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
