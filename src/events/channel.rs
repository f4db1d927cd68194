//! Event channel built on crossbeam-channel.
//!
//! Worker threads push events as files complete; the CLI drains them on its
//! own thread so output follows completion order.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half, cloned into every worker.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver is not an error: reporting is optional, so the event
    /// is discarded.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half, owned by whoever renders progress.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Iterate until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructor for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel; workers never block on a slow terminal.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose receiver is already gone, for runs without progress output.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, PipelinePhase, ScanEvent};
    use std::thread;

    #[test]
    fn events_cross_threads_in_send_order() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Scan(ScanEvent::Completed { total_images: 4 }));
            sender.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Compressing,
            }));
        });
        handle.join().unwrap();

        match receiver.recv() {
            Some(Event::Scan(ScanEvent::Completed { total_images })) => {
                assert_eq!(total_images, 4)
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(
            receiver.recv(),
            Some(Event::Pipeline(PipelineEvent::PhaseChanged { .. }))
        ));
        // Sender dropped with the thread, so the stream ends
        assert!(receiver.recv().is_none());
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Scan(ScanEvent::Completed { total_images: 0 }));
    }
}
