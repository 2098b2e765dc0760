//! Out-of-band "slow down" notifications from resolver tasks to the dispatcher.
//!
//! Senders never wait: the channel is bounded and a full buffer simply drops
//! the signal, since one pending signal is already enough to trigger a
//! cooldown.

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// Creates a throttle channel buffering at most `capacity` pending signals.
pub fn channel(capacity: usize) -> (ThrottleSender, ThrottleReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ThrottleSender { tx }, ThrottleReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct ThrottleSender {
    tx: mpsc::Sender<()>,
}

impl ThrottleSender {
    /// Reports one resource-exhaustion occurrence. Never blocks.
    pub fn signal(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                tracing::trace!("throttle buffer full, signal coalesced");
            }
            Err(TrySendError::Closed(())) => {
                tracing::trace!("throttle receiver gone, signal dropped");
            }
        }
    }
}

#[derive(Debug)]
pub struct ThrottleReceiver {
    rx: mpsc::Receiver<()>,
}

impl ThrottleReceiver {
    /// Takes every pending signal without waiting, returning how many there were.
    pub fn drain(&mut self) -> usize {
        let mut pending = 0;
        loop {
            match self.rx.try_recv() {
                Ok(()) => pending += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_collects_pending_signals() {
        let (tx, mut rx) = channel(8);
        tx.signal();
        tx.clone().signal();
        assert_eq!(rx.drain(), 2);
        assert_eq!(rx.drain(), 0);
    }

    #[test]
    fn full_buffer_never_blocks_senders() {
        let (tx, mut rx) = channel(2);
        for _ in 0..100 {
            tx.signal();
        }
        assert_eq!(rx.drain(), 2);
    }

    #[test]
    fn signalling_after_receiver_dropped_is_harmless() {
        let (tx, rx) = channel(1);
        drop(rx);
        tx.signal();
    }
}
