use tokio::sync::{Mutex, MutexGuard, mpsc, oneshot};

type Handoff<T> = (T, oneshot::Sender<()>);

/// Single-slot handoff point: a sender returns only once a receiver took its value
///
/// Senders are serialized, so a second sender waits until the first one's
/// value has been consumed.
pub(crate) struct Rendezvous<T> {
    tx: Mutex<mpsc::Sender<Handoff<T>>>,
    rx: Mutex<mpsc::Receiver<Handoff<T>>>,
}

/// Exclusive right to hand over one value
pub(crate) struct RendezvousSender<'a, T> {
    tx: MutexGuard<'a, mpsc::Sender<Handoff<T>>>,
}

/// Receipt for a consumed value; completing it releases the waiting sender
pub(crate) struct Ack(oneshot::Sender<()>);

impl<T: Send> Rendezvous<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx: Mutex::new(tx),
            rx: Mutex::new(rx),
        }
    }

    /// Wait for exclusive access to the sending side
    pub async fn sender(&self) -> RendezvousSender<'_, T> {
        RendezvousSender {
            tx: self.tx.lock().await,
        }
    }

    /// Wait for a sender to arrive and take its value
    pub async fn take(&self) -> Option<(T, Ack)> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.map(|(value, ack)| (value, Ack(ack)))
    }
}

impl<T> RendezvousSender<'_, T> {
    /// Hand `value` over and wait until the receiver acknowledged it
    ///
    /// Returns false if the receiving side went away first.
    pub async fn send(self, value: T) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send((value, ack_tx)).await.is_err() {
            return false;
        }
        ack_rx.await.is_ok()
    }
}

impl Ack {
    pub fn complete(self) {
        let _ = self.0.send(());
    }
}
