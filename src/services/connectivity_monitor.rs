use crate::sources::traits::ConnectivityObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
    Unchanged,
}

/// Tracks the last known connectivity state so callers can re-sync exactly
/// when the network comes back.
pub struct ConnectivityMonitor<O: ConnectivityObserver> {
    observer: O,
    online: bool,
}

impl<O: ConnectivityObserver> ConnectivityMonitor<O> {
    /// Takes an initial reading from the observer.
    pub fn new(observer: O) -> Self {
        let online = observer.is_online();
        Self { observer, online }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn poll(&mut self) -> Transition {
        let now = self.observer.is_online();
        let transition = match (self.online, now) {
            (false, true) => Transition::CameOnline,
            (true, false) => Transition::WentOffline,
            _ => Transition::Unchanged,
        };
        if transition != Transition::Unchanged {
            tracing::info!(online = now, "Connectivity changed");
        }
        self.online = now;
        transition
    }
}
