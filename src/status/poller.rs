use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};

use crate::{
    domain::{PageTransition, PaymentState},
    infrastructure::shutdown::ShutdownListener,
    status::client::StatusClient,
};

/// Invoked at most once, with the terminal page action.
pub type TransitionCallback = Arc<dyn Fn(PageTransition) + Send + Sync>;

/// Polls the payment state on a fixed interval and hands the outcome to the
/// transition callback. At most one request is outstanding at a time.
pub struct StatusPoller {
    client: StatusClient,
    transition: TransitionCallback,
    interval: Duration,
    request_in_flight: Arc<AtomicBool>,
}

impl StatusPoller {
    pub fn new(client: StatusClient, transition: TransitionCallback, interval: Duration) -> Self {
        Self {
            client,
            transition,
            interval,
            request_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub fn request_in_flight(&self) -> bool {
        self.request_in_flight.load(Ordering::SeqCst)
    }

    pub fn spawn(self: Arc<Self>, mut shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_loop(&mut shutdown).await;
        })
    }

    async fn run_loop(&self, shutdown: &mut ShutdownListener) {
        // Like the page timer, the first poll fires one full period in.
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        loop {
            if shutdown.is_triggered() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.begin_cycle();
                }
                _ = shutdown.notified() => break,
            }
        }
        tracing::info!(target: "poller", "status poller stopped");
    }

    /// Starts a request cycle unless one is still outstanding. A slow round
    /// trip spans ticks instead of stacking requests behind it.
    pub fn begin_cycle(&self) -> bool {
        if self.request_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "poller", "previous request still in flight; skipping tick");
            return false;
        }

        let client = self.client.clone();
        let transition = Arc::clone(&self.transition);
        let guard = Arc::clone(&self.request_in_flight);
        tokio::spawn(async move {
            run_cycle(&client, &transition, &guard).await;
        });
        true
    }

    /// One full request cycle, inline. The spawned path in
    /// [`StatusPoller::begin_cycle`] goes through the same code.
    #[cfg(test)]
    pub async fn poll_once(&self) {
        run_cycle(&self.client, &self.transition, &self.request_in_flight).await;
    }
}

async fn run_cycle(client: &StatusClient, transition: &TransitionCallback, guard: &AtomicBool) {
    guard.store(true, Ordering::SeqCst);

    match client.fetch_state().await {
        Ok(PaymentState::Pending) => {
            tracing::debug!(target: "poller", "payment still pending");
            guard.store(false, Ordering::SeqCst);
        }
        Ok(PaymentState::Confirmed {
            redirect_to: Some(url),
        }) => {
            tracing::info!(target: "poller", redirect = %url, "payment confirmed");
            // Guard stays set: the page is going away, polling is over.
            transition(PageTransition::Replace(url));
        }
        Ok(state) => {
            // Confirmed without a usable redirect target, or an unrecognized
            // state. The server-rendered view knows better; reload it.
            tracing::info!(target: "poller", ?state, "unexpected payment state");
            transition(PageTransition::Reload);
        }
        Err(err) => {
            tracing::warn!(target: "poller", error = %err, "status poll failed; retrying on the next tick");
            guard.store(false, Ordering::SeqCst);
        }
    }
}
