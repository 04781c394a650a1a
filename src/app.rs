use std::{sync::Arc, time::Duration};

use anyhow::Result;
use parking_lot::Mutex;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::{
    config::AppConfig,
    domain::PageTransition,
    infrastructure::shutdown::Shutdown,
    status::{StatusClient, StatusPoller, TransitionCallback},
};

pub struct PaymentWatchApp {
    poller_handle: JoinHandle<()>,
    outcome: Arc<Mutex<Option<PageTransition>>>,
    shutdown: Shutdown,
    config: Arc<AppConfig>,
}

impl PaymentWatchApp {
    pub fn initialize(config: AppConfig, shutdown: Shutdown) -> Result<Self> {
        let config = Arc::new(config);

        let http = Client::builder()
            .user_agent(format!("promptpay-watch/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let client = StatusClient::new(http, config.state_url.clone());

        let outcome = Arc::new(Mutex::new(None));
        let transition = build_transition_callback(Arc::clone(&outcome), shutdown.clone());

        let poller = Arc::new(StatusPoller::new(client, transition, config.poll.interval));
        let poller_handle = poller.spawn(shutdown.subscribe());

        Ok(Self {
            poller_handle,
            outcome,
            shutdown,
            config,
        })
    }

    pub async fn run(self) -> Result<()> {
        let PaymentWatchApp {
            mut poller_handle,
            outcome,
            shutdown,
            config,
        } = self;

        tracing::info!(
            state_url = %config.state_url,
            interval_ms = config.poll.interval.as_millis() as u64,
            "payment status watcher started"
        );

        let mut listener = shutdown.subscribe();
        listener.notified().await;

        let grace = Duration::from_secs(5);
        let wait = tokio::time::sleep(grace);
        tokio::pin!(wait);
        tokio::select! {
            res = &mut poller_handle => {
                if let Err(err) = res {
                    if err.is_panic() {
                        tracing::error!("status poller task panicked");
                    }
                }
            }
            _ = &mut wait => {
                tracing::warn!(
                    target: "poller",
                    "poller did not stop within {:?}; aborting",
                    grace
                );
                poller_handle.abort();
            }
        }

        match outcome.lock().clone() {
            Some(PageTransition::Replace(url)) => {
                tracing::info!(redirect = %url, "payment confirmed; replacing page with redirect target");
            }
            Some(PageTransition::Reload) => {
                tracing::info!("payment state changed; reloading the server view");
            }
            None => {
                tracing::info!("watcher stopped before the payment resolved");
            }
        }
        Ok(())
    }
}

/// The headless stand-in for browser navigation: record the outcome once and
/// tear the process down, the way a navigating page tears down its scripts.
fn build_transition_callback(
    outcome: Arc<Mutex<Option<PageTransition>>>,
    shutdown: Shutdown,
) -> TransitionCallback {
    Arc::new(move |transition| {
        let mut slot = outcome.lock();
        if slot.is_none() {
            *slot = Some(transition);
        }
        shutdown.trigger();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_transition_wins_and_triggers_shutdown() {
        let shutdown = Shutdown::new();
        let outcome = Arc::new(Mutex::new(None));
        let callback = build_transition_callback(Arc::clone(&outcome), shutdown.clone());

        callback(PageTransition::Replace("/done".to_string()));
        callback(PageTransition::Reload);

        assert_eq!(
            *outcome.lock(),
            Some(PageTransition::Replace("/done".to_string()))
        );
        assert!(shutdown.subscribe().is_triggered());
    }
}
