//! Intent worker.
//!
//! # Responsibilities
//! - Receive navigation intents from popstate and intercepted links
//! - Spawn one navigation task per intent
//! - Exit on shutdown or when the navigator is dropped
//!
//! # Design Decisions
//! - Listeners only enqueue; they never run a navigation inline
//! - The worker holds a weak handle so it never keeps a navigator alive

use std::sync::Weak;

use tokio::sync::{broadcast, mpsc};

use crate::navigator::hooks::NavigateOptions;
use crate::navigator::orchestrator::{Inner, Navigator};

/// A navigation requested from outside the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub path: String,
    pub options: NavigateOptions,
}

impl Intent {
    /// Intercepted anchor click.
    pub fn link(href: impl Into<String>) -> Self {
        Self {
            path: href.into(),
            options: NavigateOptions::default(),
        }
    }

    /// History traversal; the URL has already changed.
    pub fn popstate(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: NavigateOptions::silent(),
        }
    }
}

/// Coordinator for stopping the worker.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) async fn run(
    navigator: Weak<Inner>,
    mut intents: mpsc::UnboundedReceiver<Intent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::debug!("Intent worker starting");

    loop {
        tokio::select! {
            intent = intents.recv() => {
                let Some(intent) = intent else {
                    break;
                };
                let Some(inner) = navigator.upgrade() else {
                    break;
                };
                let navigator = Navigator::from_inner(inner);
                tracing::debug!(path = %intent.path, "Dispatching navigation intent");
                tokio::spawn(async move {
                    navigator.trigger_route(&intent.path, intent.options).await;
                });
            }
            _ = shutdown.recv() => {
                tracing::debug!("Intent worker received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
