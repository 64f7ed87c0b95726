use tokio::signal;
use tokio::sync::broadcast;
use tokio::sync::broadcast::Sender;
use tracing::error;
use tracing::info;

/// Broadcasts once when the process receives Ctrl+C or SIGTERM.
pub struct Shutdown {
    signal: Sender<()>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Shutdown::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { signal: tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.signal.subscribe()
    }

    /// Fires the signal without waiting for an os signal.
    pub fn trigger(&self) {
        // no receivers left means nobody is waiting for it
        let _ = self.signal.send(());
    }

    pub fn listen(self) {
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(err) = signal::ctrl_c().await {
                    error!("failed to listen for ctrl+c, error={err}");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut terminate) => {
                        terminate.recv().await;
                    }
                    Err(err) => {
                        error!("failed to install sigterm handler, error={err}");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {},
                _ = terminate => {},
            }

            info!("received shutdown signal");
            self.trigger();
        });
    }
}
