// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Interval between checks while waiting for connections to finish
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `state.shutdown_signal` fires.
///
/// The listener is closed on shutdown; connections already accepted are
/// given up to `grace` to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
    grace: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::clone(&state.shutdown_signal);
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_info("Shutdown requested, closing listener");
                break;
            }
        }
    }

    drop(listener);
    logger::log_server_stop(grace);

    let remaining = wait_for_drain(&active_connections, grace).await;
    if remaining > 0 {
        logger::log_warning(&format!(
            "{remaining} connection(s) still open after {}s grace period",
            grace.as_secs()
        ));
    }
    Ok(())
}

/// Wait until the counter reaches zero or `grace` elapses; returns what is left
pub async fn wait_for_drain(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let counter = AtomicUsize::new(0);
        assert_eq!(wait_for_drain(&counter, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(2);
        assert_eq!(wait_for_drain(&counter, Duration::from_millis(60)).await, 2);
    }

    #[tokio::test]
    async fn test_loop_stops_on_shutdown() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        let state = Arc::new(AppState::new(&cfg));
        let listener = crate::server::create_reusable_listener("127.0.0.1:0".parse().unwrap())
            .unwrap();
        state.shutdown_signal.notify_one();

        let local = tokio::task::LocalSet::new();
        let result = local
            .run_until(start_server_loop(
                listener,
                Arc::clone(&state),
                Arc::new(AtomicUsize::new(0)),
                Duration::from_millis(10),
            ))
            .await;
        assert!(result.is_ok());
    }
}
