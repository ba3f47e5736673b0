use signal_hook::low_level::signal_name;
use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Sets up a signal hook for SIGINT and SIGTERM.
///
/// Creates a signal hook for the specified signals and spawns a task to handle
/// them. When a signal is received, it logs the signal name and cancels the
/// given stop token so an active streaming session terminates orderly at its
/// next receive iteration.
///
/// # Arguments
///
/// * `stop` - The cancellation token to trigger on SIGINT/SIGTERM.
///
/// # Panics
///
/// The function panics if it fails to create the signal iterator.
///
pub async fn setup_signal_hook(stop: CancellationToken) {
    // Create a signal set of signals to be handled and a signal iterator to monitor them.
    let signals = &[SIGINT, SIGTERM];
    let mut signals_iterator = Signals::new(signals).expect("Failed to create signal iterator");

    // Create a new thread to handle signals sent to the process
    tokio::spawn(async move {
        if let Some(signal) = signals_iterator.forever().next() {
            info!("Received signal: {}", signal_name(signal).unwrap());
            stop.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_signal_hook_registers() {
        let stop = CancellationToken::new();
        setup_signal_hook(stop.clone()).await;
        // No signal has been delivered, the token must still be live.
        assert!(!stop.is_cancelled());
    }
}
