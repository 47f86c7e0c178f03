//! Ctrl-C handling for the binary.
//!
//! A small single-threaded tokio runtime waits for the interrupt on a
//! background thread and cancels the run's [`CancellationToken`]. The
//! pipeline then finishes any deletion already in flight and reports.

use std::future::Future;
use std::thread::{self, JoinHandle};

use crate::cancel::CancellationToken;
use crate::error::{JettisonError, Result};

/// Cancel `cancel` when the process receives Ctrl-C.
pub fn cancel_on_interrupt(cancel: &CancellationToken) -> Result<JoinHandle<()>> {
    watch(cancel.clone(), async { tokio::signal::ctrl_c().await.is_ok() })
}

/// Cancel `cancel` once `trigger` resolves to `true`.
fn watch<F>(cancel: CancellationToken, trigger: F) -> Result<JoinHandle<()>>
where
    F: Future<Output = bool> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| JettisonError::SignalHandlerError { source })?;

    thread::Builder::new()
        .name("jettison-interrupt".to_string())
        .spawn(move || {
            if runtime.block_on(trigger) {
                cancel.cancel();
            }
        })
        .map_err(|source| JettisonError::SignalHandlerError { source })
}
