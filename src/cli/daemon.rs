//! Daemon mode
//!
//! Runs one pass over all tasks right away, then one pass per interval tick.
//! A failed pass is queued on an error channel and handled by the loop: with
//! `fail` set the loop stops and returns it, otherwise it is logged and the
//! loop keeps ticking.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{select, Receiver};

/// Runs `pass` every `interval`, forever unless a pass fails under `fail`
pub fn run<F>(interval: Duration, fail: bool, pass: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    tracing::info!(interval = ?interval, fail, "starting daemon");
    run_loop(crossbeam_channel::tick(interval), fail, pass)
}

/// Scheduler loop driven by `ticker`; returns once the ticker is closed
fn run_loop<F>(ticker: Receiver<Instant>, fail: bool, mut pass: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let (errors_tx, errors_rx) = crossbeam_channel::bounded(1);

    let mut run_pass = || {
        tracing::debug!("starting pass");
        if let Err(e) = pass() {
            // A full queue already holds an unhandled error
            let _ = errors_tx.try_send(e);
        }
    };

    run_pass();

    loop {
        select! {
            recv(errors_rx) -> error => {
                if let Ok(error) = error {
                    settle(error, fail)?;
                }
            }
            recv(ticker) -> tick => match tick {
                Ok(_) => {
                    // Both arms may be ready; under `fail` a queued error wins
                    if fail {
                        if let Ok(error) = errors_rx.try_recv() {
                            settle(error, fail)?;
                        }
                    }
                    run_pass();
                }
                Err(_) => {
                    tracing::debug!("ticker closed, stopping daemon");
                    if let Ok(error) = errors_rx.try_recv() {
                        settle(error, fail)?;
                    }
                    return Ok(());
                }
            },
        }
    }
}

fn settle(error: anyhow::Error, fail: bool) -> Result<()> {
    if fail {
        return Err(error.context("Daemon pass failed"));
    }
    tracing::warn!(error = %format!("{:#}", error), "pass failed, waiting for next tick");
    Ok(())
}
