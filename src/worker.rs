//! Background scanner thread.
//!
//! The `ScanLoop` runs on its own named thread. The owner talks to it through a
//! `ScannerHandle`, which sends `ScanCommand`s over an `mpsc` channel. When the loop
//! publishes through a `ChannelSink`, `forward_events` replays its output into the
//! presentation sinks on the owner's thread, so rendering never slows a cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::adapters::channel_sink::ScanEvent;
use crate::domain::error::ScannerError;
use crate::domain::scan_loop::{ScanCommand, ScanLoop, ScanState};
use crate::ports::scan_sink_port::ScanSink;

/// How often `forward_events` checks for an interrupt or a finished worker.
const FORWARD_POLL: Duration = Duration::from_millis(100);

pub struct ScannerHandle {
    tx: Sender<ScanCommand>,
    join: JoinHandle<ScanLoop>,
}

/// Spawn the scanner thread. The loop starts Idle and waits for a `Start` command.
pub fn spawn_scanner(mut scan: ScanLoop) -> Result<ScannerHandle, ScannerError> {
    let (tx, rx) = mpsc::channel();
    let join = thread::Builder::new()
        .name("setupscan-worker".into())
        .spawn(move || {
            scan.run(&rx);
            debug!(state = %scan.state(), cycles = scan.cycles(), "scanner thread exiting");
            scan
        })?;
    Ok(ScannerHandle { tx, join })
}

impl ScannerHandle {
    fn send(&self, cmd: ScanCommand) -> Result<(), ScannerError> {
        self.tx.send(cmd).map_err(|_| ScannerError::InvalidState {
            action: "send command".to_string(),
            state: "exited".to_string(),
        })
    }

    pub fn start(&self, symbols: Vec<String>, risk_pct: f64, rr_ratio: f64) -> Result<(), ScannerError> {
        self.send(ScanCommand::Start {
            symbols,
            risk_pct,
            rr_ratio,
        })
    }

    pub fn stop(&self) -> Result<(), ScannerError> {
        self.send(ScanCommand::Stop)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit on its own, e.g. after `max_cycles`.
    pub fn join(self) -> Result<ScanState, ScannerError> {
        let ScannerHandle { tx, join } = self;
        let result = join.join();
        drop(tx);
        result.map(|scan| scan.state()).map_err(|_| ScannerError::InvalidState {
            action: "join".to_string(),
            state: "panicked".to_string(),
        })
    }

    /// Stop if running, then end the thread and wait for it.
    pub fn shutdown(self) -> Result<ScanState, ScannerError> {
        // the thread may already have exited; joining reports its final state
        let _ = self.tx.send(ScanCommand::Shutdown);
        self.join()
    }

    /// Deliver `events` into `sink` on the calling thread until the worker exits.
    ///
    /// Setting `interrupted` stops the scanner and shuts the thread down. Events
    /// still queued when the worker ends, such as the stop notice, are delivered
    /// before returning.
    pub fn forward_events(
        self,
        events: &Receiver<ScanEvent>,
        sink: &mut dyn ScanSink,
        interrupted: &AtomicBool,
    ) -> Result<ScanState, ScannerError> {
        loop {
            if interrupted.load(Ordering::SeqCst) {
                info!("interrupt received, stopping scanner");
                // the worker may already be gone; shutdown reports its final state
                let _ = self.stop();
                break;
            }
            match events.recv_timeout(FORWARD_POLL) {
                Ok(event) => event.deliver(sink),
                Err(RecvTimeoutError::Timeout) => {
                    if self.is_finished() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let state = self.shutdown();
        for event in events.try_iter() {
            event.deliver(sink);
        }
        state
    }
}
