//! Scan engine with statum state machine for the poll lifecycle
//!
//! Owns all mutable session state of one device instance and drives the
//! sample → quantize → aggregate → emit pipeline once per poll period.
//!
//! # State Machine
//!
//! ```text
//! Disabled ──enable()──► Enabled ──cancel──► Disabled
//!    ▲                      │
//!    └──────────────────────┘
//!      (run_until_disabled)
//! ```
//!
//! # Architecture
//!
//! ```text
//! AxisSampler ──► scan_cycle ──► mpsc::Sender<KeyEvent>
//! ButtonSampler     │  ▲
//!                   ▼  │
//!              ScanSession (previous mask + axis states)
//! ```
//!
//! Exactly one cycle is in flight at a time: the engine moves into a single
//! tokio task while Enabled, and enable/disable requests from other contexts
//! take effect at cycle boundaries only.

use crate::config::{ConfigError, ScanConfig};
use crate::matrix::{
    aggregate, emit_changes, quantize, AxisDirection, AxisThresholds, ColumnLayout, KeyEvent,
    MATRIX_ROW,
};
use crate::scanner::provider::{AxisChannel, AxisSampler, ButtonSampler, ProviderError};
use chrono::Local;
use statum::{machine, state};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Errors from scan engine construction and operation
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Sample provider failure; a per-cycle acquisition error or a device
    /// that never came up
    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    /// Configuration rejected at initialization
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Event delivery failure
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Scan task management failure
    #[error("Thread error: {0}")]
    ThreadError(String),
}

/// Mutable per-device session state, reset to neutral on every enable.
#[derive(Clone, Copy, Debug, Default)]
struct ScanSession {
    axis_x: AxisDirection,
    axis_y: AxisDirection,
    column_mask: u32,
}

/// Lifecycle states of the scan engine
#[state]
#[derive(Debug, Clone)]
pub enum ScanState {
    Disabled,
    Enabled,
}

/// Scan cycle controller with compile-time state safety via statum
///
/// All collaborators are injected: samplers for acquisition, an optional
/// mpsc sender as the event sink. The engine itself never spawns timers;
/// while Enabled it is driven by the interval inside `run_until_disabled`.
#[machine]
pub struct ScanEngine<S: ScanState> {
    config: ScanConfig,
    thresholds: AxisThresholds,
    layout: ColumnLayout,
    axes: Box<dyn AxisSampler>,
    buttons: Box<dyn ButtonSampler>,
    sink: Option<mpsc::Sender<KeyEvent>>,
    session: ScanSession,
}

impl<S: ScanState> ScanEngine<S> {
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
}

impl ScanEngine<Disabled> {
    /// Builds a disabled engine after validating the configuration.
    ///
    /// Validation failures are fatal; the device does not come up.
    pub fn create(
        config: ScanConfig,
        axes: Box<dyn AxisSampler>,
        buttons: Box<dyn ButtonSampler>,
    ) -> Result<Self, ScanError> {
        config.validate()?;

        let thresholds = config.thresholds();
        let layout = config.layout();
        info!(
            "Creating scan engine: {} columns, {}ms poll period",
            layout.total_columns(),
            config.poll_period_ms
        );

        Ok(Self::new(
            config,
            thresholds,
            layout,
            axes,
            buttons,
            None,
            ScanSession::default(),
        ))
    }

    /// Registers the event sink.
    ///
    /// `None` keeps scan cycles running and updating internal state without
    /// delivering events.
    pub fn configure(&mut self, sink: Option<mpsc::Sender<KeyEvent>>) {
        if sink.is_none() {
            warn!("No event sink registered, scan cycles will not deliver events");
        }
        self.sink = sink;
    }

    /// Transitions to Enabled with the session reset to neutral.
    pub fn enable(mut self) -> ScanEngine<Enabled> {
        info!("Enabling scan engine");
        self.session = ScanSession::default();
        self.transition()
    }
}

impl ScanEngine<Enabled> {
    /// Runs one full scan cycle: acquire, quantize, aggregate, emit, persist.
    ///
    /// An axis read failure aborts the cycle and leaves the stored session
    /// untouched; the caller keeps polling at the normal period. Button
    /// reads cannot fail and degrade to released inside the provider.
    fn scan_cycle(&mut self) -> Result<(), ScanError> {
        let x_raw = self.axes.sample(AxisChannel::X).map_err(|e| {
            error!("Axis X read failed: {}", e);
            e
        })?;
        let y_raw = self.axes.sample(AxisChannel::Y).map_err(|e| {
            error!("Axis Y read failed: {}", e);
            e
        })?;

        let axis_x = quantize(x_raw, self.session.axis_x, &self.thresholds);
        let axis_y = quantize(y_raw, self.session.axis_y, &self.thresholds);

        let button_states: Vec<bool> = (0..self.layout.button_count)
            .map(|index| self.buttons.is_pressed(index))
            .collect();

        let new_mask = aggregate(
            axis_x,
            axis_y,
            &button_states,
            &self.layout,
            self.config.invert_x,
            self.config.invert_y,
        );

        let old_mask = self.session.column_mask;
        if old_mask != new_mask {
            debug!("Column mask changed: {:#010x} -> {:#010x}", old_mask, new_mask);
        }

        if let Some(sink) = &self.sink {
            emit_changes(
                old_mask,
                new_mask,
                self.layout.total_columns(),
                &mut |column, pressed| {
                    let event = KeyEvent {
                        row: MATRIX_ROW,
                        column,
                        pressed,
                        timestamp: Local::now(),
                    };
                    if let Err(e) = sink.try_send(event) {
                        warn!("Failed to deliver key event: {}", e);
                    }
                },
            );
        }

        self.session.column_mask = new_mask;
        self.session.axis_x = axis_x;
        self.session.axis_y = axis_y;

        Ok(())
    }

    /// Polls scan cycles at the configured period until cancelled.
    ///
    /// The first cycle runs immediately after enabling. Individual cycle
    /// failures are logged and do not stop the loop.
    pub async fn run_until_disabled(mut self, cancel: CancellationToken) -> ScanEngine<Disabled> {
        info!(
            "Starting scan loop with {}ms poll period",
            self.config.poll_period_ms
        );

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.poll_period_ms));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Scan loop cancelled");
                    break;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.scan_cycle() {
                        error!("Scan cycle aborted: {}", e);
                    }
                }
            }
        }

        self.disable()
    }

    /// Transitions back to Disabled without touching the session.
    pub fn disable(self) -> ScanEngine<Disabled> {
        info!("Disabling scan engine");
        self.transition()
    }
}

/// Handle for driving the scan engine from outside the scan task
///
/// Owns the disabled engine between runs. `enable` moves it into a spawned
/// task; `disable` cancels the pending cycle and takes it back, so the same
/// device instance can be re-enabled. The surface is the usual key-scan
/// driver triple: configure a sink once, then enable/disable at will.
pub struct ScannerHandle {
    engine: Option<ScanEngine<Disabled>>,
    task_handle: Option<JoinHandle<ScanEngine<Disabled>>>,
    cancel: Option<CancellationToken>,
}

impl ScannerHandle {
    /// Creates the engine in the Disabled state and registers the sink.
    pub fn create(
        config: ScanConfig,
        axes: Box<dyn AxisSampler>,
        buttons: Box<dyn ButtonSampler>,
        sink: Option<mpsc::Sender<KeyEvent>>,
    ) -> Result<Self, ScanError> {
        let mut engine = ScanEngine::create(config, axes, buttons)?;
        engine.configure(sink);

        Ok(Self {
            engine: Some(engine),
            task_handle: None,
            cancel: None,
        })
    }

    /// Spawns the scan task; the first cycle runs immediately.
    pub fn enable(&mut self) {
        let Some(engine) = self.engine.take() else {
            warn!("Scanner already enabled");
            return;
        };

        info!("Enabling scanner");
        let cancel = CancellationToken::new();
        let task_token = cancel.clone();
        let task_handle =
            tokio::spawn(async move { engine.enable().run_until_disabled(task_token).await });

        self.cancel = Some(cancel);
        self.task_handle = Some(task_handle);
    }

    /// Cancels the pending cycle and takes the engine back for re-enabling.
    pub async fn disable(&mut self) -> Result<(), ScanError> {
        let Some(task_handle) = self.task_handle.take() else {
            warn!("Scanner already disabled");
            return Ok(());
        };

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        match task_handle.await {
            Ok(engine) => {
                debug!("Scan task completed");
                self.engine = Some(engine);
                Ok(())
            }
            Err(e) => {
                error!("Scan task panicked: {}", e);
                Err(ScanError::ThreadError(format!("Scan task panicked: {}", e)))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task_handle.is_some()
    }
}
