//! Polling loop and the start/stop control surface.
//!
//! [`MonitorLoop`] is the only writer of the session's [`StateStore`]. It
//! probes devices one after another, feeds results to the evaluator, and
//! hands alerts to short-lived notification tasks that only receive copies.

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::device::{Device, DeviceList};
use super::evaluator::{evaluate, Transition};
use super::events::{EventSink, LogEvent, LogSink, MonitorEvent, SharedSink};
use super::settings::{resolve, PollSettings, SettingsSource, DEFAULT_PROBE_TIMEOUT};
use super::state::{DeviceSnapshot, StateStore};
use crate::core::notify::{Alert, Notifier};
use crate::core::probe::Prober;
use crate::error::{MonitorError, Result};

/// How long `stop` waits for the loop to notice the stop signal
pub const STOP_GRACE: Duration = Duration::from_secs(2);

/// Latest per-device view published after every cycle
pub type Snapshot = Arc<Vec<DeviceSnapshot>>;

/// External capabilities the monitor is built from.
#[derive(Clone)]
pub struct Capabilities {
    pub prober: Arc<dyn Prober>,
    pub notifier: Arc<dyn Notifier>,
    pub sink: SharedSink,
    /// Requested per-probe timeout; capped below the poll interval
    pub probe_timeout: Duration,
}

impl Capabilities {
    pub fn new(prober: Arc<dyn Prober>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            prober,
            notifier,
            sink: Arc::new(LogSink),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// The polling loop for one monitoring session.
pub struct MonitorLoop {
    devices: DeviceList,
    store: StateStore,
    settings: Arc<dyn SettingsSource>,
    caps: Capabilities,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl MonitorLoop {
    pub fn new(
        devices: DeviceList,
        settings: Arc<dyn SettingsSource>,
        caps: Capabilities,
    ) -> (Self, watch::Receiver<Snapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Vec::new()));
        let monitor = Self {
            devices,
            store: StateStore::new(),
            settings,
            caps,
            snapshot_tx,
        };
        (monitor, snapshot_rx)
    }

    fn emit(&self, event: MonitorEvent) {
        self.caps.sink.emit(LogEvent::now(event));
    }

    fn publish_snapshot(&self) {
        let snapshot = self.store.snapshot(Instant::now());
        self.snapshot_tx.send_replace(Arc::new(snapshot));
    }

    /// Run until `stop` is raised or its sender goes away.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        self.emit(MonitorEvent::Starting);
        self.store.initialize(&self.devices, Instant::now());
        self.emit(MonitorEvent::Watching {
            devices: self.store.len(),
        });
        self.publish_snapshot();

        loop {
            if stop_requested(&stop) {
                break;
            }

            let resolved = resolve(self.settings.read());
            if let Some(reason) = resolved.fallback {
                self.emit(MonitorEvent::SettingsFallback { reason });
            }
            let settings = resolved.settings;

            self.run_cycle(&settings, &stop).await;
            self.publish_snapshot();

            if stop_requested(&stop) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(settings.poll_interval) => {}
                _ = stop.changed() => {}
            }
        }

        self.emit(MonitorEvent::Stopped);
    }

    /// One pass over every device in supply order
    async fn run_cycle(&mut self, settings: &PollSettings, stop: &watch::Receiver<bool>) {
        let timeout = settings.probe_timeout(self.caps.probe_timeout);
        let devices = self.devices.clone();

        for device in &devices {
            if stop_requested(stop) {
                return;
            }
            self.check_device(device, settings, timeout).await;
        }
    }

    async fn check_device(&mut self, device: &Device, settings: &PollSettings, timeout: Duration) {
        let probe = AssertUnwindSafe(self.caps.prober.probe(&device.address, timeout)).catch_unwind();

        let probe_ok = match tokio::time::timeout(timeout, probe).await {
            Ok(Ok(Ok(reachable))) => reachable,
            Ok(Ok(Err(e))) => {
                self.emit(MonitorEvent::ProbeFailed {
                    address: device.address.clone(),
                    error: e.to_string(),
                });
                false
            }
            Ok(Err(panic)) => {
                self.emit(MonitorEvent::DeviceFault {
                    address: device.address.clone(),
                    error: format!("probe panicked: {}", panic_message(&*panic)),
                });
                false
            }
            Err(_) => false,
        };

        let now = Instant::now();
        let state = match self.store.get(&device.address) {
            Ok(state) => state.clone(),
            Err(e) => {
                self.emit(MonitorEvent::DeviceFault {
                    address: device.address.clone(),
                    error: e.to_string(),
                });
                return;
            }
        };

        let (next, transition) = evaluate(&state, probe_ok, now, settings.threshold);
        if let Err(e) = self.store.apply(&next) {
            self.emit(MonitorEvent::DeviceFault {
                address: device.address.clone(),
                error: e.to_string(),
            });
            return;
        }

        match transition {
            Transition::None => {}
            Transition::StillDown { downtime } => self.emit(MonitorEvent::StillDown {
                address: state.address,
                identifier: state.identifier,
                downtime,
            }),
            Transition::Recovered { downtime } => self.emit(MonitorEvent::Recovered {
                address: state.address,
                identifier: state.identifier,
                downtime,
            }),
            Transition::Notify {
                address,
                identifier,
                downtime,
            } => {
                self.emit(MonitorEvent::Unresponsive {
                    address: address.clone(),
                    identifier: identifier.clone(),
                    downtime,
                });
                self.dispatch(Alert {
                    address,
                    identifier,
                    downtime,
                    threshold: settings.threshold,
                    at: chrono::Local::now(),
                });
            }
        }
    }

    /// Deliver an alert without holding up the cycle
    fn dispatch(&self, alert: Alert) {
        let notifier = Arc::clone(&self.caps.notifier);
        let sink = Arc::clone(&self.caps.sink);

        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(notifier.notify(&alert)).catch_unwind().await;
            let event = match outcome {
                Ok(Ok(())) => MonitorEvent::NotificationSent {
                    address: alert.address,
                    identifier: alert.identifier,
                },
                Ok(Err(e)) => MonitorEvent::NotificationFailed {
                    address: alert.address,
                    identifier: alert.identifier,
                    error: e.to_string(),
                },
                Err(panic) => MonitorEvent::NotificationFailed {
                    address: alert.address,
                    identifier: alert.identifier,
                    error: format!("notifier panicked: {}", panic_message(&*panic)),
                },
            };
            sink.emit(LogEvent::now(event));
        });
    }
}

fn stop_requested(stop: &watch::Receiver<bool>) -> bool {
    *stop.borrow() || stop.has_changed().is_err()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct Session {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

/// Start/stop control over a background [`MonitorLoop`].
pub struct Monitor {
    caps: Capabilities,
    session: Option<Session>,
}

impl Monitor {
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            session: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// Validate the device list and spawn the polling loop.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(
        &mut self,
        devices: Vec<Device>,
        settings: Arc<dyn SettingsSource>,
    ) -> Result<()> {
        if self.is_running() {
            return Err(MonitorError::AlreadyRunning);
        }
        let devices = DeviceList::new(devices)?;

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            MonitorError::other(format!("monitor must be started inside a tokio runtime: {}", e))
        })?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (monitor_loop, snapshot_rx) = MonitorLoop::new(devices, settings, self.caps.clone());
        let handle = runtime.spawn(monitor_loop.run(stop_rx));

        log::debug!("monitor loop spawned");
        self.session = Some(Session {
            stop_tx,
            handle,
            snapshot_rx,
        });
        Ok(())
    }

    /// Signal the loop and wait up to [`STOP_GRACE`] for it to finish.
    ///
    /// Calling this when nothing is running does nothing.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let _ = session.stop_tx.send(true);
        match tokio::time::timeout(STOP_GRACE, session.handle).await {
            Ok(Ok(())) => log::debug!("monitor loop stopped"),
            Ok(Err(e)) => log::error!("monitor loop ended abnormally: {}", e),
            Err(_) => log::warn!(
                "monitor loop did not stop within {}s, continuing without it",
                STOP_GRACE.as_secs()
            ),
        }
    }

    /// Receiver for per-device snapshots of the running session
    pub fn snapshots(&self) -> Option<watch::Receiver<Snapshot>> {
        self.session.as_ref().map(|s| s.snapshot_rx.clone())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            let _ = session.stop_tx.send(true);
        }
    }
}
