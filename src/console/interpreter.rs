//! Command interpreter
//!
//! Turns submitted lines into log entries and calls into the transfer engine
//! or the host collaborators. Work that has to wait on the network or a timer
//! runs in spawned tasks which report back through an event channel, so the
//! caller can keep rendering while it completes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::history::CommandHistory;
use super::log::{ConsoleLog, LogEntry, LogKind};
use super::reports;
use crate::commands::help::{listing_text, matrix_text, whoami_text};
use crate::commands::{WasterCommand, get_help_text, parse_command, parse_size};
use crate::config::{ConsoleConfig, WasterConfig};
use crate::host::{DeviceInfoProvider, ReloadTrigger, Theme, ThemeSetter};
use crate::source::ByteSource;
use crate::terminal::progress::format_bytes;
use crate::transfer::{
    JobOutcome, JobState, LinkQuality, SpeedReport, TransferEngine, measure_bandwidth, ping,
};

/// Collaborators supplied by whatever hosts the console
#[derive(Clone)]
pub struct ConsoleHooks {
    pub theme: Arc<dyn ThemeSetter>,
    pub reload: Arc<dyn ReloadTrigger>,
    pub device: Arc<dyn DeviceInfoProvider>,
}

/// Posted by background tasks and applied on the interpreter's side
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    Log(LogKind, String),
    Reload,
    SpeedTestFinished,
}

pub struct Interpreter {
    engine: TransferEngine,
    outcomes: mpsc::UnboundedReceiver<JobOutcome>,
    events_tx: mpsc::UnboundedSender<ConsoleEvent>,
    events: mpsc::UnboundedReceiver<ConsoleEvent>,
    hooks: ConsoleHooks,
    timing: ConsoleConfig,
    log: ConsoleLog,
    history: CommandHistory,
    header_visible: bool,
    speedtest_active: bool,
    tasks: Vec<JoinHandle<()>>,
}

impl Interpreter {
    /// Create an interpreter with its own engine and an empty log
    pub fn new(source: Arc<dyn ByteSource>, config: &WasterConfig, hooks: ConsoleHooks) -> Self {
        let (engine, outcomes) = TransferEngine::new(source, config.transfer.clone());
        let (events_tx, events) = mpsc::unbounded_channel();

        Self {
            engine,
            outcomes,
            events_tx,
            events,
            hooks,
            timing: config.console.clone(),
            log: ConsoleLog::new(),
            history: CommandHistory::new(),
            header_visible: true,
            speedtest_active: false,
            tasks: Vec::new(),
        }
    }

    /// Push the boot banner
    pub fn greet(&mut self) {
        self.log
            .push(LogKind::System, "INITIALIZING SENSEI PROTOCOL...");
        self.log
            .push(LogKind::Info, "Type \"help\" to see available tools.");
    }

    /// Handle one submitted line. Blank input is ignored.
    pub fn execute(&mut self, input: &str) {
        let raw = input.trim();
        if raw.is_empty() {
            return;
        }

        self.log.push(LogKind::System, reports::prompt_echo(raw));

        let command = parse_command(raw);
        debug!("Executing command: {}", command);
        self.dispatch(command);

        self.history.record(raw);
    }

    fn dispatch(&mut self, command: WasterCommand) {
        match command {
            WasterCommand::Start(size) => self.start(&size),
            WasterCommand::Stop => self.stop(),
            WasterCommand::Ping => self.ping(),
            WasterCommand::SpeedTest => self.speed_test(),
            WasterCommand::SysInfo => {
                let device = self.hooks.device.snapshot();
                self.log
                    .push(LogKind::Info, reports::system_diagnostics(&device));
            }
            WasterCommand::Time => {
                self.log
                    .push(LogKind::Info, reports::clock_report(chrono::Local::now()));
            }
            WasterCommand::WhoAmI => {
                self.log.push(LogKind::Success, whoami_text());
            }
            WasterCommand::List => {
                self.log.push(LogKind::Info, listing_text());
            }
            WasterCommand::Matrix => {
                self.log.push(LogKind::Success, matrix_text());
            }
            WasterCommand::Echo(text) => {
                self.log.push(LogKind::Info, text);
            }
            WasterCommand::History => {
                let message = if self.history.is_empty() {
                    "No history found.".to_string()
                } else {
                    self.history.listing()
                };
                self.log.push(LogKind::Info, message);
            }
            WasterCommand::Help => {
                self.log.push(LogKind::Info, get_help_text());
            }
            WasterCommand::Clear => {
                self.log.clear();
                self.header_visible = false;
            }
            WasterCommand::Theme(theme) => self.set_theme(theme),
            WasterCommand::Reboot => self.reboot(),
            WasterCommand::Unknown(token) => {
                self.log.push(
                    LogKind::Error,
                    format!("COMMAND NOT RECOGNIZED: \"{}\". Type \"help\".", token),
                );
            }
        }
    }

    fn start(&mut self, size: &str) {
        if self.engine.is_running() {
            self.log
                .push(LogKind::Error, "ERROR: Process running. Type \"stop\".");
            return;
        }

        let Some(bytes) = parse_size(size) else {
            debug!("Rejected size argument '{}'", size);
            self.log.push(
                LogKind::Error,
                "SYNTAX ERROR. Try: \"start 1gb\" or \"start 500mb\"",
            );
            return;
        };

        match self.engine.start(bytes) {
            Ok(()) => {
                self.log.push(
                    LogKind::Success,
                    format!(">> INITIATING DUMP: {} <<", format_bytes(bytes)),
                );
            }
            Err(e) => {
                warn!("Engine refused start({}): {}", bytes, e);
                self.log.push(LogKind::Error, format!("ERROR: {}", e));
            }
        }
    }

    fn stop(&mut self) {
        if self.engine.stop() {
            self.log.push(LogKind::Error, ">> PROCESS ABORTED <<");
        } else {
            self.log.push(LogKind::Info, "No active process to abort.");
        }
    }

    fn ping(&mut self) {
        self.log.push(LogKind::Info, "Pinging Cloudflare Edge...");

        let source = self.engine.source();
        let events = self.events_tx.clone();
        self.spawn(async move {
            let event = match ping(source.as_ref()).await {
                Ok(latency) => ConsoleEvent::Log(
                    LogKind::Success,
                    format!(
                        "REPLY: time={}ms [{}]",
                        latency.as_millis(),
                        LinkQuality::from_latency(latency)
                    ),
                ),
                Err(e) => {
                    warn!("Ping failed: {}", e);
                    ConsoleEvent::Log(LogKind::Error, "PING FAILED: Network unreachable".into())
                }
            };
            let _ = events.send(event);
        });
    }

    fn speed_test(&mut self) {
        if self.engine.is_running() {
            self.log.push(
                LogKind::Error,
                "ERROR: Cannot run speedtest while wasting data.",
            );
            return;
        }
        if self.speedtest_active {
            self.log
                .push(LogKind::Error, "ERROR: Speed test already in progress.");
            return;
        }

        self.speedtest_active = true;
        self.log
            .push(LogKind::Info, "INITIALIZING NETWORK SPEED TEST...");
        self.log
            .push(LogKind::System, ">> PHASE 1: LATENCY CHECK (PING)");

        let source = self.engine.source();
        let window = self.timing.speedtest_window();
        let events = self.events_tx.clone();
        self.spawn(run_speed_test(source, window, events));
    }

    fn set_theme(&mut self, theme: Theme) {
        self.hooks.theme.set_theme(theme);
        let message = match theme {
            Theme::Light => ">> ACTIVATING DIM MODE... [COMFORT: ON]",
            Theme::Dark => ">> ACTIVATING MATRIX MODE... [STEALTH: ON]",
        };
        self.log.push(LogKind::Success, message);
    }

    fn reboot(&mut self) {
        self.log.push(LogKind::Error, "SYSTEM REBOOT INITIATED...");

        let delay = self.timing.reboot_delay();
        let events = self.events_tx.clone();
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ConsoleEvent::Reload);
        });
    }

    fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.tasks.retain(|handle| !handle.is_finished());
        self.tasks.push(tokio::spawn(task));
    }

    /// Apply every outcome and event that is already waiting.
    /// Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.apply_outcome(outcome);
            applied += 1;
        }
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next outcome or event and apply it. Cancel safe.
    pub async fn next_event(&mut self) {
        tokio::select! {
            Some(outcome) = self.outcomes.recv() => self.apply_outcome(outcome),
            Some(event) = self.events.recv() => self.apply_event(event),
        }
    }

    fn apply_outcome(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Completed {
                total_bytes,
                elapsed_secs,
                average_speed,
                ..
            } => {
                self.log.push(
                    LogKind::Success,
                    reports::completion_summary(total_bytes, elapsed_secs, average_speed),
                );
            }
            JobOutcome::Cancelled {
                bytes_transferred, ..
            } => {
                debug!("Cancelled job left {} bytes transferred", bytes_transferred);
            }
        }
    }

    fn apply_event(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::Log(kind, message) => {
                self.log.push(kind, message);
            }
            ConsoleEvent::SpeedTestFinished => self.speedtest_active = false,
            ConsoleEvent::Reload => {
                info!("Reload requested");
                self.hooks.reload.reload();
            }
        }
    }

    /// Stop the running job and any pending background work
    pub fn shutdown(&mut self) {
        self.engine.stop();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    pub fn log(&self) -> &ConsoleLog {
        &self.log
    }

    /// Snapshot of the current (or last) job
    pub fn job_state(&self) -> JobState {
        self.engine.state()
    }

    /// Whether the renderer should still draw the header chrome
    pub fn header_visible(&self) -> bool {
        self.header_visible
    }

    pub fn speedtest_active(&self) -> bool {
        self.speedtest_active
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut CommandHistory {
        &mut self.history
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Latency phase, then a timed bandwidth window. Only a latency failure is
/// reported to the user; bandwidth errors just shorten the measurement.
async fn run_speed_test(
    source: Arc<dyn ByteSource>,
    window: Duration,
    events: mpsc::UnboundedSender<ConsoleEvent>,
) {
    let latency = match ping(source.as_ref()).await {
        Ok(latency) => latency,
        Err(e) => {
            warn!("Speed test latency phase failed: {}", e);
            let _ = events.send(ConsoleEvent::Log(LogKind::Error, ">> PING FAILED".into()));
            let _ = events.send(ConsoleEvent::SpeedTestFinished);
            return;
        }
    };

    let _ = events.send(ConsoleEvent::Log(
        LogKind::Info,
        format!(">> PING RESULT: {}ms", latency.as_millis()),
    ));
    let _ = events.send(ConsoleEvent::Log(
        LogKind::System,
        format!(
            ">> PHASE 2: BANDWIDTH STRESS TEST ({}s)",
            window.as_secs_f64()
        ),
    ));

    let (bytes, elapsed) = measure_bandwidth(source.as_ref(), window).await;
    let report = SpeedReport {
        ping: latency,
        bytes,
        elapsed,
    };
    info!(
        "Speed test finished: {} bytes in {:.1}s",
        bytes,
        elapsed.as_secs_f64()
    );

    let _ = events.send(ConsoleEvent::Log(
        LogKind::Success,
        reports::speed_report(&report),
    ));
    let _ = events.send(ConsoleEvent::SpeedTestFinished);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, WasterError};
    use crate::host::SharedDeviceInfo;
    use crate::source::ChunkStream;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct OfflineSource;

    #[async_trait]
    impl ByteSource for OfflineSource {
        async fn open(&self, _cache_token: u64) -> Result<ChunkStream> {
            Err(WasterError::ConnectionLost("offline".to_string()))
        }

        async fn probe(&self) -> Result<()> {
            Err(WasterError::ConnectionLost("offline".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        themes: Mutex<Vec<Theme>>,
    }

    impl ThemeSetter for RecordingHost {
        fn set_theme(&self, theme: Theme) {
            self.themes.lock().unwrap().push(theme);
        }
    }

    impl ReloadTrigger for RecordingHost {
        fn reload(&self) {}
    }

    fn interpreter() -> (Interpreter, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let hooks = ConsoleHooks {
            theme: host.clone(),
            reload: host.clone(),
            device: Arc::new(SharedDeviceInfo::default()),
        };
        let interpreter = Interpreter::new(Arc::new(OfflineSource), &WasterConfig::default(), hooks);
        (interpreter, host)
    }

    fn kinds(interpreter: &Interpreter) -> Vec<LogKind> {
        interpreter.entries().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_greet() {
        let (mut console, _) = interpreter();
        console.greet();
        assert_eq!(kinds(&console), vec![LogKind::System, LogKind::Info]);
        assert!(console.header_visible());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let (mut console, _) = interpreter();
        console.execute("   ");
        assert!(console.entries().is_empty());
        assert!(console.history().is_empty());
    }

    #[test]
    fn test_echo_and_prompt() {
        let (mut console, _) = interpreter();
        console.execute("ECHO   hello   world");

        let entries = console.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LogKind::System);
        assert!(entries[0].message.ends_with("└─$ ECHO   hello   world"));
        assert_eq!(entries[1].kind, LogKind::Info);
        assert_eq!(entries[1].message, "hello world");
    }

    #[test]
    fn test_start_without_size() {
        let (mut console, _) = interpreter();
        console.execute("start");
        assert_eq!(console.log().of_kind(LogKind::Error).count(), 1);
        assert!(!console.job_state().is_running);
    }

    #[test]
    fn test_stop_when_idle() {
        let (mut console, _) = interpreter();
        console.execute("stop");
        assert_eq!(console.log().of_kind(LogKind::Error).count(), 0);
        assert_eq!(console.log().of_kind(LogKind::Info).count(), 1);
    }

    #[test]
    fn test_unknown_command() {
        let (mut console, _) = interpreter();
        console.execute("Hack the planet");
        let last = console.entries().last().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(last.message, "COMMAND NOT RECOGNIZED: \"hack\". Type \"help\".");
    }

    #[test]
    fn test_clear_hides_header() {
        let (mut console, _) = interpreter();
        console.greet();
        console.execute("cls");
        assert!(console.entries().is_empty());
        assert!(!console.header_visible());
    }

    #[test]
    fn test_theme_commands() {
        let (mut console, host) = interpreter();
        console.execute("light");
        console.execute("dark");
        assert_eq!(*host.themes.lock().unwrap(), vec![Theme::Light, Theme::Dark]);
        assert_eq!(console.log().of_kind(LogKind::Success).count(), 2);
    }

    #[test]
    fn test_history_listing_excludes_current_command() {
        let (mut console, _) = interpreter();
        console.execute("history");
        assert_eq!(console.entries().last().unwrap().message, "No history found.");

        console.execute("whoami");
        console.execute("history");
        assert_eq!(
            console.entries().last().unwrap().message,
            "1  history\n2  whoami"
        );
        assert_eq!(console.history().len(), 3);
    }

    #[tokio::test]
    async fn test_ping_failure_reported() {
        let (mut console, _) = interpreter();
        console.execute("ping");
        console.next_event().await;

        let last = console.entries().last().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(last.message, "PING FAILED: Network unreachable");
    }

    #[tokio::test]
    async fn test_speed_test_aborts_on_latency_failure() {
        let (mut console, _) = interpreter();
        console.execute("fast");
        assert!(console.speedtest_active());

        console.execute("speedtest");
        assert_eq!(
            console.entries().last().unwrap().message,
            "ERROR: Speed test already in progress."
        );

        console.next_event().await;
        console.next_event().await;
        assert!(!console.speedtest_active());
        assert!(
            console
                .entries()
                .iter()
                .any(|e| e.kind == LogKind::Error && e.message == ">> PING FAILED")
        );
        assert!(!console.entries().iter().any(|e| e.message.contains("PHASE 2")));
    }
}
