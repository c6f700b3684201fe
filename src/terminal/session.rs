//! Interactive terminal session
//!
//! Raw-mode screen loop: reads keys, feeds submitted lines to the interpreter
//! and redraws whenever the composed frame changes.

use std::io::{self, Stdout, Write};
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use log::{debug, info};

use super::render::{self, Line, View};
use crate::commands::complete_command;
use crate::config::WasterConfig;
use crate::console::{ConsoleHooks, Interpreter};
use crate::error::Result;
use crate::host::{DeviceInfoProvider, ReloadTrigger, Theme, ThemeSetter};
use crate::source::ByteSource;

/// Screen refresh and key polling period
const TICK: Duration = Duration::from_millis(50);

/// Theme and reload requests coming from the interpreter
#[derive(Debug, Default)]
pub struct TerminalHost {
    light: AtomicBool,
    reload_requested: AtomicBool,
}

impl TerminalHost {
    pub fn theme(&self) -> Theme {
        if self.light.load(Ordering::Relaxed) {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    /// Whether a reload was requested since the last call
    pub fn take_reload(&self) -> bool {
        self.reload_requested.swap(false, Ordering::Relaxed)
    }
}

impl ThemeSetter for TerminalHost {
    fn set_theme(&self, theme: Theme) {
        self.light.store(theme == Theme::Light, Ordering::Relaxed);
    }
}

impl ReloadTrigger for TerminalHost {
    fn reload(&self) {
        self.reload_requested.store(true, Ordering::Relaxed);
    }
}

/// Restores the terminal however the session ends
struct ScreenGuard;

impl ScreenGuard {
    fn enter(stdout: &mut Stdout) -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
}

/// What the loop should do after a key press
#[derive(Debug, PartialEq, Eq)]
enum KeyFlow {
    Continue,
    Exit,
}

/// Terminal handler for the interactive console
pub struct Terminal {
    source: Arc<dyn ByteSource>,
    config: WasterConfig,
    host: Arc<TerminalHost>,
    device: Arc<dyn DeviceInfoProvider>,
    console: Interpreter,
    input: String,
    last_frame: Vec<Line>,
}

impl Terminal {
    /// Create a terminal with a fresh, greeted console
    pub fn new(
        source: Arc<dyn ByteSource>,
        config: WasterConfig,
        device: Arc<dyn DeviceInfoProvider>,
    ) -> Self {
        info!("Creating terminal session: {}", config);

        let host = Arc::new(TerminalHost::default());
        let console = Self::fresh_console(&source, &config, &host, &device);

        Self {
            source,
            config,
            host,
            device,
            console,
            input: String::new(),
            last_frame: Vec::new(),
        }
    }

    fn fresh_console(
        source: &Arc<dyn ByteSource>,
        config: &WasterConfig,
        host: &Arc<TerminalHost>,
        device: &Arc<dyn DeviceInfoProvider>,
    ) -> Interpreter {
        let hooks = ConsoleHooks {
            theme: host.clone(),
            reload: host.clone(),
            device: Arc::clone(device),
        };
        let mut console = Interpreter::new(Arc::clone(source), config, hooks);
        console.greet();
        console
    }

    /// Run until Ctrl+C or Ctrl+D
    pub async fn run_interactive(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        let _guard = ScreenGuard::enter(&mut stdout)?;
        let mut tick = tokio::time::interval(TICK);

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = self.console.next_event() => {}
            }
            self.console.pump();

            if self.host.take_reload() {
                self.reload();
            }

            let mut flow = KeyFlow::Continue;
            while flow == KeyFlow::Continue && event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    flow = self.handle_key(key);
                }
            }
            if flow == KeyFlow::Exit {
                break;
            }

            self.draw(&mut stdout)?;
        }

        info!("Terminal session closed");
        self.console.shutdown();
        Ok(())
    }

    /// Stop everything and start over with a new console
    fn reload(&mut self) {
        info!("Reloading console");
        self.console.shutdown();
        self.host.set_theme(Theme::Dark);
        self.console = Self::fresh_console(&self.source, &self.config, &self.host, &self.device);
        self.input.clear();
        self.last_frame.clear();
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyFlow {
        if key.kind != KeyEventKind::Press {
            return KeyFlow::Continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if matches!(key.code, KeyCode::Char('c' | 'C' | 'd' | 'D')) {
                return KeyFlow::Exit;
            }
            return KeyFlow::Continue;
        }

        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let line = mem::take(&mut self.input);
                debug!("User entered command: {}", line);
                self.console.execute(&line);
            }
            KeyCode::Up => {
                if let Some(cmd) = self.console.history_mut().recall_older() {
                    self.input = cmd.to_string();
                }
            }
            KeyCode::Down => {
                if let Some(cmd) = self.console.history_mut().recall_newer() {
                    self.input = cmd.to_string();
                }
            }
            KeyCode::Tab => {
                if let Some(completed) = complete_command(&self.input) {
                    self.input = completed;
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.console.history_mut().reset_cursor();
            }
            _ => {}
        }
        KeyFlow::Continue
    }

    fn compose(&self) -> Vec<Line> {
        let device = self.device.snapshot();
        let job = self.console.job_state();
        render::compose(&View {
            theme: self.host.theme(),
            device: self.console.header_visible().then_some(&device),
            entries: self.console.entries(),
            job: &job,
            input: &self.input,
        })
    }

    fn draw(&mut self, stdout: &mut Stdout) -> Result<()> {
        let frame = self.compose();
        if frame == self.last_frame {
            return Ok(());
        }

        let (_, rows) = terminal::size().unwrap_or((80, 24));
        queue!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
        for line in render::visible_tail(&frame, rows as usize) {
            queue!(
                stdout,
                SetForegroundColor(line.color),
                Print(&line.text),
                ResetColor,
                Print("\r\n")
            )?;
        }
        stdout.flush()?;

        self.last_frame = frame;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WasterError;
    use crate::host::SharedDeviceInfo;
    use crate::source::ChunkStream;
    use async_trait::async_trait;

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

    fn terminal() -> Terminal {
        Terminal::new(
            Arc::new(OfflineSource),
            WasterConfig::default(),
            Arc::new(SharedDeviceInfo::default()),
        )
    }

    fn press(terminal: &mut Terminal, code: KeyCode) -> KeyFlow {
        terminal.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_line(terminal: &mut Terminal, text: &str) {
        for c in text.chars() {
            press(terminal, KeyCode::Char(c));
        }
        press(terminal, KeyCode::Enter);
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut term = terminal();
        type_line(&mut term, "echo hi");

        assert!(term.input.is_empty());
        assert_eq!(term.console.entries().last().unwrap().message, "hi");
    }

    #[test]
    fn test_arrow_recall() {
        let mut term = terminal();
        type_line(&mut term, "whoami");
        type_line(&mut term, "ls");

        press(&mut term, KeyCode::Up);
        assert_eq!(term.input, "ls");
        press(&mut term, KeyCode::Up);
        press(&mut term, KeyCode::Up);
        assert_eq!(term.input, "whoami");
        press(&mut term, KeyCode::Down);
        assert_eq!(term.input, "ls");
        press(&mut term, KeyCode::Down);
        assert_eq!(term.input, "");
    }

    #[test]
    fn test_tab_and_backspace() {
        let mut term = terminal();
        press(&mut term, KeyCode::Char('e'));
        press(&mut term, KeyCode::Char('c'));
        press(&mut term, KeyCode::Tab);
        assert_eq!(term.input, "echo ");
        press(&mut term, KeyCode::Backspace);
        assert_eq!(term.input, "echo");
    }

    #[test]
    fn test_ctrl_c_exits() {
        let mut term = terminal();
        let flow = term.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(flow, KeyFlow::Exit);
        assert_eq!(press(&mut term, KeyCode::Char('c')), KeyFlow::Continue);
    }

    #[test]
    fn test_theme_and_reload_requests() {
        let mut term = terminal();
        type_line(&mut term, "light");
        assert_eq!(term.host.theme(), Theme::Light);

        term.host.reload();
        assert!(term.host.take_reload());
        assert!(!term.host.take_reload());

        term.reload();
        assert_eq!(term.host.theme(), Theme::Dark);
        assert_eq!(term.console.entries().len(), 2);
        assert!(term.console.history().is_empty());
    }
}
