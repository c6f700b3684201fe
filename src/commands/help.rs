//! Help text, completion vocabulary and the console's canned output

/// Vocabulary used for tab completion, in match priority order
pub const KNOWN_COMMANDS: &[&str] = &[
    "start", "stop", "help", "clear", "ping", "sys", "time", "whoami", "light", "dark", "reboot",
    "history", "ls", "echo", "matrix", "speedtest", "fast",
];

/// Commands that take an argument get a trailing space when completed
const TAKES_ARGUMENT: &[&str] = &["start", "echo"];

/// Complete a partially typed command against the vocabulary
pub fn complete_command(input: &str) -> Option<String> {
    let current = input.trim().to_lowercase();
    if current.is_empty() {
        return None;
    }

    let matched = KNOWN_COMMANDS.iter().find(|cmd| cmd.starts_with(&current))?;
    if TAKES_ARGUMENT.contains(matched) {
        Some(format!("{matched} "))
    } else {
        Some(matched.to_string())
    }
}

/// Returns the help text for all console commands
pub fn get_help_text() -> String {
    String::from(
        "AVAILABLE MODULES:
------------------
  start [size]  : Start wasting (e.g., start 1gb)
  stop          : Halt current operation
  speedtest     : Run 10s download speed test
  ping          : Check network latency
  sys / info    : View full device/network specs
  time          : Show local and UTC time
  ls            : List directory contents
  echo [text]   : Print text to console
  history       : Show command history
  reboot        : Restart application
  clear         : Clear screen and buffer
  light / dark  : Toggle interface theme",
    )
}

pub fn whoami_text() -> &'static str {
    "USER: SENSEI_INITIATE\nACCESS: LEVEL 1 (GUEST)\nMISSION: DATA_PURGE"
}

pub fn listing_text() -> &'static str {
    "permissions  user   size   date       name
drwx------   sensei 4096   Jan 01     .config/
-rwxr-xr-x   root   14KB   Jan 02     waster_core.sh
-rw-r--r--   sensei 500MB  Jan 03     temp_buffer.bin
-rwxr-xr-x   sensei 1.2KB  Jan 04     network_killswitch.py"
}

pub fn matrix_text() -> &'static str {
    "The Matrix is everywhere. It is all around us."
}
