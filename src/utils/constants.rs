/// Overseer constants: timings, thresholds and display markers

use std::time::Duration;

/// Minimum delay between two polls of the same host
pub const POLL_BASE_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound (exclusive) of the random delay added to every poll
pub const POLL_JITTER: Duration = Duration::from_secs(2);

/// Delay between two poller starts, keeps SSH handshakes from piling up
pub const POLLER_START_STAGGER: Duration = Duration::from_millis(500);

/// Render cadence (4 frames per second)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Default SSH `ConnectTimeout`
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default deadline for a whole collection call
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(7);

pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
pub const DEFAULT_SSH_USER: &str = "root";
pub const DEFAULT_AGENT_SCRIPT: &str = "agent.sh";

/// Display name of a host that has not answered yet
pub const SCANNING_MARKER: &str = "SCANNING...";

/// Display name of a host whose transport failed
pub const UNREACHABLE_MARKER: &str = "UNREACHABLE";

/// Shown in place of metrics for hosts that are not online
pub const PLACEHOLDER: &str = "—";

/// Remote payload layout: name|cpu|ram|temp|disk|vm|ct|uptime
pub const PAYLOAD_DELIMITER: char = '|';
pub const PAYLOAD_MIN_FIELDS: usize = 8;

/// Upstream cpu figure is reported in tenths of the displayed percentage
pub const CPU_SCALE: f64 = 10.0;

/// Number of segments in a usage bar
pub const BAR_SEGMENTS: u8 = 10;

/// Green/yellow boundaries: a value below `warn` is green, below `crit` yellow,
/// anything else red.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warn: f64,
    pub crit: f64,
}

pub const CPU_THRESHOLDS: Thresholds = Thresholds { warn: 50.0, crit: 80.0 };
pub const RAM_THRESHOLDS: Thresholds = Thresholds { warn: 60.0, crit: 90.0 };
pub const TEMP_THRESHOLDS: Thresholds = Thresholds { warn: 60.0, crit: 80.0 };
pub const DISK_THRESHOLDS: Thresholds = Thresholds { warn: 70.0, crit: 90.0 };

/// Environment variables read on top of the config file
pub const ENV_HOSTS: &str = "OVERSEER_HOSTS";
pub const ENV_SSH_USER: &str = "OVERSEER_SSH_USER";
pub const ENV_LOG_FILTER: &str = "OVERSEER_LOG";

pub const HEADER: &str = r#"
   ▄██████▄  ▄█    █▄     ▄████████    ▄████████
  ███    ███ ███    ███   ███    ███   ███    ███
  ███    ███ ███    ███   ███    █▀    ███    ███
  ███    ███ ███    ███  ▄███▄▄▄      ▄███▄▄▄▄██▀
  ███    ███ ███    ███ ▀▀███▀▀▀     ▀▀███▀▀▀▀▀
  ███    ███ ███    ███   ███    █▄  ▀███████████
   ▀██████▀   ▀██████▀    ██████████   ███    ███
"#;
