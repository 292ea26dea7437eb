use log::LevelFilter;
use web_time::Duration;

const CPU_THINK_MS: u64 = 500;
const CPU_SETTLE_MS: u64 = 250;
const PASS_NOTICE_MS: u64 = 1000;

/// Artificial pauses that pace the CPU turn and pass notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Before the CPU places a stone.
    pub cpu_think: Duration,
    /// After the CPU placed a stone, before the human may act.
    pub cpu_settle: Duration,
    /// How long a pass notice stays up before the turn moves on.
    pub pass_notice: Duration,
}

impl Pacing {
    /// No pauses at all; every scheduled step is due immediately.
    pub fn instant() -> Self {
        Self {
            cpu_think: Duration::ZERO,
            cpu_settle: Duration::ZERO,
            pass_notice: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            cpu_think: Duration::from_millis(CPU_THINK_MS),
            cpu_settle: Duration::from_millis(CPU_SETTLE_MS),
            pass_notice: Duration::from_millis(PASS_NOTICE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fonts {
    pub preferred: &'static str,
    pub fallback: &'static str,
    pub status_px: u32,
    pub dialog_px: u32,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            preferred: "MS Gothic",
            fallback: "sans-serif",
            status_px: 24,
            dialog_px: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pacing: Pacing,
    pub fonts: Fonts,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            fonts: Fonts::default(),
            log_level: LevelFilter::Info,
        }
    }
}
