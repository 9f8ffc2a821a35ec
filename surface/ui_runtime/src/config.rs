use std::str::FromStr;
use std::time::Duration;

use crate::layout::Viewport;

pub const VIEWPORT_WIDTH_VAR: &str = "SURFACE_VIEWPORT_WIDTH";
pub const VIEWPORT_HEIGHT_VAR: &str = "SURFACE_VIEWPORT_HEIGHT";
pub const SOURCE_VAR: &str = "SURFACE_SOURCE";
pub const INBOUND_QUEUE_CAP_VAR: &str = "SURFACE_INBOUND_QUEUE_CAP";
pub const OUTBOUND_QUEUE_CAP_VAR: &str = "SURFACE_OUTBOUND_QUEUE_CAP";
pub const DEMO_TICKS_VAR: &str = "SURFACE_DEMO_TICKS";
pub const DEMO_INTERVAL_MS_VAR: &str = "SURFACE_DEMO_INTERVAL_MS";

const DEFAULT_INBOUND_QUEUE_CAP: usize = 64;
const DEFAULT_OUTBOUND_QUEUE_CAP: usize = 16;
const DEFAULT_DEMO_TICKS: u64 = 5;
const DEFAULT_DEMO_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// Length-prefixed envelopes on stdin.
    #[default]
    Stdio,
    /// The built-in dashboard script.
    Demo,
}

impl FromStr for SourceKind {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "demo" => Ok(Self::Demo),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub viewport: Viewport,
    pub source: SourceKind,
    pub inbound_queue_cap: usize,
    pub outbound_queue_cap: usize,
    /// Demo update rounds; zero runs until stopped.
    pub demo_ticks: u64,
    pub demo_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            source: SourceKind::default(),
            inbound_queue_cap: DEFAULT_INBOUND_QUEUE_CAP,
            outbound_queue_cap: DEFAULT_OUTBOUND_QUEUE_CAP,
            demo_ticks: DEFAULT_DEMO_TICKS,
            demo_interval: Duration::from_millis(DEFAULT_DEMO_INTERVAL_MS),
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable lookup. Missing, unparsable or
    /// out-of-range values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |name: &str| lookup(name).map(|raw| raw.trim().to_string());

        let width = parse(VIEWPORT_WIDTH_VAR)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(defaults.viewport.width);
        let height = parse(VIEWPORT_HEIGHT_VAR)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(defaults.viewport.height);

        Self {
            viewport: Viewport { width, height },
            source: parse(SOURCE_VAR)
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.source),
            inbound_queue_cap: parse(INBOUND_QUEUE_CAP_VAR)
                .and_then(|raw| raw.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.inbound_queue_cap),
            outbound_queue_cap: parse(OUTBOUND_QUEUE_CAP_VAR)
                .and_then(|raw| raw.parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.outbound_queue_cap),
            demo_ticks: parse(DEMO_TICKS_VAR)
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or(defaults.demo_ticks),
            demo_interval: parse(DEMO_INTERVAL_MS_VAR)
                .and_then(|raw| raw.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.demo_interval),
        }
    }
}
