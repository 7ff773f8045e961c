use crate::logger::LogTarget;
use clap::Parser;
use hp_protocol::Config;
use std::path::PathBuf;

/// Solve a pigeonhole formula under time, memory and step limits.
///
/// Ctrl+C stops the solve at its next safe point.
#[derive(Debug, Parser)]
#[command(name = "haltpoint", version)]
pub struct Args {
    /// Number of pigeons
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub pigeons: u32,

    /// Number of holes [default: pigeons - 1]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub holes: Option<u32>,

    /// Wall-clock limit in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_limit: Option<u64>,

    /// Resident memory limit in MiB
    #[arg(long, value_name = "MB")]
    pub memory_limit: Option<u64>,

    /// Budget of resource units (one per safe point)
    #[arg(long, value_name = "N")]
    pub step_limit: Option<u64>,

    /// How often the watchdog samples time and memory, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// TOML config file; command line flags override its values
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// One of error, warn, info, debug or trace
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogTarget::Stderr)]
    pub log_target: LogTarget,

    /// Log file used with `--log-target file`
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn holes(&self) -> u32 {
        self.holes.unwrap_or(self.pigeons.saturating_sub(1).max(1))
    }

    /// Overrides the config file's values with the ones given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ms) = self.time_limit {
            config.limits.time_ms = Some(ms);
        }
        if let Some(mb) = self.memory_limit {
            config.limits.memory_mb = Some(mb);
        }
        if let Some(steps) = self.step_limit {
            config.limits.steps = Some(steps);
        }
        if let Some(ms) = self.poll_interval {
            config.watchdog.poll_interval_ms = ms;
        }
    }
}
