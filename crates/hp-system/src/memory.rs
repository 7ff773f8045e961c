use std::sync::Mutex;
use sysinfo::{Pid, ProcessExt, ProcessRefreshKind, System, SystemExt};

/// Samples how much memory something is currently using.
///
/// Implementations are called from the watchdog thread, never from the computation itself.
pub trait MemoryProbe: Send + Sync {
    /// Resident memory in bytes, or `None` if it could not be measured.
    fn resident_bytes(&self) -> Option<u64>;
}

/// Resident set size of the current process.
///
/// # OS-specific behavior
///
/// Backed by `sysinfo`. On platforms it does not support, every sample is `None` and a memory
/// limit never trips.
#[derive(Debug)]
pub struct ProcessMemory {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessMemory {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                log::warn!("memory limits unavailable: {err}");
                None
            }
        };
        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemory {
    fn resident_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock().expect("unpoisoned");
        if !system.refresh_process_specifics(pid, ProcessRefreshKind::new()) {
            return None;
        }
        system.process(pid).map(|process| process.memory())
    }
}

/// A probe that never measures anything. Memory limits configured against it never trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn resident_bytes(&self) -> Option<u64> {
        None
    }
}
