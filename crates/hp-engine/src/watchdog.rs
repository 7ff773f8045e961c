use crate::ResourceMonitor;
use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

/// Background thread that polls a [`ResourceMonitor`] so time and memory limits trip even while
/// the computation is busy between safe points.
///
/// The thread exits as soon as the monitor reports a pending interrupt (the flag is sticky, so
/// there is nothing left to watch) or the watchdog is stopped. Dropping the watchdog stops and
/// joins the thread.
#[derive(Debug)]
pub struct Watchdog {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    pub fn spawn(monitor: Arc<ResourceMonitor>, poll_interval: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = stop.clone();
            thread::Builder::new()
                .name("hp-watchdog".into())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        if monitor.poll() {
                            log::trace!("watchdog observed {:?}", monitor.flag().reason());
                            break;
                        }
                        thread::park_timeout(poll_interval);
                    }
                })?
        };
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            handle.thread().unpark();
            if handle.join().is_err() {
                log::error!("watchdog thread panicked");
            }
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.shutdown();
    }
}
