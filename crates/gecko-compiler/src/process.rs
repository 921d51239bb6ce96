//! Bounded child process execution.
//!
//! A child runs with stdout and stderr captured into one buffer. It is
//! killed when it outlives its timeout or when the [`CancelToken`] fires;
//! either way the output collected so far is returned rather than an error.
//! Readers still blocked on pipes inherited by grandchildren are detached
//! once a short grace period has passed.

use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::CancelToken;
use crate::error::{BuildError, BuildResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// How long readers may keep draining after the child is killed.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

/// Captured result of one child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub termination: Termination,
    /// Interleaved stdout and stderr.
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        matches!(self.termination, Termination::Exited(status) if status.success())
    }
}

/// Run `program` to completion, within `timeout`.
pub fn run(
    program: &Path,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
    cancel: &CancelToken,
) -> BuildResult<ProcessOutput> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| BuildError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let readers: Vec<_> = [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
    ]
    .into_iter()
    .flatten()
    .map(|stream| {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || drain(stream, &buffer))
    })
    .collect();

    let started = Instant::now();
    let termination = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Termination::Exited(status),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Failed to poll \"{}\": {e}", program.display());
            }
        }
        if cancel.is_cancelled() {
            log::warn!("Process \"{}\" was interrupted; killing process", program.display());
            stop(&mut child);
            break Termination::Interrupted;
        }
        if started.elapsed() >= timeout {
            log::warn!(
                "Process \"{}\" life time exceeded timeout duration {}s; killing process",
                program.display(),
                timeout.as_secs()
            );
            stop(&mut child);
            break Termination::TimedOut;
        }
        thread::sleep(POLL_INTERVAL);
    };

    match termination {
        Termination::Exited(_) => {
            for reader in readers {
                let _ = reader.join();
            }
        }
        // A grandchild may still hold the pipes open after the kill.
        Termination::TimedOut | Termination::Interrupted => {
            let deadline = Instant::now() + DRAIN_GRACE;
            while readers.iter().any(|r| !r.is_finished()) && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
    let bytes = match Arc::try_unwrap(buffer) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(shared) => shared
            .lock()
            .map(|b| b.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()),
    };

    Ok(ProcessOutput {
        termination,
        output: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn drain(mut stream: Box<dyn Read + Send>, buffer: &Mutex<Vec<u8>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut shared = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                shared.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

fn stop(child: &mut std::process::Child) {
    if let Err(e) = child.kill() {
        log::warn!("Failed to kill child process: {e}");
    }
    let _ = child.wait();
}
