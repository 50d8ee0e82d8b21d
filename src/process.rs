//! Process runner (C5): spawn a subprocess, capture stdout/stderr/exit code,
//! reading both streams concurrently via reader threads and a channel so
//! neither pipe can deadlock the other on backpressure.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// `(exit code, stdout, stderr)` captured from a finished subprocess.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

enum ChildEvent {
    Stdout(String),
    Stderr(String),
    Exited(std::process::ExitStatus),
}

/// Builder for a single subprocess invocation.
pub struct ProcessRunner {
    cmd: Command,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        Self { cmd, timeout: None }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    pub fn envs(mut self, vars: &HashMap<String, String>) -> Self {
        self.cmd.envs(vars);
        self
    }

    /// No timeout by default; individual checks opt in to one.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Spawns the process and blocks until it exits (or the configured
    /// timeout elapses, in which case the child is killed and an error is
    /// returned). When the process exits abnormally without a code (killed
    /// by a signal), the exit code reported is 1.
    pub fn run(mut self) -> Result<ProcessOutput> {
        let program = format!("{:?}", self.cmd.get_program());
        let child = Arc::new(Mutex::new(
            self.cmd.spawn().map_err(Error::Io)?,
        ));

        let (tx, rx) = channel();
        {
            let mut guard = child.lock().unwrap();
            if let Some(stdout) = guard.stdout.take() {
                let tx = tx.clone();
                thread::spawn(move || {
                    for line in BufReader::new(stdout).lines().map_while(std::result::Result::ok) {
                        if tx.send(ChildEvent::Stdout(line)).is_err() {
                            break;
                        }
                    }
                });
            }
            if let Some(stderr) = guard.stderr.take() {
                let tx = tx.clone();
                thread::spawn(move || {
                    for line in BufReader::new(stderr).lines().map_while(std::result::Result::ok) {
                        if tx.send(ChildEvent::Stderr(line)).is_err() {
                            break;
                        }
                    }
                });
            }
        }
        {
            let child = child.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                loop {
                    let mut guard = child.lock().unwrap();
                    match guard.try_wait() {
                        Ok(Some(status)) => {
                            let _ = tx.send(ChildEvent::Exited(status));
                            break;
                        }
                        Ok(None) => {
                            drop(guard);
                            thread::sleep(Duration::from_millis(10));
                        }
                        Err(_) => break,
                    }
                }
            });
        }
        drop(tx);

        let deadline = self.timeout.map(|d| Instant::now() + d);
        let mut output = ProcessOutput::default();
        let mut exited = false;
        loop {
            let recv_result = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    rx.recv_timeout(remaining)
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match recv_result {
                Ok(ChildEvent::Stdout(line)) => {
                    output.stdout.push_str(&line);
                    output.stdout.push('\n');
                }
                Ok(ChildEvent::Stderr(line)) => {
                    output.stderr.push_str(&line);
                    output.stderr.push('\n');
                }
                Ok(ChildEvent::Exited(status)) => {
                    output.exit_code = status.code().unwrap_or(1);
                    exited = true;
                }
                Err(RecvTimeoutError::Timeout) => {
                    let _ = child.lock().unwrap().kill();
                    return Err(Error::Timeout(program, self.timeout.unwrap()));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if exited {
                // Drain any buffered output that arrived alongside exit.
                while let Ok(event) = rx.try_recv() {
                    match event {
                        ChildEvent::Stdout(line) => {
                            output.stdout.push_str(&line);
                            output.stdout.push('\n');
                        }
                        ChildEvent::Stderr(line) => {
                            output.stderr.push_str(&line);
                            output.stderr.push('\n');
                        }
                        ChildEvent::Exited(_) => {}
                    }
                }
                break;
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let output = ProcessRunner::new("sh")
            .args(["-c", "echo hello"])
            .run()
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn captures_nonzero_exit_code() {
        let output = ProcessRunner::new("sh").args(["-c", "exit 7"]).run().unwrap();
        assert_eq!(output.exit_code, 7);
        assert!(!output.success());
    }

    #[test]
    fn captures_stderr_separately_from_stdout() {
        let output = ProcessRunner::new("sh")
            .args(["-c", "echo out; echo err 1>&2"])
            .run()
            .unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn timeout_kills_long_running_process() {
        let result = ProcessRunner::new("sh")
            .args(["-c", "sleep 5"])
            .timeout(Duration::from_millis(50))
            .run();
        assert!(matches!(result, Err(Error::Timeout(_, _))));
    }
}
