//! The sandbox entry point: validate, spawn a Python guest process,
//! stream the TCP protocol, and reduce whatever happens into a
//! [`SandboxOutcome`] (spec.md §4.5). Grounded on
//! `casparian_worker::bridge::execute_bridge`'s shape (bind a TCP
//! listener, spawn the guest, accept with a connect timeout, read
//! frames until EOF/terminal signal, reap the process) with the
//! isolated/cooperative timeout split from
//! `original_source/core/code_executor.py`'s
//! `_execute_with_multiprocessing`/`_execute_with_threading` pair.

use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::context::{ExecutionContext, ExecutionStrategy};
use crate::error::SandboxError;
use crate::policy::{validate_syntax_and_imports, ALLOWED_IMPORTS};
use crate::protocol::{read_frame, write_frame, GuestMessage, HostMessage};
use crate::sql_bridge::SqlBridge;
use crate::state::{SandboxOutcome, SandboxState};

const SHIM_SOURCE: &str = include_str!("shim/sandbox_shim.py");

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Extra time given to a cooperative guest beyond its own deadline
/// before the host stops waiting for it (spec.md: "cannot preempt").
const COOPERATIVE_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub python_interpreter: PathBuf,
    pub timeout: Duration,
    pub stdout_cap_bytes: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python_interpreter: PathBuf::from("python3"),
            timeout: Duration::from_secs(30),
            stdout_cap_bytes: 64 * 1024,
        }
    }
}

pub struct SandboxExecutor {
    config: SandboxConfig,
    sql_bridge: Arc<dyn SqlBridge>,
}

impl SandboxExecutor {
    pub fn new(config: SandboxConfig, sql_bridge: Arc<dyn SqlBridge>) -> Self {
        Self { config, sql_bridge }
    }

    /// Run one piece of guest code. Never panics; every failure path
    /// funnels through a terminal [`SandboxState`] turned into a typed
    /// error by [`SandboxOutcome::into_result`].
    pub fn execute(
        &self,
        code: &str,
        context: &ExecutionContext,
    ) -> Result<SandboxOutcome, SandboxError> {
        if let Err(SandboxError::Validation(msg)) = validate_syntax_and_imports(code) {
            return SandboxOutcome::rejected(msg).into_result();
        }

        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();

        let mut child = self.spawn_guest(port)?;

        let stream = match self.accept_with_timeout(&listener, &mut child) {
            Ok(s) => s,
            Err(e) => {
                kill(&mut child);
                return SandboxOutcome::faulted(e.to_string()).into_result();
            }
        };

        let outcome = self.run_protocol(stream, &mut child, code, context);

        match context.strategy {
            ExecutionStrategy::Isolated => {
                kill(&mut child);
            }
            ExecutionStrategy::Cooperative => {
                // Don't forcibly reclaim it; just don't block this call
                // waiting for an exit that may never come promptly.
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
        }

        outcome.into_result()
    }

    fn spawn_guest(&self, port: u16) -> Result<Child, SandboxError> {
        let shim_path = materialize_shim()?;

        let mut cmd = Command::new(&self.config.python_interpreter);
        cmd.arg(&shim_path)
            .env("NLQ_SANDBOX_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = cmd.spawn().map_err(SandboxError::Spawn)?;
        info!(pid = child.id(), port, "spawned sandbox guest process");
        Ok(child)
    }

    fn accept_with_timeout(
        &self,
        listener: &TcpListener,
        child: &mut Child,
    ) -> Result<TcpStream, SandboxError> {
        listener.set_nonblocking(true)?;
        let start = Instant::now();
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false)?;
                    return Ok(stream);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(SandboxError::Io(e)),
            }

            if let Ok(Some(status)) = child.try_wait() {
                return Err(SandboxError::Faulted(format!(
                    "guest exited with {} before connecting",
                    status
                )));
            }

            if start.elapsed() >= CONNECT_TIMEOUT {
                return Err(SandboxError::Timeout(CONNECT_TIMEOUT));
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    fn run_protocol(
        &self,
        mut stream: TcpStream,
        child: &mut Child,
        code: &str,
        context: &ExecutionContext,
    ) -> SandboxOutcome {
        let datasets_json = serde_json::Value::Object(
            context
                .datasets
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        let deadline_ms = self.config.timeout.as_millis() as u64;
        let start_msg = HostMessage::Start {
            code: code.to_string(),
            datasets: datasets_json,
            allowed_imports: ALLOWED_IMPORTS.iter().map(|s| s.to_string()).collect(),
            deadline_ms,
            stdout_cap_bytes: self.config.stdout_cap_bytes,
        };

        if let Err(e) = write_frame(&mut stream, &start_msg) {
            return SandboxOutcome::faulted(format!("failed to send start frame: {}", e));
        }

        let read_deadline = match context.strategy {
            ExecutionStrategy::Isolated => self.config.timeout,
            ExecutionStrategy::Cooperative => self.config.timeout + COOPERATIVE_GRACE,
        };
        if let Err(e) = stream.set_read_timeout(Some(Duration::from_millis(250))) {
            warn!(error = %e, "could not set sandbox read timeout");
        }

        let mut reader = BufReader::new(stream.try_clone().expect("tcp stream clone"));
        let start = Instant::now();

        loop {
            if start.elapsed() >= read_deadline {
                return SandboxOutcome::timed_out(format!(
                    "guest did not complete within {:?}",
                    self.config.timeout
                ));
            }

            match read_frame(&mut reader) {
                Ok(Some(GuestMessage::Log { level, message })) => {
                    debug!(level = %level, guest_message = %message, "sandbox guest log");
                }
                Ok(Some(GuestMessage::SqlRequest { id, query })) => {
                    let response = match self.sql_bridge.query(&query) {
                        Ok(rows) => HostMessage::SqlResponse {
                            id,
                            ok: true,
                            rows,
                            error: None,
                        },
                        Err(message) => HostMessage::SqlResponse {
                            id,
                            ok: false,
                            rows: Vec::new(),
                            error: Some(message),
                        },
                    };
                    if let Err(e) = write_frame(&mut stream, &response) {
                        return SandboxOutcome::faulted(format!(
                            "failed to send sql response: {}",
                            e
                        ));
                    }
                }
                Ok(Some(GuestMessage::Done {
                    capture,
                    stdout,
                    stdout_truncated,
                })) => {
                    return SandboxOutcome::done(capture, stdout, stdout_truncated);
                }
                Ok(Some(GuestMessage::Rejected { message })) => {
                    return SandboxOutcome::rejected(message);
                }
                Ok(Some(GuestMessage::Faulted { message, traceback })) => {
                    return SandboxOutcome::faulted(format!("{}\n{}", message, traceback));
                }
                Ok(None) => {
                    return SandboxOutcome::faulted(
                        "guest closed the connection without a result".to_string(),
                    );
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    if let Ok(Some(status)) = child.try_wait() {
                        return SandboxOutcome::faulted(format!(
                            "guest exited with {} without a result",
                            status
                        ));
                    }
                    continue;
                }
                Err(e) => {
                    return SandboxOutcome::faulted(format!("sandbox protocol error: {}", e));
                }
            }
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Write the embedded guest shim to a temp file so the interpreter can
/// run it as a script; re-materialized per process (the shim is small,
/// unlike the teacher's versioned `~/.casparian_flow/shim` cache).
fn materialize_shim() -> Result<PathBuf, SandboxError> {
    let mut path = std::env::temp_dir();
    path.push(format!("nlq_sandbox_shim_{}.py", std::process::id()));
    std::fs::write(&path, SHIM_SOURCE)?;
    Ok(path)
}
