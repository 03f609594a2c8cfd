//! Wire format between the Rust parent and the Python guest: a 4-byte
//! big-endian length prefix followed by a UTF-8 JSON frame (spec.md
//! §4.5). This is a deliberate simplification of
//! `casparian_worker::bridge`'s Arrow-IPC/sentinel-signal protocol: the
//! guest here returns one small `{type, value}` capture plus sideband
//! log/SQL-request messages, never columnar batches, so one JSON frame
//! shape covers every message instead of a binary format plus signal
//! constants.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuestMessage {
    /// Sideband stdout/stderr/log line.
    Log { level: String, message: String },
    /// A blocking `sql(query)` call made from guest code.
    SqlRequest { id: u64, query: String },
    /// Guest code ran to completion. `capture` is the `{type, value}`
    /// shape if a result variable was found, `None` otherwise.
    Done {
        capture: Option<JsonValue>,
        stdout: String,
        stdout_truncated: bool,
    },
    /// Validation (import allow-list / AST check) failed inside the
    /// guest's own re-validation pass.
    Rejected { message: String },
    /// An unhandled exception escaped guest code.
    Faulted { message: String, traceback: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostMessage {
    /// Sent once, immediately after accepting the guest's connection:
    /// the code to run, the dataset context, and the deadline the guest
    /// should enforce on itself in the cooperative strategy.
    Start {
        code: String,
        datasets: JsonValue,
        allowed_imports: Vec<String>,
        deadline_ms: u64,
        stdout_cap_bytes: usize,
    },
    /// Reply to a `SqlRequest`, matched by `id`.
    SqlResponse {
        id: u64,
        ok: bool,
        rows: Vec<JsonValue>,
        error: Option<String>,
    },
}

pub fn write_frame<W: Write>(writer: &mut W, message: &HostMessage) -> io::Result<()> {
    let payload = serde_json::to_vec(message)?;
    writer.write_all(&(payload.len() as u32).to_be_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()
}

/// Read one frame, or `Ok(None)` on clean EOF.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<GuestMessage>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds maximum {}", len, MAX_FRAME_BYTES),
        ));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    let message = serde_json::from_slice(&payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_sql_response_frame() {
        let msg = HostMessage::SqlResponse {
            id: 7,
            ok: true,
            rows: vec![serde_json::json!({"id": 1})],
            error: None,
        };
        let mut buf = Vec::new();
        write_frame(&mut buf, &msg).unwrap();

        // Not a GuestMessage, but exercises the same framing for a
        // GuestMessage payload written by hand.
        let guest = GuestMessage::Done {
            capture: Some(serde_json::json!({"type": "scalar", "value": 1})),
            stdout: String::new(),
            stdout_truncated: false,
        };
        let mut guest_buf = Vec::new();
        let payload = serde_json::to_vec(&guest).unwrap();
        guest_buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        guest_buf.extend_from_slice(&payload);

        let mut cursor = Cursor::new(guest_buf);
        let read_back = read_frame(&mut cursor).unwrap().unwrap();
        match read_back {
            GuestMessage::Done { capture, .. } => {
                assert_eq!(capture, Some(serde_json::json!({"type": "scalar", "value": 1})));
            }
            _ => panic!("expected Done"),
        }
    }

    #[test]
    fn empty_stream_reads_as_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }
}
