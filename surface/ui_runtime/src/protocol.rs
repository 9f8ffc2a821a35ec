use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::{self, Read, Write};
use std::ops::ControlFlow;
use std::sync::mpsc::Receiver;

use crate::error::StreamError;
use crate::model::{ComponentNode, lenient};
use crate::sequencer::{ConnectionState, Snapshot};

pub const INBOUND_FRAME_CAP: usize = 1_048_576;
pub const OUTBOUND_FRAME_CAP: usize = 4_194_304;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    Heartbeat,
    SurfaceUpdate,
    DataModelUpdate,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heartbeat => "heartbeat",
            Self::SurfaceUpdate => "surfaceUpdate",
            Self::DataModelUpdate => "dataModelUpdate",
        };
        f.write_str(name)
    }
}

/// One unit of the ordered inbound stream. The payload is kept raw until
/// [`Envelope::decode`] so a bad payload can be attributed to its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: i64,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(kind: MessageKind, timestamp: i64, payload: Value) -> Self {
        Self {
            kind,
            timestamp,
            payload,
        }
    }

    pub fn decode(self) -> Result<Message, StreamError> {
        let kind = self.kind;

        match kind {
            // Liveness info is free-form; whatever cannot be read is left empty.
            MessageKind::Heartbeat => {
                let beat: HeartbeatPayload =
                    serde_json::from_value(self.payload).unwrap_or_default();
                Ok(Message::Heartbeat(Liveness {
                    timestamp: self.timestamp,
                    status: beat.status.unwrap_or_default(),
                    latency: beat.latency,
                }))
            }
            MessageKind::SurfaceUpdate => serde_json::from_value(self.payload)
                .map(Message::SurfaceUpdate)
                .map_err(|source| StreamError::Payload { kind, source }),
            // A patch that cannot be read is a patch that fails closed.
            MessageKind::DataModelUpdate => Ok(Message::DataModelUpdate(
                serde_json::from_value(self.payload).unwrap_or_default(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Heartbeat(Liveness),
    SurfaceUpdate(SurfaceUpdate),
    DataModelUpdate(DataModelUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    pub surface_id: String,
    pub root: ComponentNode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModelUpdate {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Default, Deserialize)]
struct HeartbeatPayload {
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    latency: Option<String>,
}

/// Last heartbeat seen on the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Liveness {
    pub timestamp: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
}

/// Frames written to the presentation side.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t")]
pub enum HostFrame {
    #[serde(rename = "status")]
    Status {
        state: ConnectionState,
        #[serde(skip_serializing_if = "Option::is_none")]
        liveness: Option<Liveness>,
    },
    #[serde(rename = "snapshot")]
    Snapshot(Snapshot),
}

/// Reads frames until EOF, handing each decoded envelope to `on_envelope`.
/// The callback may break to stop reading early.
pub fn reader_loop<R, F>(mut reader: R, mut on_envelope: F) -> Result<(), StreamError>
where
    R: Read,
    F: FnMut(Envelope) -> ControlFlow<()>,
{
    while let Some(payload) = read_frame(&mut reader, INBOUND_FRAME_CAP)? {
        let envelope = decode_envelope(&payload)?;
        if on_envelope(envelope).is_break() {
            break;
        }
    }

    Ok(())
}

pub fn writer_loop<W: Write>(mut writer: W, rx: Receiver<HostFrame>) -> io::Result<()> {
    for frame in rx {
        let payload = encode_frame(&frame)?;
        write_frame(&mut writer, &payload, OUTBOUND_FRAME_CAP)?;
        writer.flush()?;
    }

    Ok(())
}

pub fn encode_frame(frame: &HostFrame) -> io::Result<Vec<u8>> {
    serde_json::to_vec(frame).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

pub fn decode_envelope(payload: &[u8]) -> Result<Envelope, StreamError> {
    serde_json::from_slice(payload).map_err(StreamError::Envelope)
}

/// Reads one length-prefixed frame. `None` means the stream ended cleanly
/// on a frame boundary.
pub fn read_frame(reader: &mut impl Read, max_payload: usize) -> Result<Option<Vec<u8>>, StreamError> {
    let mut len_buf = [0_u8; 4];
    let mut filled = 0;

    while filled < len_buf.len() {
        match reader.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err.into()),
        }
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_payload {
        return Err(StreamError::FrameTooLarge {
            len,
            max: max_payload,
        });
    }

    let mut payload = vec![0_u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

pub fn write_frame(writer: &mut impl Write, payload: &[u8], max_payload: usize) -> io::Result<()> {
    if payload.len() > max_payload {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} > {}", payload.len(), max_payload),
        ));
    }

    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "payload exceeds u32"))?;

    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    Ok(())
}
