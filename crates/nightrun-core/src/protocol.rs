//! Wire format for handing frame snapshots to an out-of-process HUD and
//! receiving intents back: a 1-byte type tag followed by a MessagePack payload.

use serde::{Deserialize, Serialize};

use crate::events::RaceEvent;
use crate::input::FrameInputs;
use crate::stats::FrameStats;

/// Maximum message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // 64 KiB

/// Type tag of a wire message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Frame = 0x01,
    Intents = 0x02,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(Self::Frame),
            0x02 => Some(Self::Intents),
            _ => None,
        }
    }
}

/// End-of-frame snapshot plus the events raised during the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    pub frame: u64,
    pub stats: FrameStats,
    pub events: Vec<RaceEvent>,
}

#[derive(Debug)]
pub enum ProtocolError {
    EmptyMessage,
    UnknownMessageType(u8),
    UnexpectedMessageType(MessageType),
    PayloadTooLarge(usize),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnknownMessageType(b) => write!(f, "unknown message type: 0x{b:02x}"),
            Self::UnexpectedMessageType(t) => write!(f, "unexpected message type: {t:?}"),
            Self::PayloadTooLarge(size) => {
                write!(
                    f,
                    "payload too large: {size} bytes (max {MAX_MESSAGE_SIZE})"
                )
            },
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

fn encode_message<T: Serialize>(msg_type: MessageType, payload: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload_bytes =
        rmp_serde::to_vec(payload).map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    let total = 1 + payload_bytes.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge(total));
    }
    let mut buf = Vec::with_capacity(total);
    buf.push(msg_type as u8);
    buf.extend_from_slice(&payload_bytes);
    Ok(buf)
}

fn decode_message<T: for<'de> Deserialize<'de>>(
    data: &[u8],
    expected: MessageType,
) -> Result<T, ProtocolError> {
    let msg_type = decode_message_type(data)?;
    if msg_type != expected {
        return Err(ProtocolError::UnexpectedMessageType(msg_type));
    }
    rmp_serde::from_slice(&data[1..]).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

/// Extract the message type byte from raw wire data.
pub fn decode_message_type(data: &[u8]) -> Result<MessageType, ProtocolError> {
    let Some(&first) = data.first() else {
        return Err(ProtocolError::EmptyMessage);
    };
    MessageType::from_byte(first).ok_or(ProtocolError::UnknownMessageType(first))
}

pub fn encode_frame(msg: &FrameMessage) -> Result<Vec<u8>, ProtocolError> {
    encode_message(MessageType::Frame, msg)
}

pub fn decode_frame(data: &[u8]) -> Result<FrameMessage, ProtocolError> {
    decode_message(data, MessageType::Frame)
}

pub fn encode_intents(inputs: &FrameInputs) -> Result<Vec<u8>, ProtocolError> {
    encode_message(MessageType::Intents, inputs)
}

pub fn decode_intents(data: &[u8]) -> Result<FrameInputs, ProtocolError> {
    decode_message(data, MessageType::Intents)
}
