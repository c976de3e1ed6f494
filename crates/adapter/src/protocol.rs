//! Protocol module - JSON message types for the host bridge
//!
//! One JSON object per line, discriminated by `type`. The host sends commands
//! and input; the engine pushes frames and notifications as they happen.

use serde::{Deserialize, Serialize};

use crate::input::{TouchEvent, TouchPhase};
use crate::types::{Color, InputEvent};

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Host -> Engine Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhaseWire {
    Start,
    Move,
    End,
    Cancel,
}

impl From<TouchPhaseWire> for TouchPhase {
    fn from(phase: TouchPhaseWire) -> Self {
        match phase {
            TouchPhaseWire::Start => TouchPhase::Start,
            TouchPhaseWire::Move => TouchPhase::Move,
            TouchPhaseWire::End => TouchPhase::End,
            TouchPhaseWire::Cancel => TouchPhase::Cancel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Start,
    Stop,
    SetPaused {
        paused: bool,
    },
    /// Start-or-pause button
    Toggle,
    /// Held input. Either a raw bitmask or a list of names, or both (OR-ed).
    Input {
        #[serde(default)]
        events: u8,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        names: Vec<String>,
    },
    Touch {
        phase: TouchPhaseWire,
        #[serde(default)]
        touches: usize,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    TriggerRender,
}

impl HostMessage {
    /// Input mask carried by an `input` message.
    pub fn input_event(events: u8, names: &[String]) -> Result<InputEvent, ErrorMessage> {
        let mut event = InputEvent::from_bits_truncate(events);
        for name in names {
            match InputEvent::from_name(name) {
                Some(bit) => event.insert(bit),
                None => {
                    return Err(ErrorMessage::new(
                        ErrorCode::InvalidInput,
                        format!("unknown input '{name}'"),
                    ))
                }
            }
        }
        Ok(event)
    }

    pub fn touch_event(phase: TouchPhaseWire, touches: usize, x: f32, y: f32) -> TouchEvent {
        TouchEvent {
            phase: phase.into(),
            touches,
            x,
            y,
        }
    }
}

// ============== Engine -> Host Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidMessage,
    InvalidInput,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ErrorMessage> for EngineMessage {
    fn from(err: ErrorMessage) -> Self {
        EngineMessage::Error {
            code: err.code,
            message: err.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    Welcome {
        protocol_version: String,
        board: Size,
        preview: Size,
    },
    /// Row-major `0xRRGGBB` cells, 0 = empty
    Render {
        width: usize,
        height: usize,
        cells: Vec<Color>,
    },
    /// Row-major occupancy (0/1). 0x0 when there is nothing to preview.
    NextPiece {
        width: usize,
        height: usize,
        cells: Vec<u8>,
        color: Color,
    },
    Started,
    PausedChanged {
        paused: bool,
    },
    GameOver,
    LinesChanged {
        lines: u32,
    },
    LevelChanged {
        level: u32,
    },
    ScoreChanged {
        score: u32,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl EngineMessage {
    pub fn welcome(board: (usize, usize), preview: (usize, usize)) -> Self {
        Self::Welcome {
            protocol_version: PROTOCOL_VERSION.to_string(),
            board: Size {
                width: board.0,
                height: board.1,
            },
            preview: Size {
                width: preview.0,
                height: preview.1,
            },
        }
    }

    pub fn next_piece(width: usize, height: usize, cells: &[bool], color: Color) -> Self {
        Self::NextPiece {
            width,
            height,
            cells: cells.iter().map(|&c| c as u8).collect(),
            color,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

/// Parse one line from the host.
///
/// Malformed JSON and well-formed JSON that is not a known message are reported
/// with different codes.
pub fn parse_host_message(line: &str) -> Result<HostMessage, ErrorMessage> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| ErrorMessage::new(ErrorCode::InvalidJson, e.to_string()))?;
    serde_json::from_value(value)
        .map_err(|e| ErrorMessage::new(ErrorCode::InvalidMessage, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_messages() {
        assert_eq!(parse_host_message(r#"{"type":"start"}"#), Ok(HostMessage::Start));
        assert_eq!(
            parse_host_message(r#"{"type":"set_paused","paused":true}"#),
            Ok(HostMessage::SetPaused { paused: true })
        );
        assert_eq!(
            parse_host_message(r#"{"type":"input","events":5}"#),
            Ok(HostMessage::Input {
                events: 5,
                names: Vec::new()
            })
        );
        assert_eq!(
            parse_host_message(r#"{"type":"touch","phase":"start","touches":2,"x":1.5,"y":3}"#),
            Ok(HostMessage::Touch {
                phase: TouchPhaseWire::Start,
                touches: 2,
                x: 1.5,
                y: 3.0
            })
        );
    }

    #[test]
    fn distinguishes_bad_json_from_unknown_messages() {
        assert_eq!(
            parse_host_message("{not json").unwrap_err().code,
            ErrorCode::InvalidJson
        );
        assert_eq!(
            parse_host_message(r#"{"type":"hold"}"#).unwrap_err().code,
            ErrorCode::InvalidMessage
        );
        assert_eq!(
            parse_host_message(r#"{"type":"set_paused"}"#).unwrap_err().code,
            ErrorCode::InvalidMessage
        );
    }

    #[test]
    fn input_names_combine_with_bits() {
        let names = vec!["rotateRight".to_string()];
        assert_eq!(
            HostMessage::input_event(0x2, &names),
            Ok(InputEvent::MOVE_LEFT | InputEvent::ROTATE_RIGHT)
        );
        // Undefined high bits are dropped.
        assert_eq!(HostMessage::input_event(0xe2, &[]), Ok(InputEvent::MOVE_LEFT));

        let bad = vec!["hardDrop".to_string()];
        assert_eq!(
            HostMessage::input_event(0, &bad).unwrap_err().code,
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn engine_messages_are_tagged() {
        let v = serde_json::to_value(EngineMessage::next_piece(2, 1, &[true, false], 0xff)).unwrap();
        assert_eq!(v["type"], "next_piece");
        assert_eq!(v["cells"], serde_json::json!([1, 0]));

        let v = serde_json::to_value(EngineMessage::error(ErrorCode::Busy, "host connected")).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "busy");
        assert_eq!(v["message"], "host connected");

        let v = serde_json::to_value(EngineMessage::PausedChanged { paused: true }).unwrap();
        assert_eq!(v, serde_json::json!({"type": "paused_changed", "paused": true}));
    }
}
