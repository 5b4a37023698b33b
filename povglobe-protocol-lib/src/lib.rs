//! Serial command protocol for the POV globe
//!
//! Each command is a single opcode byte followed by a fixed-size payload.
//! Coordinates are `i16` little-endian, target ids are a single byte. There is
//! no framing or checksum: the decoder resynchronizes on the next opcode after
//! an unknown byte.

use derive_more::{Display, Error};

/// Wire opcodes
pub mod opcode {
    pub const RESET_GLOBE: u8 = 0x00;
    pub const SET_GLOBE_POSITION: u8 = 0x01;

    pub const CLEAR_RETICLE: u8 = 0x10;
    pub const SET_RETICLE: u8 = 0x11;

    pub const CLEAR_TARGET: u8 = 0x20;
    pub const SET_TARGET: u8 = 0x21;

    pub const CLEAR_ANIMATION: u8 = 0x30;
    pub const PLAY_ABDUCTION_ANIMATION: u8 = 0x31;
    pub const PLAY_SCANNER_ANIMATION: u8 = 0x32;

    pub const UPLOAD_IMAGE: u8 = 0x40;
}

/// Longest encoded command: opcode + id + two coordinates
pub const MAX_COMMAND_LEN: usize = 6;

/// A command sent by the remote controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Re-initialize the display and clear all targets
    Reset,
    SetGlobePosition { x: i16 },
    ClearReticle,
    SetReticle { x: i16, y: i16 },
    ClearTarget { id: u8 },
    SetTarget { id: u8, x: i16, y: i16 },
    ClearAnimation,
    PlayAbductionAnimation { x: i16, y: i16 },
    PlayScannerAnimation { x: i16, y: i16 },
}

impl Command {
    /// Opcode byte for this command
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        match self {
            Self::Reset => opcode::RESET_GLOBE,
            Self::SetGlobePosition { .. } => opcode::SET_GLOBE_POSITION,
            Self::ClearReticle => opcode::CLEAR_RETICLE,
            Self::SetReticle { .. } => opcode::SET_RETICLE,
            Self::ClearTarget { .. } => opcode::CLEAR_TARGET,
            Self::SetTarget { .. } => opcode::SET_TARGET,
            Self::ClearAnimation => opcode::CLEAR_ANIMATION,
            Self::PlayAbductionAnimation { .. } => opcode::PLAY_ABDUCTION_ANIMATION,
            Self::PlayScannerAnimation { .. } => opcode::PLAY_SCANNER_ANIMATION,
        }
    }

    /// Append the wire encoding of this command to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode());
        match *self {
            Self::Reset | Self::ClearReticle | Self::ClearAnimation => {}
            Self::SetGlobePosition { x } => out.extend_from_slice(&x.to_le_bytes()),
            Self::ClearTarget { id } => out.push(id),
            Self::SetTarget { id, x, y } => {
                out.push(id);
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
            }
            Self::SetReticle { x, y }
            | Self::PlayAbductionAnimation { x, y }
            | Self::PlayScannerAnimation { x, y } => {
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
            }
        }
    }

    /// Encode this command into a new buffer
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAX_COMMAND_LEN);
        self.encode(&mut out);
        out
    }
}

/// Errors produced while decoding the command stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum DecodeError {
    #[display("unknown opcode 0x{opcode:02x}")]
    UnknownOpcode { opcode: u8 },
    /// The opcode is part of the protocol but this device does not implement it
    #[display("unsupported opcode 0x{opcode:02x}")]
    Unsupported { opcode: u8 },
}

/// Payload length following `opcode`
const fn payload_len(opcode: u8) -> Result<usize, DecodeError> {
    match opcode {
        opcode::RESET_GLOBE | opcode::CLEAR_RETICLE | opcode::CLEAR_ANIMATION => Ok(0),
        opcode::CLEAR_TARGET => Ok(1),
        opcode::SET_GLOBE_POSITION => Ok(2),
        opcode::SET_RETICLE
        | opcode::PLAY_ABDUCTION_ANIMATION
        | opcode::PLAY_SCANNER_ANIMATION => Ok(4),
        opcode::SET_TARGET => Ok(5),
        opcode::UPLOAD_IMAGE => Err(DecodeError::Unsupported { opcode }),
        _ => Err(DecodeError::UnknownOpcode { opcode }),
    }
}

#[inline]
fn read_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([bytes[at], bytes[at + 1]])
}

/// Streaming decoder fed one byte at a time from the serial port
#[derive(Debug, Clone, Default)]
pub struct CommandDecoder {
    buffer: [u8; MAX_COMMAND_LEN],
    len: usize,
    expected: usize,
}

impl CommandDecoder {
    /// Create a decoder waiting for an opcode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any partially received command
    pub fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    /// Returns `true` if a command is partially received
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.len > 0
    }

    /// Feed a single byte.
    ///
    /// Returns `Ok(Some(command))` once a command is complete and `Ok(None)`
    /// while more bytes are needed.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when an opcode byte is not decodable. The byte
    /// is dropped and the decoder waits for the next opcode.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>, DecodeError> {
        if self.len == 0 {
            self.expected = 1 + payload_len(byte)?;
        }

        self.buffer[self.len] = byte;
        self.len += 1;

        if self.len < self.expected {
            return Ok(None);
        }

        let command = Self::parse(&self.buffer[..self.len]);
        self.reset();
        Ok(Some(command))
    }

    /// Decode every complete command in `bytes`, skipping undecodable opcodes
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Result<Command, DecodeError>> {
        bytes
            .iter()
            .filter_map(|&b| self.feed(b).transpose())
            .collect()
    }

    /// Build a command from a complete buffer (opcode already validated)
    fn parse(bytes: &[u8]) -> Command {
        match bytes[0] {
            opcode::RESET_GLOBE => Command::Reset,
            opcode::SET_GLOBE_POSITION => Command::SetGlobePosition {
                x: read_i16(bytes, 1),
            },
            opcode::CLEAR_RETICLE => Command::ClearReticle,
            opcode::SET_RETICLE => Command::SetReticle {
                x: read_i16(bytes, 1),
                y: read_i16(bytes, 3),
            },
            opcode::CLEAR_TARGET => Command::ClearTarget { id: bytes[1] },
            opcode::SET_TARGET => Command::SetTarget {
                id: bytes[1],
                x: read_i16(bytes, 2),
                y: read_i16(bytes, 4),
            },
            opcode::PLAY_ABDUCTION_ANIMATION => Command::PlayAbductionAnimation {
                x: read_i16(bytes, 1),
                y: read_i16(bytes, 3),
            },
            opcode::PLAY_SCANNER_ANIMATION => Command::PlayScannerAnimation {
                x: read_i16(bytes, 1),
                y: read_i16(bytes, 3),
            },
            // CLEAR_ANIMATION is the only remaining opcode accepted by `payload_len`
            _ => Command::ClearAnimation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<Result<Command, DecodeError>> {
        CommandDecoder::new().feed_all(bytes)
    }

    #[test]
    fn test_single_byte_commands() {
        let cmds = decode_all(&[0x00, 0x10, 0x30]);
        assert_eq!(
            cmds,
            vec![
                Ok(Command::Reset),
                Ok(Command::ClearReticle),
                Ok(Command::ClearAnimation)
            ]
        );
    }

    #[test]
    fn test_set_target_payload() {
        // id=2, x=300 (0x012C), y=-5 (0xFFFB)
        let cmds = decode_all(&[0x21, 0x02, 0x2C, 0x01, 0xFB, 0xFF]);
        assert_eq!(cmds, vec![Ok(Command::SetTarget { id: 2, x: 300, y: -5 })]);
    }

    #[test]
    fn test_partial_command_waits_for_payload() {
        let mut decoder = CommandDecoder::new();
        assert_eq!(decoder.feed(0x11), Ok(None));
        assert!(decoder.is_pending());
        assert_eq!(decoder.feed(10), Ok(None));
        assert_eq!(decoder.feed(0), Ok(None));
        assert_eq!(decoder.feed(20), Ok(None));
        assert_eq!(
            decoder.feed(0),
            Ok(Some(Command::SetReticle { x: 10, y: 20 }))
        );
        assert!(!decoder.is_pending());
    }

    #[test]
    fn test_unknown_opcode_resyncs() {
        let cmds = decode_all(&[0x7F, 0x01, 0x05, 0x00]);
        assert_eq!(
            cmds,
            vec![
                Err(DecodeError::UnknownOpcode { opcode: 0x7F }),
                Ok(Command::SetGlobePosition { x: 5 })
            ]
        );
    }

    #[test]
    fn test_upload_image_is_unsupported() {
        let mut decoder = CommandDecoder::new();
        assert_eq!(
            decoder.feed(opcode::UPLOAD_IMAGE),
            Err(DecodeError::Unsupported { opcode: 0x40 })
        );
        assert!(!decoder.is_pending());
    }

    #[test]
    fn test_encoded_stream_decodes_in_order() {
        let commands = [
            Command::SetGlobePosition { x: -1 },
            Command::SetReticle { x: 10, y: 10 },
            Command::ClearTarget { id: 3 },
            Command::PlayScannerAnimation { x: 4, y: 5 },
            Command::PlayAbductionAnimation { x: 6, y: 7 },
        ];
        let mut bytes = Vec::new();
        for cmd in &commands {
            cmd.encode(&mut bytes);
        }
        let decoded: Vec<_> = decode_all(&bytes).into_iter().map(Result::unwrap).collect();
        assert_eq!(decoded, commands);
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(Command::Reset.to_bytes(), [0x00]);
        assert_eq!(
            Command::SetTarget { id: 2, x: 300, y: -5 }.to_bytes(),
            [0x21, 0x02, 0x2C, 0x01, 0xFB, 0xFF]
        );
        let scanner = Command::PlayScannerAnimation {
            x: i16::MIN,
            y: i16::MAX,
        };
        let bytes = scanner.to_bytes();
        assert_eq!(bytes, [0x32, 0x00, 0x80, 0xFF, 0x7F]);
        assert_eq!(decode_all(&bytes), vec![Ok(scanner)]);
    }

    #[test]
    fn test_error_display() {
        let err = DecodeError::UnknownOpcode { opcode: 0xAB };
        assert_eq!(err.to_string(), "unknown opcode 0xab");
    }
}
