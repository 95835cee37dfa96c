//! Bluefruit Connect control packets.
//!
//! Wire format:
//! ```text
//! ┌─────┬──────┬───────────────────────┬──────────┐
//! │ '!' │ type │ payload (type-driven) │ checksum │
//! └─────┴──────┴───────────────────────┴──────────┘
//! ```
//!
//! The checksum is the bitwise complement of the byte sum of everything
//! before it.  Only button (`'B'`) and colour (`'C'`) packets are decoded;
//! sensor packets (accelerometer, gyro, quaternion and friends) are framed
//! so the stream stays in sync, then rejected here.

use heapless::Vec;

use crate::color::Rgb8;
use crate::config::MAX_FRAME_LEN;
use crate::error::DecodeError;

/// One candidate packet as handed from the link to the decoder.
pub type RawFrame = Vec<u8, MAX_FRAME_LEN>;

/// First byte of every packet.
pub const PACKET_HEADER: u8 = b'!';

pub const TYPE_BUTTON: u8 = b'B';
pub const TYPE_COLOR: u8 = b'C';

pub const BUTTON_PACKET_LEN: usize = 5;
pub const COLOR_PACKET_LEN: usize = 6;

/// Total packet length implied by a type byte, if the type is known.
pub fn packet_len(type_byte: u8) -> Option<usize> {
    match type_byte {
        TYPE_BUTTON => Some(BUTTON_PACKET_LEN),
        TYPE_COLOR => Some(COLOR_PACKET_LEN),
        // accelerometer, gyro, magnetometer, location: 3 x f32
        b'A' | b'G' | b'M' | b'L' => Some(15),
        // quaternion: 4 x f32
        b'Q' => Some(19),
        _ => None,
    }
}

/// `!(sum of bytes) & 0xFF`
pub fn checksum(bytes: &[u8]) -> u8 {
    !bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

// ───────────────────────────────────────────────────────────────
// Decoded commands
// ───────────────────────────────────────────────────────────────

/// Control-pad button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Button1,
    Button2,
    Button3,
    Button4,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    pub const ALL: [Self; 8] = [
        Self::Button1,
        Self::Button2,
        Self::Button3,
        Self::Button4,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
    ];

    pub fn from_wire(id: u8) -> Option<Self> {
        match id {
            b'1' => Some(Self::Button1),
            b'2' => Some(Self::Button2),
            b'3' => Some(Self::Button3),
            b'4' => Some(Self::Button4),
            b'5' => Some(Self::Up),
            b'6' => Some(Self::Down),
            b'7' => Some(Self::Left),
            b'8' => Some(Self::Right),
            _ => None,
        }
    }

    pub fn wire_id(self) -> u8 {
        match self {
            Self::Button1 => b'1',
            Self::Button2 => b'2',
            Self::Button3 => b'3',
            Self::Button4 => b'4',
            Self::Up => b'5',
            Self::Down => b'6',
            Self::Left => b'7',
            Self::Right => b'8',
        }
    }

    /// True for the four directional pad buttons.
    pub fn is_directional(self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Left | Self::Right)
    }
}

/// A decoded remote-control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Press or release edge of a control-pad button.
    Button { button: Button, pressed: bool },
    /// Colour picker selection.
    Color(Rgb8),
}

impl Command {
    pub fn encode(&self) -> RawFrame {
        match *self {
            Self::Button { button, pressed } => encode_button(button, pressed),
            Self::Color(rgb) => encode_color(rgb),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Decode
// ───────────────────────────────────────────────────────────────

/// Decode one raw frame.
///
/// Every malformed input maps to [`DecodeError::Unrecognized`]; nothing
/// here panics on arbitrary bytes.
pub fn decode(frame: &[u8]) -> Result<Command, DecodeError> {
    let [PACKET_HEADER, kind, ..] = frame else {
        return Err(DecodeError::Unrecognized);
    };
    if packet_len(*kind) != Some(frame.len()) {
        return Err(DecodeError::Unrecognized);
    }
    let (body, cs) = frame.split_at(frame.len() - 1);
    if checksum(body) != cs[0] {
        return Err(DecodeError::Unrecognized);
    }

    match body {
        [_, TYPE_BUTTON, id, state] => {
            let button = Button::from_wire(*id).ok_or(DecodeError::Unrecognized)?;
            let pressed = match *state {
                b'1' => true,
                b'0' => false,
                _ => return Err(DecodeError::Unrecognized),
            };
            Ok(Command::Button { button, pressed })
        }
        [_, TYPE_COLOR, r, g, b] => Ok(Command::Color(Rgb8::new(*r, *g, *b))),
        _ => Err(DecodeError::Unrecognized),
    }
}

// ───────────────────────────────────────────────────────────────
// Encode
// ───────────────────────────────────────────────────────────────

fn seal(body: &[u8]) -> RawFrame {
    let mut frame = RawFrame::new();
    // Every packet body is shorter than MAX_FRAME_LEN.
    let _ = frame.extend_from_slice(body);
    let _ = frame.push(checksum(body));
    frame
}

/// Wire bytes of a button edge.
pub fn encode_button(button: Button, pressed: bool) -> RawFrame {
    let state = if pressed { b'1' } else { b'0' };
    seal(&[PACKET_HEADER, TYPE_BUTTON, button.wire_id(), state])
}

/// Wire bytes of a colour selection.
pub fn encode_color(rgb: Rgb8) -> RawFrame {
    seal(&[PACKET_HEADER, TYPE_COLOR, rgb.r, rgb.g, rgb.b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_button_bytes() {
        // "!B51" + checksum: Up pressed, as sent by the control pad.
        let frame = encode_button(Button::Up, true);
        assert_eq!(&frame[..4], b"!B51");
        let sum = b"!B51".iter().map(|b| *b as u32).sum::<u32>();
        assert_eq!(frame[4], !(sum as u8));
        assert_eq!(
            decode(&frame),
            Ok(Command::Button { button: Button::Up, pressed: true })
        );
    }

    #[test]
    fn every_button_both_edges() {
        for button in Button::ALL {
            for pressed in [true, false] {
                let cmd = Command::Button { button, pressed };
                assert_eq!(decode(&cmd.encode()), Ok(cmd));
            }
        }
    }

    #[test]
    fn color_packet_decodes() {
        let frame = encode_color(Rgb8::new(255, 0, 0));
        assert_eq!(frame.len(), COLOR_PACKET_LEN);
        assert_eq!(decode(&frame), Ok(Command::Color(Rgb8::new(255, 0, 0))));
    }

    #[test]
    fn bad_checksum_rejected() {
        let mut frame = encode_button(Button::Left, true);
        frame[4] ^= 0x01;
        assert_eq!(decode(&frame), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn wrong_length_rejected() {
        let frame = encode_color(Rgb8::new(1, 2, 3));
        assert_eq!(decode(&frame[..5]), Err(DecodeError::Unrecognized));
        assert_eq!(decode(&[]), Err(DecodeError::Unrecognized));
        assert_eq!(decode(b"!"), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn missing_header_rejected() {
        let mut frame = encode_button(Button::Down, false);
        frame[0] = b'?';
        assert_eq!(decode(&frame), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn unknown_button_and_state_rejected() {
        assert_eq!(decode(&seal(b"!B91")), Err(DecodeError::Unrecognized));
        assert_eq!(decode(&seal(b"!B12")), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn sensor_packets_rejected() {
        let mut body = [0u8; 14];
        body[0] = PACKET_HEADER;
        body[1] = b'A';
        let frame = seal(&body);
        assert_eq!(frame.len(), 15);
        assert_eq!(decode(&frame), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn packet_lengths() {
        assert_eq!(packet_len(b'B'), Some(5));
        assert_eq!(packet_len(b'C'), Some(6));
        assert_eq!(packet_len(b'Q'), Some(19));
        assert_eq!(packet_len(b'x'), None);
        assert!(packet_len(b'Q').unwrap() <= MAX_FRAME_LEN);
    }
}
