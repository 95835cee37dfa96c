//! Remote-control protocol.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ NUS RX bytes │──▶│ PacketFramer │──▶│   decode()   │──▶ Command
//! │  (chunks)    │   │  (codec)     │   │  (packet)    │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```

pub mod codec;
pub mod packet;

pub use codec::PacketFramer;
pub use packet::{Button, Command, RawFrame, decode, encode_button, encode_color};
