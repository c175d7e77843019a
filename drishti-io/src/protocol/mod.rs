//! Rangefinder telemetry protocol
//!
//! Frame format (all integers little-endian):
//!
//! ```text
//! ┌─────────────┬──────┬──────┬───────────┬─────────────────┬─────────────┐
//! │ 01 02 03 04 │ TYPE │ SEQ  │ TIMESTAMP │ PAYLOAD (typed) │ 40 30 20 10 │
//! │   header    │ u16  │ u16  │    u32    │                 │   footer    │
//! └─────────────┴──────┴──────┴───────────┴─────────────────┴─────────────┘
//!   0x00          0x04   0x06   0x08        0x0c
//! ```
//!
//! There is no length field and no checksum. Frames are cut by
//! [`FrameSynchronizer`] on the markers alone, validated and decoded by
//! [`decode`].

pub mod constants;
pub mod fields;
mod frame;
mod message;
mod sync;

pub use frame::{Frame, Header};
pub use message::{
    decode, DecodedMessage, LaserMessage, LaserPoint, MapTile, Message, Odometry, TextMessage,
    WheelOdometry,
};
pub use sync::FrameSynchronizer;
