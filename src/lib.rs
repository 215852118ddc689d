//! # radiolink
//!
//! Framed control-plane link for remote-controlled devices, over a serial
//! stream or a packet radio.
//!
//! One byte stream carries two frame encodings:
//!
//! - **ASCII** commands such as `<P1=90>`, delimited by start and end
//!   markers and dispatched on their first character.
//! - **Raw** binary frames, `<` + opcode in `0x11..=0x14` + total length,
//!   which may contain any byte, markers included.
//!
//! Output is batched: small replies accumulate in a holding buffer and go
//! out as one transmission when the buffer fills or a maximum interval
//! elapses, trading latency for fewer packets on air.
//!
//! ## Example
//!
//! ```
//! use radiolink::handler::{Command, Router};
//! use radiolink::transport::{ManualClock, StreamSource};
//! use radiolink::writer::Outbound;
//! use radiolink::{Link, LinkConfig};
//!
//! #[derive(Default)]
//! struct Arm {
//!     joints: [u16; 10],
//! }
//!
//! fn set_joint(arm: &mut Arm, frame: &[u8], out: &mut dyn Outbound) {
//!     let joint = usize::from(frame[1] - b'0');
//!     let angle = std::str::from_utf8(&frame[3..frame.len() - 1])
//!         .ok()
//!         .and_then(|s| s.parse().ok())
//!         .unwrap_or(0);
//!     arm.joints[joint] = angle;
//!     out.append(b"<ok>");
//! }
//!
//! const COMMANDS: &[Command<Arm>] = &[Command::new(b'#', set_joint)];
//!
//! let clock = ManualClock::default();
//! let config = LinkConfig::default().greedy(64).max_flush_interval_ms(20);
//! let mut link: Link<Vec<Vec<u8>>, _> = Link::new(&config, Vec::new(), clock.clone()).unwrap();
//! let mut router = Router::new(config.command_table(COMMANDS), Arm::default());
//!
//! let mut input = StreamSource::new();
//! input.extend(b"<3=120><4=45>");
//! link.drain(&mut input, &mut router);
//!
//! clock.advance(20);
//! link.tick();
//!
//! assert_eq!(router.ctx().joints[3], 120);
//! assert_eq!(router.ctx().joints[4], 45);
//! assert_eq!(link.batcher().transport(), &vec![b"<ok><ok>".to_vec()]);
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod handler;
pub mod link;
pub mod protocol;
pub mod transport;
pub mod writer;

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{run_stream, Link};
