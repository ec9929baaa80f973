//! OSC messaging — the message set, the UDP sink, and packet encoding.
//!
//! Every message is an address plus `int32` arguments; `rosc` does the
//! wire encoding (padded address, `,i...` type tags, big-endian ints).

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{OscPacket, OscType};

use crate::buttons::ChangeEvent;
use crate::color::Color;

/// Shutter notification address.
pub const ADDR_SHUTTER: &str = "/shutter";
/// Button change address.
pub const ADDR_BUTTONS: &str = "/btns";
/// Manual color report address.
pub const ADDR_VALUE: &str = "/value";

#[derive(Debug)]
pub enum OscError {
    BindFailed(String),
    ResolveFailed(String),
    EncodeFailed(String),
    SendFailed(String),
}

impl fmt::Display for OscError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OscError::BindFailed(e) => write!(f, "OSC socket bind failed: {e}"),
            OscError::ResolveFailed(e) => write!(f, "OSC target unresolved: {e}"),
            OscError::EncodeFailed(e) => write!(f, "OSC encode failed: {e}"),
            OscError::SendFailed(e) => write!(f, "OSC send failed: {e}"),
        }
    }
}

impl std::error::Error for OscError {}

pub type Result<T> = std::result::Result<T, OscError>;

/// An address plus integer arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscMessage {
    pub address: String,
    pub args: Vec<i32>,
}

impl OscMessage {
    pub fn new(address: &str, args: Vec<i32>) -> Self {
        Self {
            address: address.to_string(),
            args,
        }
    }

    /// `/shutter 1`
    pub fn shutter() -> Self {
        Self::new(ADDR_SHUTTER, vec![1])
    }

    /// `/btns` with one tri-state code per channel.
    pub fn buttons(event: &ChangeEvent) -> Self {
        Self::new(ADDR_BUTTONS, event.wire_codes())
    }

    /// `/btns` with raw levels (`0` pressed, `1` released) instead of transitions.
    pub fn buttons_raw(event: &ChangeEvent) -> Self {
        Self::new(ADDR_BUTTONS, event.raw_codes())
    }

    /// `/value r g b`
    pub fn value(color: Color) -> Self {
        Self::new(
            ADDR_VALUE,
            vec![i32::from(color.r), i32::from(color.g), i32::from(color.b)],
        )
    }

    /// Encode as an OSC packet.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let packet = OscPacket::Message(rosc::OscMessage {
            addr: self.address.clone(),
            args: self.args.iter().copied().map(OscType::Int).collect(),
        });
        rosc::encoder::encode(&packet)
            .map_err(|e| OscError::EncodeFailed(format!("{}: {e:?}", self.address)))
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(i32::to_string).collect();
        write!(f, "{} {}", self.address, args.join(" "))
    }
}

/// Fire-and-forget message destination.
pub trait MessageSink {
    fn send(&mut self, msg: &OscMessage) -> Result<()>;
}

impl<T: MessageSink + ?Sized> MessageSink for Box<T> {
    fn send(&mut self, msg: &OscMessage) -> Result<()> {
        (**self).send(msg)
    }
}

/// Sends each message as one UDP datagram.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Bind an ephemeral local port and resolve `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let target = (host, port)
            .to_socket_addrs()
            .map_err(|e| OscError::ResolveFailed(format!("{host}:{port}: {e}")))?
            .next()
            .ok_or_else(|| OscError::ResolveFailed(format!("{host}:{port}: no address")))?;
        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind).map_err(|e| OscError::BindFailed(e.to_string()))?;
        log::debug!("[osc] sending to {target}");
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl MessageSink for UdpSink {
    fn send(&mut self, msg: &OscMessage) -> Result<()> {
        let packet = msg.encode()?;
        self.socket
            .send_to(&packet, self.target)
            .map_err(|e| OscError::SendFailed(format!("{}: {e}", msg.address)))?;
        log::debug!("[osc] {msg}");
        Ok(())
    }
}

// ── Recording sink for testing ──

#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::Cell;

    /// Records every sent message.
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Vec<OscMessage>,
        /// If true, `send` returns an error.
        pub fail_send: Cell<bool>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Messages sent to `address`, in order.
        pub fn to(&self, address: &str) -> Vec<&OscMessage> {
            self.sent.iter().filter(|m| m.address == address).collect()
        }
    }

    impl MessageSink for RecordingSink {
        fn send(&mut self, msg: &OscMessage) -> Result<()> {
            if self.fail_send.get() {
                return Err(OscError::SendFailed("mock: send failure injected".into()));
            }
            self.sent.push(msg.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ButtonStateTracker, ChannelId};

    #[test]
    fn encode_shutter() {
        let bytes = OscMessage::shutter().encode().unwrap();
        let mut expected = b"/shutter\0\0\0\0".to_vec();
        expected.extend_from_slice(b",i\0\0");
        expected.extend_from_slice(&[0, 0, 0, 1]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn encode_pads_address_to_four() {
        // "/btns" = 5 bytes → 8 with NUL + padding.
        let bytes = OscMessage::new("/btns", vec![]).encode().unwrap();
        assert_eq!(&bytes[..8], b"/btns\0\0\0");
        assert_eq!(&bytes[8..], b",\0\0\0");
    }

    #[test]
    fn encode_value_args_big_endian() {
        let bytes = OscMessage::value(Color::new(255, 1, 0)).encode().unwrap();
        // "/value" → 8 bytes, ",iii" → 8 bytes, then 3 ints.
        assert_eq!(bytes.len(), 8 + 8 + 12);
        assert_eq!(&bytes[8..16], b",iii\0\0\0\0");
        assert_eq!(&bytes[16..20], &[0, 0, 0, 255]);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 1]);
        assert_eq!(&bytes[24..28], &[0, 0, 0, 0]);
    }

    #[test]
    fn encoded_packet_decodes_back() {
        let msg = OscMessage::new(ADDR_BUTTONS, vec![2, 2, 2, 2, 0]);
        let bytes = msg.encode().unwrap();
        let (rest, packet) = rosc::decoder::decode_udp(&bytes).unwrap();
        assert!(rest.is_empty());
        let OscPacket::Message(decoded) = packet else {
            panic!("expected a message, got {packet:?}");
        };
        assert_eq!(decoded.addr, "/btns");
        assert_eq!(
            decoded.args,
            vec![
                OscType::Int(2),
                OscType::Int(2),
                OscType::Int(2),
                OscType::Int(2),
                OscType::Int(0)
            ]
        );
    }

    #[test]
    fn buttons_message_carries_tri_state_codes() {
        let mut t = ButtonStateTracker::new(3, Some(ChannelId(2)));
        t.poll(&[false, false, false]).unwrap();
        let ev = t.poll(&[false, false, true]).unwrap().event.unwrap();
        assert_eq!(OscMessage::buttons(&ev).args, vec![2, 2, 0]);
        assert_eq!(OscMessage::buttons_raw(&ev).args, vec![1, 1, 0]);
        assert_eq!(OscMessage::buttons(&ev).to_string(), "/btns 2 2 0");
    }

    #[test]
    fn udp_sink_delivers_packet() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let port = rx.local_addr().unwrap().port();

        let mut sink = UdpSink::connect("127.0.0.1", port).unwrap();
        sink.send(&OscMessage::shutter()).unwrap();

        let mut buf = [0u8; 64];
        let (n, _) = rx.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], OscMessage::shutter().encode().unwrap().as_slice());
    }

    #[test]
    fn recording_sink_filters_by_address() {
        let mut sink = mock::RecordingSink::new();
        sink.send(&OscMessage::shutter()).unwrap();
        sink.send(&OscMessage::value(Color::WHITE)).unwrap();
        assert_eq!(sink.to(ADDR_SHUTTER).len(), 1);
        assert_eq!(sink.to(ADDR_VALUE).len(), 1);
        assert!(sink.to(ADDR_BUTTONS).is_empty());
    }
}
