//! Length-prefixed MessagePack framing.
//!
//! Every frame is a big-endian `u32` payload length followed by the payload,
//! a MessagePack map produced with `rmp-serde`.

use std::io::{self, Read};

use rmp_serde::Serializer;
use serde::{Serialize, de::DeserializeOwned};

const HEADER_LEN: usize = 4;

/// Serialise `packet` into a MessagePack payload.
pub fn encode_packet<T: Serialize>(packet: &T) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    packet
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Decode a MessagePack payload.
pub fn decode_packet<T: DeserializeOwned>(payload: &[u8]) -> io::Result<T> {
    rmp_serde::from_slice(payload).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Prefix `payload` with its length; `None` if it exceeds `max_size`.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Option<Vec<u8>> {
    if payload.len() > max_size {
        return None;
    }
    let len = u32::try_from(payload.len()).ok()?;
    let mut framed = Vec::with_capacity(payload.len().checked_add(HEADER_LEN)?);
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Some(framed)
}

/// Encode and frame `packet` in one step.
pub fn encode_frame<T: Serialize>(packet: &T, max_size: usize) -> io::Result<Vec<u8>> {
    let payload = encode_packet(packet)?;
    frame_payload(&payload, max_size).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit of {max_size}", payload.len()),
        )
    })
}

/// Read one frame's payload from `reader`.
pub fn read_frame<R: Read + ?Sized>(reader: &mut R, max_size: usize) -> io::Result<Vec<u8>> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let len = u32::from_be_bytes(header) as usize;
    if len > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("incoming frame of {len} bytes exceeds limit of {max_size}"),
        ));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        packet::{ClientPacket, ServerPacket},
        session::SessionHandle,
    };
    use std::io::Cursor;

    #[test]
    fn frame_payload_enforces_limit() {
        assert!(frame_payload(&[0u8; 32], 16).is_none());
    }

    #[test]
    fn frame_payload_prefixes_length() {
        let framed = frame_payload(&[1, 2, 3], 16).expect("payload fits frame");
        assert_eq!(&framed[..4], &3u32.to_be_bytes());
        assert_eq!(&framed[4..], &[1, 2, 3]);
    }

    #[test]
    fn framed_packets_read_back() {
        let packet = ClientPacket::WriteMessage {
            handle: SessionHandle::new(4),
            text: "line\n".into(),
        };
        let frame = encode_frame(&packet, 1024).expect("encode");
        let mut cursor = Cursor::new(frame);
        let payload = read_frame(&mut cursor, 1024).expect("read frame");
        let decoded: ClientPacket = decode_packet(&payload).expect("decode");
        assert_eq!(decoded, packet);
    }

    #[test]
    fn oversized_incoming_frame_is_rejected() {
        let mut cursor = Cursor::new(100u32.to_be_bytes().to_vec());
        let err = read_frame(&mut cursor, 10).expect_err("limit must apply");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn unknown_packet_type_is_invalid_data() {
        let payload = encode_packet(&ClientPacket::ClearLogger {
            handle: SessionHandle::new(2),
        })
        .expect("encode");
        let err = decode_packet::<ServerPacket>(&payload).expect_err("not a server packet");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
