//! Codec for the length-prefixed Riak binary protocol.
//!
//! Every message on the wire is a single frame:
//!
//! ```text
//! <total-length:u32 big-endian><message-code:u8><body: total-length - 1 bytes>
//! ```
//!
//! The body is a Protocol Buffers encoded message whose layout is defined
//! by the Riak server; this codec treats bodies opaquely and leaves typed
//! encoding to [`encode_body`] / [`decode_body`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use tokio_util::codec::{Decoder, Encoder};

use super::constants::{SIZE_OF_CODE_FIELD, SIZE_OF_LENGTH_FIELD};
use crate::error::{Result, RiakError};

/// Codec for encoding and decoding Riak protocol frames.
///
/// Implements the `tokio_util::codec::{Encoder, Decoder}` traits for use
/// with tokio's framed I/O. The codec is stateless; partial frames stay in
/// the source buffer until enough bytes arrive.
#[derive(Debug, Default)]
pub struct MsgCodec;

impl MsgCodec {
    /// Creates a new codec instance.
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<(u8, Bytes)> for MsgCodec {
    type Error = RiakError;

    fn encode(&mut self, item: (u8, Bytes), dst: &mut BytesMut) -> Result<()> {
        let (code, body) = item;
        let total = SIZE_OF_CODE_FIELD + body.len();

        dst.reserve(SIZE_OF_LENGTH_FIELD + total);
        dst.put_u32(total as u32);
        dst.put_u8(code);
        dst.put_slice(&body);
        Ok(())
    }
}

impl Decoder for MsgCodec {
    type Item = (u8, BytesMut);
    type Error = RiakError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < SIZE_OF_LENGTH_FIELD {
            return Ok(None);
        }

        let total = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if total < SIZE_OF_CODE_FIELD {
            return Err(RiakError::Communication(format!(
                "frame length {} does not cover the message code",
                total
            )));
        }

        if src.len() < SIZE_OF_LENGTH_FIELD + total {
            src.reserve(SIZE_OF_LENGTH_FIELD + total - src.len());
            return Ok(None);
        }

        src.advance(SIZE_OF_LENGTH_FIELD);
        let code = src.get_u8();
        let body = src.split_to(total - SIZE_OF_CODE_FIELD);

        Ok(Some((code, body)))
    }
}

/// Serializes a typed message into a frame body.
pub fn encode_body<M: Message>(message: &M) -> Bytes {
    let mut buf = BytesMut::with_capacity(message.encoded_len());
    message
        .encode(&mut buf)
        .expect("BytesMut grows on demand, encode cannot fail");
    buf.freeze()
}

/// Deserializes a frame body into a typed message.
pub fn decode_body<M: Message + Default>(body: &[u8]) -> Result<M> {
    M::decode(body).map_err(RiakError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::*;
    use crate::protocol::messages::RpbErrorResp;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::new();

        codec
            .encode((GET_REQ, Bytes::from_static(b"\x0a\x01b")), &mut buf)
            .unwrap();

        let (code, body) = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(code, GET_REQ);
        assert_eq!(&body[..], b"\x0a\x01b");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encode_bodyless_frame() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::new();

        codec.encode((PING_REQ, Bytes::new()), &mut buf).unwrap();

        assert_eq!(&buf[..], &[0, 0, 0, 1, PING_REQ]);

        let (code, body) = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(code, PING_REQ);
        assert!(body.is_empty());
    }

    #[test]
    fn test_decode_incomplete_length() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00][..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_decode_incomplete_body() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::from(
            &[
                0x00, 0x00, 0x00, 0x05, // total = 5 (code + 4 body bytes)
                GET_RESP, 0x01, 0x02, // only 2 of 4 body bytes
            ][..],
        );

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_zero_length_frame_fails() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x00, 0x01][..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, RiakError::Communication(_)));
    }

    #[test]
    fn test_decode_multiple_frames() {
        let mut codec = MsgCodec::new();
        let mut buf = BytesMut::new();

        codec.encode((PING_REQ, Bytes::new()), &mut buf).unwrap();
        codec
            .encode((GET_REQ, Bytes::from_static(b"xyz")), &mut buf)
            .unwrap();

        let (code1, _) = codec.decode(&mut buf).unwrap().unwrap();
        let (code2, body2) = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(code1, PING_REQ);
        assert_eq!(code2, GET_REQ);
        assert_eq!(&body2[..], b"xyz");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_partial_then_complete_decode() {
        let mut codec = MsgCodec::new();
        let mut full = BytesMut::new();
        codec
            .encode((PUT_REQ, Bytes::from_static(b"payload")), &mut full)
            .unwrap();

        let split_point = full.len() / 2;
        let mut partial = full.split_to(split_point);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.unsplit(full);
        let (code, body) = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(code, PUT_REQ);
        assert_eq!(&body[..], b"payload");
    }

    #[test]
    fn test_typed_body_roundtrip() {
        let resp = RpbErrorResp {
            errmsg: Bytes::from_static(b"overload"),
            errcode: 1,
        };

        let body = encode_body(&resp);
        let decoded: RpbErrorResp = decode_body(&body).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn test_decode_body_garbage_fails() {
        let err = decode_body::<RpbErrorResp>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, RiakError::Communication(_)));
    }

    #[test]
    fn test_large_frame_roundtrip() {
        let mut codec = MsgCodec::new();
        let body: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();
        let mut buf = BytesMut::new();

        codec
            .encode((MAP_RED_RESP, Bytes::from(body.clone())), &mut buf)
            .unwrap();

        let (code, decoded) = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(code, MAP_RED_RESP);
        assert_eq!(&decoded[..], &body[..]);
    }
}
