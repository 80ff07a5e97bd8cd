//! Codecs for the line-oriented input protocol
//!
//! [`TickCodec`] frames outbound [`TickMessage`]s as `K=<key>T=<ms>\n` lines.
//! [`TokenCodec`] splits keyboard input into whitespace-delimited tokens.

use std::io;

use tokio_util::bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::types::TickMessage;

/// Encoder for tick messages
#[derive(Debug, Default, Clone, Copy)]
pub struct TickCodec;

impl Encoder<TickMessage> for TickCodec {
    type Error = io::Error;

    fn encode(&mut self, item: TickMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.to_bytes();
        dst.reserve(line.len() + 1);
        dst.put_slice(&line);
        dst.put_u8(b'\n');
        Ok(())
    }
}

/// Decoder yielding one whitespace-delimited token at a time
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenCodec;

impl TokenCodec {
    fn skip_whitespace(src: &mut BytesMut) {
        let leading = src
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        src.advance(leading);
    }
}

impl Decoder for TokenCodec {
    type Item = Vec<u8>;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Self::skip_whitespace(src);
        let Some(end) = src.iter().position(u8::is_ascii_whitespace) else {
            // Token may continue in the next read
            return Ok(None);
        };
        let token = src.split_to(end);
        Ok(Some(token.to_vec()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(token) = self.decode(src)? {
            return Ok(Some(token));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let token = src.split();
        Ok(Some(token.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_tick_with_key() {
        let mut dst = BytesMut::new();
        TickCodec
            .encode(TickMessage::new(Some(b"a".to_vec()), 1200), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"K=aT=1200\n");
    }

    #[test]
    fn test_encode_tick_without_key() {
        let mut dst = BytesMut::new();
        TickCodec.encode(TickMessage::new(None, 0), &mut dst).unwrap();
        TickCodec.encode(TickMessage::new(None, 100), &mut dst).unwrap();
        assert_eq!(&dst[..], b"K=T=0\nK=T=100\n");
    }

    #[test]
    fn test_decode_tokens_from_one_line() {
        let mut src = BytesMut::from(&b"  up down\nleft "[..]);
        let mut codec = TokenCodec;
        assert_eq!(codec.decode(&mut src).unwrap().as_deref(), Some(&b"up"[..]));
        assert_eq!(codec.decode(&mut src).unwrap().as_deref(), Some(&b"down"[..]));
        assert_eq!(codec.decode(&mut src).unwrap().as_deref(), Some(&b"left"[..]));
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        assert!(src.is_empty());
    }

    #[test]
    fn test_decode_waits_for_token_end() {
        let mut src = BytesMut::from(&b"ri"[..]);
        let mut codec = TokenCodec;
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        src.extend_from_slice(b"ght\n");
        assert_eq!(codec.decode(&mut src).unwrap().as_deref(), Some(&b"right"[..]));
    }

    #[test]
    fn test_decode_eof_flushes_last_token() {
        let mut src = BytesMut::from(&b"q"[..]);
        let mut codec = TokenCodec;
        assert_eq!(codec.decode_eof(&mut src).unwrap().as_deref(), Some(&b"q"[..]));
        assert_eq!(codec.decode_eof(&mut src).unwrap(), None);
    }

    #[test]
    fn test_decode_passes_non_utf8_bytes() {
        let mut src = BytesMut::from(&[0xff, 0xfe, b' '][..]);
        assert_eq!(
            TokenCodec.decode(&mut src).unwrap().as_deref(),
            Some(&[0xff, 0xfe][..])
        );
    }

    #[test]
    fn test_encode_non_utf8_key() {
        let mut dst = BytesMut::new();
        TickCodec
            .encode(TickMessage::new(Some(vec![0xff]), 5), &mut dst)
            .unwrap();
        assert_eq!(&dst[..], b"K=\xffT=5\n");
    }

    #[test]
    fn test_decode_eof_whitespace_only() {
        let mut src = BytesMut::from(&b" \n\t"[..]);
        assert_eq!(TokenCodec.decode_eof(&mut src).unwrap(), None);
    }
}
