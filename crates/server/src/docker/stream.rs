//! Multiplexed stream decoding — the Docker attach/logs wire format.
//!
//! The Engine multiplexes stdout/stderr onto one byte stream when no TTY is
//! allocated: each frame is an 8-byte header (byte 0 = channel, bytes 1–3
//! reserved, bytes 4–7 = big-endian payload length) followed by the payload.
//! Decoding is best-effort: a buffer that ends mid-frame is not an error,
//! the incomplete tail is simply left unconsumed.

use bytes::{BufMut, BytesMut};

/// Size of the per-frame header preceding each payload.
const FRAME_HEADER_LEN: usize = 8;

/// Channel tag carried in the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChannel {
    Stdin,
    Stdout,
    Stderr,
    /// Any other tag value. Its payload is still emitted.
    Unknown(u8),
}

impl From<u8> for StreamChannel {
    fn from(byte: u8) -> Self {
        match byte {
            0 => StreamChannel::Stdin,
            1 => StreamChannel::Stdout,
            2 => StreamChannel::Stderr,
            other => StreamChannel::Unknown(other),
        }
    }
}

/// Decode a complete multiplexed buffer into one combined text stream.
///
/// Payloads are concatenated in arrival order with no separators, merging
/// all channels — the semantics of reconstructing a single log stream.
/// A truncated trailing frame (short header, or a claimed length that
/// overruns the buffer) silently ends the scan.
pub fn demux(buffer: &[u8]) -> String {
    let mut result = String::new();
    scan_frames(buffer, |_, payload| {
        result.push_str(&String::from_utf8_lossy(payload));
    });
    result
}

/// Output of [`demux_channels`]: payload text bucketed by channel.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DemuxedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Like [`demux`] but keeps stderr apart. Stdin and unknown channels are
/// folded into stdout so no payload is ever dropped.
pub fn demux_channels(buffer: &[u8]) -> DemuxedOutput {
    let mut out = DemuxedOutput::default();
    scan_frames(buffer, |channel, payload| {
        let bucket = match channel {
            StreamChannel::Stderr => &mut out.stderr,
            _ => &mut out.stdout,
        };
        bucket.push_str(&String::from_utf8_lossy(payload));
    });
    out
}

/// Walk complete frames in `buffer`, invoking `emit` per payload.
/// Returns the offset of the first byte that was not consumed.
fn scan_frames(buffer: &[u8], mut emit: impl FnMut(StreamChannel, &[u8])) -> usize {
    let mut offset = 0;
    while buffer.len() - offset >= FRAME_HEADER_LEN {
        let channel = StreamChannel::from(buffer[offset]);
        let len_bytes: [u8; 4] = buffer[offset + 4..offset + 8]
            .try_into()
            .unwrap_or([0; 4]);
        let payload_len = u32::from_be_bytes(len_bytes) as usize;

        let payload_start = offset + FRAME_HEADER_LEN;
        let Some(payload_end) = payload_start.checked_add(payload_len) else {
            break;
        };
        if payload_end > buffer.len() {
            // Ends mid-frame: wait for more data / drop the tail.
            break;
        }

        emit(channel, &buffer[payload_start..payload_end]);
        offset = payload_end;
    }
    offset
}

/// Heuristic check for the multiplexed framing.
///
/// Attach output from a TTY container carries no frames at all, so the
/// collection paths sniff the first chunk before deciding to demux: a known
/// channel tag followed by the three zero padding bytes.
pub fn looks_multiplexed(buffer: &[u8]) -> bool {
    buffer.len() >= FRAME_HEADER_LEN && buffer[0] <= 2 && buffer[1..4] == [0, 0, 0]
}

/// Decode a collected buffer, demuxing only when it carries the framing;
/// raw (TTY) output is passed through as UTF-8.
pub fn decode_output(buffer: &[u8]) -> String {
    if looks_multiplexed(buffer) {
        demux(buffer)
    } else {
        String::from_utf8_lossy(buffer).into_owned()
    }
}

/// Incremental demuxer for chunked delivery.
///
/// Frames can split across network chunks; the decoder retains the
/// unconsumed tail between [`feed`](Self::feed) calls and prepends it to the
/// next chunk. One decoder per logical stream — the tail buffer must not be
/// shared across concurrent streams.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    tail: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk, returning the text of every frame that is now
    /// complete. Incomplete trailing bytes are held for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        self.tail.put_slice(chunk);
        let mut result = String::new();
        let consumed = scan_frames(&self.tail, |_, payload| {
            result.push_str(&String::from_utf8_lossy(payload));
        });
        let _ = self.tail.split_to(consumed);
        result
    }

    /// True when undecoded bytes are pending — after the stream ends this
    /// indicates a truncated final frame.
    pub fn has_pending(&self) -> bool {
        !self.tail.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serialize one frame in the Engine's wire format.
    fn frame(channel: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.push(channel);
        buf.extend_from_slice(&[0, 0, 0]);
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn empty_buffer_decodes_to_empty_string() {
        assert_eq!(demux(&[]), "");
    }

    #[test]
    fn short_buffers_decode_to_empty_string() {
        for len in 1..FRAME_HEADER_LEN {
            assert_eq!(demux(&vec![1u8; len]), "", "len={}", len);
        }
    }

    #[test]
    fn concatenates_payloads_in_order_across_channels() {
        let mut buf = frame(1, b"out ");
        buf.extend(frame(2, b"err "));
        buf.extend(frame(0, b"in "));
        buf.extend(frame(1, b"again"));
        assert_eq!(demux(&buf), "out err in again");
    }

    #[test]
    fn unknown_channel_payload_is_still_emitted() {
        let buf = frame(7, b"mystery");
        assert_eq!(demux(&buf), "mystery");
    }

    #[test]
    fn trailing_partial_header_is_dropped() {
        for extra in 1..FRAME_HEADER_LEN {
            let mut buf = frame(1, b"hello");
            buf.extend(vec![1u8; extra]);
            assert_eq!(demux(&buf), "hello", "extra={}", extra);
        }
    }

    #[test]
    fn overclaiming_length_stops_the_scan() {
        let mut buf = frame(1, b"kept");
        // Header claiming 1 MiB with only 3 payload bytes present.
        buf.push(2);
        buf.extend_from_slice(&[0, 0, 0]);
        buf.extend_from_slice(&(1024u32 * 1024).to_be_bytes());
        buf.extend_from_slice(b"abc");
        assert_eq!(demux(&buf), "kept");
    }

    #[test]
    fn huge_length_claim_does_not_overflow() {
        let mut buf = vec![1, 0, 0, 0];
        buf.extend_from_slice(&u32::MAX.to_be_bytes());
        buf.extend_from_slice(b"payload");
        assert_eq!(demux(&buf), "");
    }

    #[test]
    fn decode_is_deterministic() {
        let mut buf = frame(1, b"alpha");
        buf.extend(frame(2, b"beta"));
        let first = demux(&buf);
        assert_eq!(demux(&buf), first);
    }

    #[test]
    fn large_payload_round_trips() {
        let payload = vec![b'x'; 256 * 1024];
        let buf = frame(1, &payload);
        assert_eq!(demux(&buf).len(), payload.len());
    }

    #[test]
    fn channels_separate_stderr_from_the_rest() {
        let mut buf = frame(1, b"out");
        buf.extend(frame(2, b"err"));
        buf.extend(frame(0, b"in"));
        let split = demux_channels(&buf);
        assert_eq!(split.stdout, "outin");
        assert_eq!(split.stderr, "err");
    }

    #[test]
    fn sniff_accepts_frames_and_rejects_plain_text() {
        assert!(looks_multiplexed(&frame(1, b"hello")));
        assert!(looks_multiplexed(&frame(2, b"")));
        assert!(!looks_multiplexed(b"plain text output\n"));
        assert!(!looks_multiplexed(&[1, 0, 0])); // too short
        assert!(!looks_multiplexed(&frame(3, b"x")[..])); // unknown tag
    }

    #[test]
    fn decode_output_passes_tty_output_through() {
        assert_eq!(decode_output(b"raw tty line\n"), "raw tty line\n");
        assert_eq!(decode_output(&frame(1, b"framed")), "framed");
    }

    #[test]
    fn decoder_reassembles_frames_split_across_chunks() {
        let mut buf = frame(1, b"hello ");
        buf.extend(frame(2, b"world"));

        let mut decoder = FrameDecoder::new();
        let mut out = String::new();
        // Feed one byte at a time — the worst possible chunking.
        for byte in &buf {
            out.push_str(&decoder.feed(&[*byte]));
        }
        assert_eq!(out, "hello world");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn decoder_reports_truncated_tail() {
        let mut decoder = FrameDecoder::new();
        let buf = frame(1, b"done");
        let out = decoder.feed(&buf[..buf.len() - 2]);
        assert_eq!(out, "");
        assert!(decoder.has_pending());

        // The remainder completes the frame.
        assert_eq!(decoder.feed(&buf[buf.len() - 2..]), "done");
        assert!(!decoder.has_pending());
    }
}
