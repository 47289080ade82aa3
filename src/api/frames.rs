//! Multiplexed stdout/stderr framing used by attach, logs, and exec
//!
//! Each frame is an 8-byte header (stream id, three zero bytes, big-endian
//! payload length) followed by the payload. Containers created with a TTY
//! skip the envelope and send raw bytes.

use std::io::{self, Read};

use crate::api::decode::RawStream;
use crate::{Error, Result};

const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdin,
    Stdout,
    Stderr,
}

impl StdStream {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(StdStream::Stdin),
            1 => Some(StdStream::Stdout),
            2 => Some(StdStream::Stderr),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            StdStream::Stdin => 0,
            StdStream::Stdout => 1,
            StdStream::Stderr => 2,
        }
    }
}

/// Encode one frame; payloads must fit the 32-bit length field
pub fn encode_frame(stream: StdStream, payload: &[u8]) -> Result<Vec<u8>> {
    let len = payload_len(payload.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.push(stream.as_byte());
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

fn payload_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::InvalidArgument(format!("frame payload of {} bytes exceeds 4 GiB", len)))
}

/// Fill `buf` completely; returns how many bytes were read before EOF
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Lazily decodes frames from a reader
///
/// EOF on a frame boundary ends the sequence. EOF anywhere else is a
/// [`Error::StreamParse`]; the reader is then fused.
pub struct FrameReader<R> {
    reader: Option<R>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    pub fn close(&mut self) {
        self.reader = None;
    }

    fn read_frame(reader: &mut R) -> Result<Option<(StdStream, Vec<u8>)>> {
        let mut header = [0u8; HEADER_LEN];
        let n = read_full(reader, &mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_LEN {
            return Err(Error::StreamParse(format!(
                "truncated frame header: got {} of {} bytes",
                n, HEADER_LEN
            )));
        }

        let stream = StdStream::from_byte(header[0])
            .ok_or_else(|| Error::StreamParse(format!("unknown stream id {}", header[0])))?;
        let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

        let mut payload = vec![0u8; len];
        let got = read_full(reader, &mut payload)?;
        if got < len {
            return Err(Error::StreamParse(format!(
                "truncated frame payload: declared {} bytes, got {}",
                len, got
            )));
        }
        Ok(Some((stream, payload)))
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = Result<(StdStream, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        match Self::read_frame(reader) {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

/// Concatenate every payload in the stream
pub fn demux_all<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for frame in FrameReader::new(reader) {
        let (_, payload) = frame?;
        out.extend_from_slice(&payload);
    }
    Ok(out)
}

enum LogSource {
    Multiplexed(FrameReader<Box<dyn Read + Send>>),
    Tty(RawStream),
}

/// Output of attach/logs/exec as `(stream, bytes)` chunks
///
/// TTY output carries no stream markers and is reported as stdout.
/// Follow-mode streams never end on their own; call [`LogStream::close`]
/// to release the connection early.
pub struct LogStream {
    source: Option<LogSource>,
}

impl LogStream {
    pub fn multiplexed(reader: Box<dyn Read + Send>) -> Self {
        Self {
            source: Some(LogSource::Multiplexed(FrameReader::new(reader))),
        }
    }

    pub fn tty(reader: Box<dyn Read + Send>) -> Self {
        Self {
            source: Some(LogSource::Tty(RawStream::from_reader(reader))),
        }
    }

    pub fn new(reader: Box<dyn Read + Send>, tty: bool) -> Self {
        if tty {
            Self::tty(reader)
        } else {
            Self::multiplexed(reader)
        }
    }

    /// Drain the stream into one buffer, ignoring stream markers
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for chunk in self {
            out.extend_from_slice(&chunk?.1);
        }
        Ok(out)
    }

    pub fn close(&mut self) {
        if self.source.take().is_some() {
            tracing::trace!("log stream closed");
        }
    }
}

impl Iterator for LogStream {
    type Item = Result<(StdStream, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.source.as_mut()? {
            LogSource::Multiplexed(frames) => frames.next(),
            LogSource::Tty(raw) => raw.next().map(|c| c.map(|bytes| (StdStream::Stdout, bytes))),
        };
        if item.is_none() {
            self.source = None;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.step).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_frames_roundtrip_across_chunk_boundaries() {
        let big: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();
        let frames = vec![
            (StdStream::Stdout, b"hello\n".to_vec()),
            (StdStream::Stderr, Vec::new()),
            (StdStream::Stdout, big),
            (StdStream::Stderr, b"oops".to_vec()),
        ];
        let wire: Vec<u8> = frames
            .iter()
            .flat_map(|(s, p)| encode_frame(*s, p).unwrap())
            .collect();

        let reader = Trickle { data: wire, pos: 0, step: 4093 };
        let decoded: Vec<_> = FrameReader::new(reader).map(|f| f.unwrap()).collect();
        assert_eq!(decoded, frames);
    }

    #[test]
    fn test_truncated_payload_is_an_error() {
        let mut wire = encode_frame(StdStream::Stdout, b"abcdef").unwrap();
        wire.truncate(wire.len() - 2);
        let mut reader = FrameReader::new(Cursor::new(wire));
        assert!(matches!(reader.next(), Some(Err(Error::StreamParse(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        let mut wire = encode_frame(StdStream::Stdout, b"ok").unwrap();
        wire.extend_from_slice(&[1, 0, 0]);
        let results: Vec<_> = FrameReader::new(Cursor::new(wire)).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::StreamParse(_))));
    }

    #[test]
    fn test_unknown_stream_id() {
        let mut wire = encode_frame(StdStream::Stdout, b"x").unwrap();
        wire[0] = 7;
        assert!(demux_all(Cursor::new(wire)).is_err());
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        assert_eq!(payload_len(u32::MAX as usize).unwrap(), u32::MAX);
        assert!(matches!(
            payload_len(u32::MAX as usize + 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_demux_concatenates() {
        let mut wire = encode_frame(StdStream::Stdout, b"hello ").unwrap();
        wire.extend(encode_frame(StdStream::Stderr, b"world").unwrap());
        assert_eq!(demux_all(Cursor::new(wire)).unwrap(), b"hello world");
    }

    #[test]
    fn test_tty_output_passes_through() {
        let stream = LogStream::new(Box::new(Cursor::new(b"\x01raw tty".to_vec())), true);
        assert_eq!(stream.into_bytes().unwrap(), b"\x01raw tty");
    }
}
