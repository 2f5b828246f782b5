use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt, stream::BoxStream};
use tokio::io::AsyncRead;
use tokio_util::{
    codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead},
    io::StreamReader,
};

/// Newline-delimited text lines, in arrival order.
pub type LineStream = BoxStream<'static, std::io::Result<String>>;

/// Extension trait for converting chunked byte streams to line streams.
pub trait LinesStreamExt: Stream<Item = Result<Bytes, std::io::Error>> + Sized {
    /// Convert a chunked byte stream (e.g. an HTTP body) to a line stream.
    fn lines(self) -> LineStream
    where
        Self: Send + 'static,
    {
        read_lines(StreamReader::new(self))
    }
}

impl<S> LinesStreamExt for S where S: Stream<Item = Result<Bytes, std::io::Error>> {}

/// Frame an async reader into lines. Line terminators (`\n` or `\r\n`) are stripped
/// and a trailing line without terminator is still yielded. Bytes that are not
/// valid UTF-8 are replaced with U+FFFD rather than failing the stream.
pub fn read_lines<R>(reader: R) -> LineStream
where
    R: AsyncRead + Send + 'static,
{
    FramedRead::new(reader, AnyDelimiterCodec::new(b"\n".to_vec(), b"\n".to_vec()))
        .map_ok(|line| decode_line(&line))
        .map_err(|e| match e {
            AnyDelimiterCodecError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        })
        .boxed()
}

fn decode_line(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
