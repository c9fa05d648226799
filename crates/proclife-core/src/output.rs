use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, FramedRead};

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Unpin + Sync + Send>>>;

/// Shared destination for a command's combined stdout and stderr
///
/// Clones refer to the same writer; writes from both streams are serialized
/// through its mutex.
pub struct OutputSink(SharedWriter);

impl Clone for OutputSink {
    fn clone(&self) -> Self {
        OutputSink(self.0.clone())
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OutputSink")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

impl OutputSink {
    pub fn new(t: Box<dyn AsyncWrite + Unpin + Sync + Send>) -> OutputSink {
        OutputSink(Arc::new(Mutex::new(t)))
    }

    pub fn stdout() -> OutputSink {
        Self::new(Box::new(tokio::io::stdout()))
    }

    pub fn stderr() -> OutputSink {
        Self::new(Box::new(tokio::io::stderr()))
    }

    /// Whether both sinks share the same underlying writer
    pub fn same_as(&self, other: &OutputSink) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub async fn write(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut writer = self.0.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }
}

/// Where forwarded output goes, looked up again for every chunk
///
/// Re-reading the target per chunk lets a command switch sinks while its
/// process is already running.
#[async_trait]
pub trait OutputTarget: Send + Sync {
    async fn current_output(&self) -> Option<OutputSink>;
}

struct Utf8Codec;

impl Decoder for Utf8Codec {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        match std::str::from_utf8(src) {
            Ok(s) => {
                let out = s.to_owned();
                src.clear();
                Ok(Some(out))
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();

                if valid == 0 {
                    return Ok(None);
                }

                let out = String::from_utf8_lossy(&src[..valid]).into_owned();
                src.advance(valid);
                Ok(Some(out))
            }
            // Invalid sequences are replaced rather than aborting the stream
            Err(_) => {
                let out = String::from_utf8_lossy(src).into_owned();
                src.clear();
                Ok(Some(out))
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let out = String::from_utf8_lossy(buf).into_owned();
        buf.clear();
        Ok(Some(out))
    }
}

/// Drain `io` until EOF, copying each chunk to the target's current sink
///
/// Chunks arriving while no sink is configured are dropped. The reader is
/// always drained so the child never blocks on a full pipe.
pub async fn forward<R: AsyncRead + Unpin>(
    io: R,
    target: &dyn OutputTarget,
) -> std::io::Result<()> {
    let mut frames = FramedRead::with_capacity(io, Utf8Codec, 1024);

    while let Some(frame) = frames.next().await {
        let text = frame?;
        if let Some(sink) = target.current_output().await {
            sink.write(text.as_bytes()).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    struct Fixed(Option<OutputSink>);

    #[async_trait]
    impl OutputTarget for Fixed {
        async fn current_output(&self) -> Option<OutputSink> {
            self.0.clone()
        }
    }

    fn file_sink(file: &tempfile::NamedTempFile) -> OutputSink {
        let handle = file.reopen().unwrap();
        OutputSink::new(Box::new(tokio::fs::File::from_std(handle)))
    }

    #[tokio::test]
    async fn test_forward_copies_everything() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let target = Fixed(Some(file_sink(&file)));

        let input: &[u8] = "héllo\nworld\n".as_bytes();
        forward(input, &target).await.unwrap();

        let mut written = String::new();
        file.reopen().unwrap().read_to_string(&mut written).unwrap();
        assert_eq!(written, "héllo\nworld\n");
    }

    #[tokio::test]
    async fn test_forward_without_sink_drains() {
        let target = Fixed(None);
        let input: &[u8] = b"discarded";
        assert!(forward(input, &target).await.is_ok());
    }

    #[test]
    fn test_codec_holds_back_partial_utf8() {
        let mut codec = Utf8Codec;
        // "é" is 0xC3 0xA9; feed only the first byte after some ascii
        let mut buf = BytesMut::from(&b"ab\xC3"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("ab".to_string()));
        assert_eq!(&buf[..], b"\xC3");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\xA9");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("é".to_string()));
    }

    #[test]
    fn test_codec_replaces_invalid_bytes() {
        let mut codec = Utf8Codec;
        let mut buf = BytesMut::from(&b"a\xFFb"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("a\u{FFFD}b".to_string())
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_same_as() {
        let a = OutputSink::new(Box::new(tokio::io::sink()));
        let b = a.clone();
        let c = OutputSink::new(Box::new(tokio::io::sink()));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }
}
