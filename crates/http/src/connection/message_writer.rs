use crate::codec::ResponseEncoder;
use crate::protocol::{Message, ResponseHead, SendError};
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Buffers encoded response messages until [`MessageWriter::flush`].
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new() }
    }

    #[inline]
    pub fn write(&mut self, item: Message<ResponseHead>) -> Result<(), SendError> {
        self.encoder.encode(item, &mut self.buffer)
    }

    /// Writes the interim `100 Continue` status line right away.
    pub async fn write_continue(&mut self) -> Result<(), SendError> {
        self.buffer.extend_from_slice(CONTINUE);
        self.flush().await
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer).await?;
            self.buffer.clear();
        }

        Ok(self.writer.flush().await?)
    }

    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.buffer.clear();
        Ok(self.writer.shutdown().await?)
    }
}
