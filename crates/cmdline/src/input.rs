use std::{fmt, io};

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Bytes queued for a child's stdin. Zero-filled when dropped.
pub(crate) struct StdinBuffer {
    bytes: Vec<u8>,
}

impl StdinBuffer {
    pub(crate) fn copy_from(data: &[u8]) -> Self {
        Self {
            bytes: data.to_vec(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Writes the buffer into a child's stdin pipe and closes it.
    ///
    /// Consumes the buffer, so it is wiped on every return path, including when the
    /// future is dropped part way.
    pub(crate) async fn deliver<W>(self, stdin: Option<W>) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut stdin = stdin.ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "stdin pipe was not captured")
        })?;
        stdin.write_all(&self.bytes).await?;
        stdin.shutdown().await
    }

    fn wipe(&mut self) {
        self.bytes.fill(0);
        std::hint::black_box(&mut self.bytes);
    }
}

impl Drop for StdinBuffer {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for StdinBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdinBuffer")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}
