//! Frame I/O over async byte streams.

use bytes::Bytes;
use shroud_proto::{Frame, FrameHeader, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::ServerError;

/// Read one frame, allowing at most `max_payload` payload bytes.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new header starts.
/// The payload limit is checked before anything is allocated for it.
///
/// # Errors
///
/// - `UnexpectedEof` if the stream ends inside a frame
/// - `Protocol` for an invalid header or a payload over `max_payload`
/// - `Io` for socket failures
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Option<Frame>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut header_bytes = [0u8; FrameHeader::SIZE];
    let mut filled = 0;
    while filled < header_bytes.len() {
        let n = reader.read(&mut header_bytes[filled..]).await?;
        if n == 0 {
            return if filled == 0 { Ok(None) } else { Err(ServerError::UnexpectedEof) };
        }
        filled += n;
    }

    let header = FrameHeader::from_bytes(&header_bytes)?;
    let payload_len = header.payload_len();
    if payload_len > max_payload {
        return Err(ProtocolError::PayloadTooLarge { size: payload_len, max: max_payload }.into());
    }

    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => ServerError::UnexpectedEof,
        _ => ServerError::Io(err),
    })?;

    Ok(Some(Frame { header, payload: Bytes::from(payload) }))
}

/// Write one frame.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame.to_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
