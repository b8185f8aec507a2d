use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{MeshTransportError, PeerId};

/// Write a length-prefixed frame to a stream.
pub(crate) async fn write_framed<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), anyhow::Error> {
    let len = (data.len() as u32).to_be_bytes();
    writer.write_all(&len).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed frame from a stream.
pub(crate) async fn read_framed<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_size: usize,
) -> Result<Vec<u8>, MeshTransportError> {
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| MeshTransportError::Receive(e.into()))?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_size {
        return Err(MeshTransportError::MessageTooLarge {
            size: len,
            max: max_size,
        });
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| MeshTransportError::Receive(e.into()))?;

    Ok(buf)
}

/// First frame on every new link, from both sides: who is speaking.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Hello {
    pub peer: PeerId,
}

impl Hello {
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("Hello serialization cannot fail")
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, MeshTransportError> {
        serde_json::from_slice(data).map_err(|e| MeshTransportError::Handshake(e.into()))
    }
}
