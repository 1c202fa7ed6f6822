//! 프레임 코덱 — 길이 접두사 JSON 프레이밍
//!
//! 프레임은 4바이트 빅엔디언 길이 접두사와 그 길이만큼의 UTF-8 JSON
//! 페이로드로 구성됩니다. 코덱은 주어진 바이트 스트림 외의 상태를
//! 가지지 않으며, 실제 소켓 I/O 외에는 블로킹하지 않습니다.

use bytes::{BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use vigil_core::error::StoreError;

/// 프레임 페이로드의 최대 길이 (10 MiB)
///
/// 손상되었거나 적대적인 피어가 보낸 길이 접두사로부터 보호합니다.
pub const MAX_FRAME_LEN: usize = 10 * 1024 * 1024;

/// 값을 JSON으로 인코딩하여 한 프레임으로 기록합니다.
///
/// 직렬화된 페이로드가 [`MAX_FRAME_LEN`]을 초과하면
/// [`StoreError::Framing`]으로 실패합니다.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), StoreError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let payload =
        serde_json::to_vec(value).map_err(|e| StoreError::MalformedPayload(e.to_string()))?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(StoreError::Framing(format!(
            "payload too large: {} bytes (max: {})",
            payload.len(),
            MAX_FRAME_LEN
        )));
    }

    // 길이 접두사와 페이로드를 하나의 버퍼로 모아 한 번에 기록합니다.
    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// 스트림에서 한 프레임을 읽어 JSON으로 디코딩합니다.
///
/// # 에러
///
/// - 길이 접두사가 4바이트 미만에서 끊기거나 페이로드가 중간에 끊기면
///   [`StoreError::Framing`]
/// - 길이가 0이거나 [`MAX_FRAME_LEN`] 초과이면 페이로드를 읽기 전에
///   [`StoreError::Framing`]
/// - 페이로드가 유효한 JSON이 아니면 [`StoreError::MalformedPayload`]
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, StoreError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| eof_as_framing(e, "peer closed while reading frame length"))?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(StoreError::Framing(format!(
            "invalid frame length: {len}"
        )));
    }

    // read_exact가 부분 읽기를 내부에서 반복 처리합니다.
    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| eof_as_framing(e, "peer closed mid-frame"))?;

    serde_json::from_slice(&payload).map_err(|e| StoreError::MalformedPayload(e.to_string()))
}

/// 조기 EOF는 프레이밍 위반으로, 그 외 I/O 에러는 그대로 분류합니다.
fn eof_as_framing(err: std::io::Error, context: &str) -> StoreError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        StoreError::Framing(context.to_owned())
    } else {
        StoreError::Io(err)
    }
}
