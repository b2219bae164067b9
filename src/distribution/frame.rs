// 分配プロトコルのフレーム
// ワイヤ形式: タグ 1 バイト + u64 リトルエンディアン（値または長さ）+ ペイロード

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const TAG_COUNT: u8 = 1;
const TAG_LENGTH: u8 = 2;
const TAG_PAYLOAD: u8 = 3;
const TAG_ABORT: u8 = 4;

/// 1 フレームのペイロード上限（64 MiB）
pub const MAX_PAYLOAD_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("不明なフレームタグ: {0}")]
    UnknownTag(u8),

    #[error("ペイロードが大きすぎます: {0} バイト")]
    PayloadTooLarge(u64),

    #[error("フレーム入出力エラー: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// カタログ全体の件数
    Count(u64),
    /// 受信側ペイロードのバイト数
    Length(u64),
    /// エンコード済みファイル名リスト
    Payload(Vec<u8>),
    /// ルートからの中止通知
    Abort(String),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Count(_) => "count",
            Frame::Length(_) => "length",
            Frame::Payload(_) => "payload",
            Frame::Abort(_) => "abort",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let (tag, header, body): (u8, u64, &[u8]) = match self {
            Frame::Count(value) => (TAG_COUNT, *value, &[]),
            Frame::Length(value) => (TAG_LENGTH, *value, &[]),
            Frame::Payload(bytes) => (TAG_PAYLOAD, bytes.len() as u64, bytes),
            Frame::Abort(reason) => (TAG_ABORT, reason.len() as u64, reason.as_bytes()),
        };

        let mut out = Vec::with_capacity(9 + body.len());
        out.push(tag);
        out.extend_from_slice(&header.to_le_bytes());
        out.extend_from_slice(body);
        out
    }
}

pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&frame.encode()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, FrameError>
where
    R: AsyncRead + Unpin,
{
    let tag = reader.read_u8().await?;
    let header = reader.read_u64_le().await?;

    match tag {
        TAG_COUNT => Ok(Frame::Count(header)),
        TAG_LENGTH => Ok(Frame::Length(header)),
        TAG_PAYLOAD | TAG_ABORT => {
            if header > MAX_PAYLOAD_BYTES {
                return Err(FrameError::PayloadTooLarge(header));
            }
            let mut body = vec![0u8; header as usize];
            reader.read_exact(&mut body).await?;

            if tag == TAG_PAYLOAD {
                Ok(Frame::Payload(body))
            } else {
                Ok(Frame::Abort(String::from_utf8_lossy(&body).into_owned()))
            }
        }
        other => Err(FrameError::UnknownTag(other)),
    }
}
