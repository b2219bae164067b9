// プロセス境界を越えるファイル名リスト
// ワイヤ形式: 各名前の後に NUL 終端 1 バイト、名前を連結

use thiserror::Error;

const TERMINATOR: u8 = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("ファイル名 #{index} に NUL 文字が含まれています: {name:?}")]
    NulInName { index: usize, name: String },

    #[error("末尾 {trailing} バイトが NUL で終端されていません")]
    Unterminated { trailing: usize },

    #[error("ファイル名 #{index} が UTF-8 ではありません")]
    InvalidUtf8 { index: usize },
}

/// 1 ワーカー分のファイル名（順序付き）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilenameBatch {
    names: Vec<String>,
}

impl FilenameBatch {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }

    /// ワイヤ形式でのバイト数
    pub fn encoded_len(&self) -> usize {
        self.names.iter().map(|name| name.len() + 1).sum()
    }

    pub fn encode(&self) -> Result<Vec<u8>, BatchError> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        for (index, name) in self.names.iter().enumerate() {
            if name.as_bytes().contains(&TERMINATOR) {
                return Err(BatchError::NulInName {
                    index,
                    name: name.clone(),
                });
            }
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(TERMINATOR);
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BatchError> {
        let mut names = Vec::new();
        let mut rest = bytes;

        while !rest.is_empty() {
            let end = rest
                .iter()
                .position(|&b| b == TERMINATOR)
                .ok_or(BatchError::Unterminated {
                    trailing: rest.len(),
                })?;

            let index = names.len();
            let name = std::str::from_utf8(&rest[..end])
                .map_err(|_| BatchError::InvalidUtf8 { index })?;
            names.push(name.to_string());
            rest = &rest[end + 1..];
        }

        Ok(Self { names })
    }
}

impl From<Vec<String>> for FilenameBatch {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}
