//! 切割流程的錯誤類型

use std::fmt;

/// 引擎內部儲存的 I/O 錯誤種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineIoKind {
    NotFound,
    Other,
}

impl fmt::Display for EngineIoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "找不到檔案"),
            Self::Other => write!(f, "I/O 錯誤"),
        }
    }
}

/// 引擎內部儲存的 I/O 錯誤
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({name}): {message}")]
pub struct EngineIoError {
    pub kind: EngineIoKind,
    pub name: String,
    pub message: String,
}

impl EngineIoError {
    pub fn not_found(name: &str) -> Self {
        Self {
            kind: EngineIoKind::NotFound,
            name: name.to_string(),
            message: "不存在於引擎工作區".to_string(),
        }
    }

    pub fn other(name: &str, message: impl Into<String>) -> Self {
        Self {
            kind: EngineIoKind::Other,
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn from_io(name: &str, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(name)
        } else {
            Self::other(name, err.to_string())
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == EngineIoKind::NotFound
    }
}

/// 一次切割工作中可能發生的錯誤
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CutError {
    /// 規劃參數不合法（呼叫端錯誤）
    #[error("切割規劃參數不合法: {0}")]
    InvalidPlanInput(String),

    /// 無法讀取影片的容器資訊
    #[error("無法讀取影片的長度: {0}")]
    UnreadableMedia(String),

    #[error("無法載入切割引擎: {reason}")]
    EngineLoad { reason: String },

    #[error("切割引擎尚未初始化")]
    EngineNotReady,

    /// 引擎回報的錯誤，原文轉交給使用者
    #[error("切割引擎執行失敗: {message}")]
    EngineExecution { message: String },

    #[error("引擎儲存錯誤: {0}")]
    EngineIo(#[from] EngineIoError),

    #[error("已有切割工作正在執行")]
    Busy,

    #[error("不合法的狀態轉換: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
