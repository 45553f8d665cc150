//! vCloud 计算服务错误定义

use thiserror::Error;

/// vCloud 错误类型
#[derive(Error, Debug)]
pub enum VcloudError {
    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("HTTP 错误 [{status}]: {body}")]
    HttpError { status: u16, body: String },

    #[error("连接错误: {0}")]
    Connection(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("任务失败: status: {status}, error: {message}")]
    TaskFailed { status: String, message: String },

    #[error("超时错误: {0}")]
    Timeout(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("{kind} 未声明属性: {name}")]
    UnknownAttribute { kind: &'static str, name: String },

    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl VcloudError {
    /// 响应状态码（仅 HTTP 错误携带）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 是否为 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 是否为会话失效
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// vCloud 结果类型
pub type Result<T> = std::result::Result<T, VcloudError>;
