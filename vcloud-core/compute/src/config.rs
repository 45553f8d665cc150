//! 客户端配置
//!
//! 支持 TOML 配置文件与环境变量覆盖：
//!
//! ```toml
//! host = "vcloud.example.com"
//! username = "admin@System"
//! password = "secret"
//! reauth = "retry_once"
//!
//! [task_poll]
//! interval_ms = 2000
//! timeout_secs = 600
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, VcloudError};

/// 会话失效时的重新认证策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReauthPolicy {
    /// 直接返回错误，下次请求时重新登录
    #[default]
    Never,

    /// 收到 401 时重新登录并重发一次
    RetryOnce,
}

/// 任务轮询配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPollConfig {
    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    /// 最长等待时间（秒），未设置时一直等待
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for TaskPollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_secs: None,
        }
    }
}

impl TaskPollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// vCloud 客户端配置
#[derive(Clone, Serialize, Deserialize)]
pub struct VcloudConfig {
    /// vCloud Director 主机名
    pub host: String,

    /// 端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 协议 (https/http)
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// API 根路径
    #[serde(default = "default_path")]
    pub path: String,

    /// API 版本，写入 Accept 头
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// 用户名（user@org）
    #[serde(default)]
    pub username: String,

    /// 密码
    #[serde(default)]
    pub password: String,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// 重新认证策略
    #[serde(default)]
    pub reauth: ReauthPolicy,

    /// 任务轮询
    #[serde(default)]
    pub task_poll: TaskPollConfig,
}

impl fmt::Debug for VcloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcloudConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheme", &self.scheme)
            .field("path", &self.path)
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .field("password", &"***")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("verify_ssl", &self.verify_ssl)
            .field("reauth", &self.reauth)
            .field("task_poll", &self.task_poll)
            .finish()
    }
}

impl VcloudConfig {
    /// 使用默认端口、协议和路径创建配置
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port: default_port(),
            scheme: default_scheme(),
            path: default_path(),
            api_version: default_api_version(),
            username: username.to_string(),
            password: password.to_string(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            verify_ssl: default_verify_ssl(),
            reauth: ReauthPolicy::default(),
            task_poll: TaskPollConfig::default(),
        }
    }

    /// 从 TOML 文件加载
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VcloudError::ConfigError(format!("读取配置文件失败 {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            VcloudError::ConfigError(format!("解析配置文件失败 {:?}: {}", path, e))
        })
    }

    /// 环境变量覆盖
    pub fn apply_env_vars(&mut self) -> Result<()> {
        if let Ok(host) = env::var("VCLOUD_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("VCLOUD_PORT") {
            self.port = port
                .parse()
                .map_err(|_| VcloudError::ConfigError(format!("无效的 VCLOUD_PORT: {}", port)))?;
        }
        if let Ok(username) = env::var("VCLOUD_USERNAME") {
            self.username = username;
        }
        if let Ok(password) = env::var("VCLOUD_PASSWORD") {
            self.password = password;
        }
        if let Ok(verify_ssl) = env::var("VCLOUD_VERIFY_SSL") {
            self.verify_ssl = verify_ssl.parse().unwrap_or(default_verify_ssl());
        }
        Ok(())
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(VcloudError::ConfigError("host 不能为空".to_string()));
        }
        if self.scheme != "https" && self.scheme != "http" {
            return Err(VcloudError::ConfigError(format!(
                "不支持的协议: {}",
                self.scheme
            )));
        }
        if !self.path.starts_with('/') {
            return Err(VcloudError::ConfigError(format!(
                "API 路径必须以 / 开头: {}",
                self.path
            )));
        }
        Ok(())
    }

    /// 是否已配置认证凭据
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// 服务端点，如 `https://vcloud.example.com:443`
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// 版本化的 Accept 头
    pub fn accept_header(&self) -> String {
        format!("application/*+xml;version={}", self.api_version)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

// 默认值函数
fn default_port() -> u16 {
    443
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_path() -> String {
    "/api".to_string()
}

fn default_api_version() -> String {
    "1.5".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    60
}

fn default_verify_ssl() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1000
}
