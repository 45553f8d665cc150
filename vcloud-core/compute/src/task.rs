//! 异步任务跟踪
//!
//! 开机、元数据修改等操作返回 202 和一个 Task，由 [`TaskPoller`] 反复刷新任务
//! 状态直到进入终态。

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::TaskPollConfig;
use crate::error::{Result, VcloudError};
use crate::model::Lazy;
use crate::models::Task;

/// 任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    PreRunning,
    Running,
    Success,
    Error,
    Canceled,
    Aborted,
    /// 未识别的状态，原样保留
    Other(String),
}

impl TaskStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "queued" => Self::Queued,
            "preRunning" => Self::PreRunning,
            "running" => Self::Running,
            "success" => Self::Success,
            "error" => Self::Error,
            "canceled" => Self::Canceled,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::PreRunning => "preRunning",
            Self::Running => "running",
            Self::Success => "success",
            Self::Error => "error",
            Self::Canceled => "canceled",
            Self::Aborted => "aborted",
            Self::Other(other) => other,
        }
    }

    /// 排队或执行中
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Queued | Self::PreRunning | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_running()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Task {
    /// 当前状态
    pub async fn status(&mut self) -> Result<TaskStatus> {
        self.get_str("status")
            .await?
            .map(|s| TaskStatus::parse(&s))
            .ok_or_else(|| VcloudError::ParseError(format!("任务 {} 缺少 status", self.id())))
    }

    /// 失败原因
    pub async fn error_message(&mut self) -> Result<Option<String>> {
        self.get_str("error_message").await
    }

    pub async fn started_at(&mut self) -> Result<Option<DateTime<FixedOffset>>> {
        self.get("start_time").await?;
        Ok(self.loaded_time("start_time"))
    }

    pub async fn ended_at(&mut self) -> Result<Option<DateTime<FixedOffset>>> {
        self.get("end_time").await?;
        Ok(self.loaded_time("end_time"))
    }

    /// 已加载的字符串属性，不触发加载
    pub fn loaded_str(&self, name: &str) -> Option<&str> {
        self.peek(name)
            .and_then(Lazy::as_loaded)
            .and_then(Value::as_str)
    }

    /// 已加载的时间戳，不触发加载
    pub fn loaded_time(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        self.loaded_str(name)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

/// 任务轮询器
#[derive(Debug, Clone)]
pub struct TaskPoller {
    interval: Duration,
    timeout: Option<Duration>,
}

impl Default for TaskPoller {
    fn default() -> Self {
        Self::new(&TaskPollConfig::default())
    }
}

impl TaskPoller {
    pub fn new(config: &TaskPollConfig) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 等待任务结束；非 success 终态返回 [`VcloudError::TaskFailed`]
    pub async fn await_completion(&self, task: &mut Task) -> Result<()> {
        let start = Instant::now();
        let mut polls = 0u32;

        let status = loop {
            task.reload().await?;
            polls += 1;

            let status = task.status().await?;
            debug!("任务 {} 状态: {} (第 {} 次查询)", task.id(), status, polls);

            if status.is_terminal() {
                break status;
            }

            if let Some(timeout) = self.timeout {
                if start.elapsed() >= timeout {
                    warn!("任务 {} 等待超时 ({:?})", task.id(), timeout);
                    return Err(VcloudError::Timeout(format!(
                        "任务 {} 在 {:?} 内未完成，最后状态: {}",
                        task.id(),
                        timeout,
                        status
                    )));
                }
            }

            tokio::time::sleep(self.interval).await;
        };

        if status.is_success() {
            info!("任务 {} 完成 (耗时 {:?})", task.id(), start.elapsed());
            return Ok(());
        }

        // 终态任务不再刷新，没有 Error 元素时消息为空
        let message = task
            .loaded_str("error_message")
            .unwrap_or_default()
            .to_string();
        warn!("任务 {} 失败: {} {}", task.id(), status, message);
        Err(VcloudError::TaskFailed {
            status: status.to_string(),
            message,
        })
    }
}
