//! 任务 API

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::{Result, VcloudError};
use crate::models::kind;
use crate::source::{ApiSource, Listing};

/// 任务 API
pub struct TaskApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> TaskApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取任务详情
    pub async fn get(&self, task_id: &str) -> Result<Value> {
        info!("获取任务详情: {}", task_id);
        self.client
            .request(VcloudRequest::get(format!("task/{}", task_id)))
            .await
    }

    /// 查询组织的任务列表
    pub async fn list(&self, org_id: &str) -> Result<Value> {
        info!("查询任务列表: {}", org_id);
        self.client
            .request(VcloudRequest::get(format!("tasksList/{}", org_id)))
            .await
    }

    /// 组织下的任务集合；`org_id` 为空时只能按 ID 查找
    pub fn collection(&self, org_id: Option<&str>) -> Collection<kind::Task> {
        let listing = match org_id {
            Some(org_id) => Listing::Tasks {
                org_id: org_id.to_string(),
            },
            None => Listing::Unscoped,
        };
        Collection::new(Arc::new(ApiSource::<kind::Task>::new(
            self.client.clone(),
            listing,
        )))
    }

    /// 等待已有任务结束
    pub async fn wait(&self, task_id: &str) -> Result<()> {
        info!("等待任务完成: {}", task_id);
        let mut task = self
            .collection(None)
            .find(task_id)
            .await?
            .ok_or_else(|| VcloudError::NotFound(format!("Task {}", task_id)))?;
        self.client.poller().await_completion(&mut task).await
    }
}
