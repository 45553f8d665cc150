//! 组织 API

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::kind;
use crate::source::{ApiSource, Listing};

/// 组织 API
pub struct OrganizationApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> OrganizationApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 查询当前会话可见的组织列表
    pub async fn list(&self) -> Result<Value> {
        info!("查询组织列表");
        self.client.request(VcloudRequest::get("org/")).await
    }

    /// 获取组织详情
    pub async fn get(&self, org_id: &str) -> Result<Value> {
        info!("获取组织详情: {}", org_id);
        self.client
            .request(VcloudRequest::get(format!("org/{}", org_id)))
            .await
    }

    /// 组织集合
    pub fn collection(&self) -> Collection<kind::Organization> {
        Collection::new(Arc::new(ApiSource::<kind::Organization>::new(
            self.client.clone(),
            Listing::Organizations,
        )))
    }
}
