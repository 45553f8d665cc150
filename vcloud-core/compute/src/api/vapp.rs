//! vApp API

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::{kind, VApp};
use crate::source::{ApiSource, Listing};

/// vApp API
pub struct VAppApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> VAppApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取 vApp 详情
    pub async fn get(&self, vapp_id: &str) -> Result<Value> {
        info!("获取 vApp 详情: {}", vapp_id);
        self.client
            .request(VcloudRequest::get(format!("vApp/{}", vapp_id)))
            .await
    }

    /// 获取 vApp 模板详情
    pub async fn get_template(&self, template_id: &str) -> Result<Value> {
        info!("获取 vApp 模板详情: {}", template_id);
        self.client
            .request(VcloudRequest::get(format!("vAppTemplate/{}", template_id)))
            .await
    }

    /// VDC 下的 vApp 集合
    pub fn collection(&self, vdc_id: &str) -> Collection<kind::VApp> {
        Collection::new(Arc::new(ApiSource::<kind::VApp>::new(
            self.client.clone(),
            Listing::VApps {
                vdc_id: vdc_id.to_string(),
            },
        )))
    }

    /// 按 ID 查找 vApp，不存在时返回 `None`
    pub async fn find(&self, vapp_id: &str) -> Result<Option<VApp>> {
        Collection::<kind::VApp>::new(Arc::new(ApiSource::<kind::VApp>::new(
            self.client.clone(),
            Listing::Unscoped,
        )))
        .find(vapp_id)
        .await
    }

    /// vApp 模板，只支持按 ID 查找
    pub fn templates(&self) -> Collection<kind::VAppTemplate> {
        Collection::new(Arc::new(ApiSource::<kind::VAppTemplate>::new(
            self.client.clone(),
            Listing::Unscoped,
        )))
    }
}
