//! 虚拟数据中心 API

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::kind;
use crate::source::{ApiSource, Listing};

/// 虚拟数据中心 API
pub struct VdcApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> VdcApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取 VDC 详情
    pub async fn get(&self, vdc_id: &str) -> Result<Value> {
        info!("获取 VDC 详情: {}", vdc_id);
        self.client
            .request(VcloudRequest::get(format!("vdc/{}", vdc_id)))
            .await
    }

    /// 组织下的 VDC 集合
    pub fn collection(&self, org_id: &str) -> Collection<kind::Vdc> {
        Collection::new(Arc::new(ApiSource::<kind::Vdc>::new(
            self.client.clone(),
            Listing::vdcs(org_id),
        )))
    }
}
