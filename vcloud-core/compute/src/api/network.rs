//! 组织网络 API

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::kind;
use crate::source::{ApiSource, Listing};

/// 组织网络 API
pub struct NetworkApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> NetworkApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取网络详情
    pub async fn get(&self, network_id: &str) -> Result<Value> {
        info!("获取网络详情: {}", network_id);
        self.client
            .request(VcloudRequest::get(format!("network/{}", network_id)))
            .await
    }

    /// 组织下的网络集合
    pub fn collection(&self, org_id: &str) -> Collection<kind::Network> {
        Collection::new(Arc::new(ApiSource::<kind::Network>::new(
            self.client.clone(),
            Listing::networks(org_id),
        )))
    }
}
