//! 目录 API
//!
//! 目录挂在组织下，目录项挂在目录下。

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::kind;
use crate::source::{ApiSource, Listing};

/// 目录 API
pub struct CatalogApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> CatalogApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取目录详情
    pub async fn get(&self, catalog_id: &str) -> Result<Value> {
        info!("获取目录详情: {}", catalog_id);
        self.client
            .request(VcloudRequest::get(format!("catalog/{}", catalog_id)))
            .await
    }

    /// 获取目录项详情
    pub async fn get_item(&self, item_id: &str) -> Result<Value> {
        info!("获取目录项详情: {}", item_id);
        self.client
            .request(VcloudRequest::get(format!("catalogItem/{}", item_id)))
            .await
    }

    /// 组织下的目录集合
    pub fn collection(&self, org_id: &str) -> Collection<kind::Catalog> {
        Collection::new(Arc::new(ApiSource::<kind::Catalog>::new(
            self.client.clone(),
            Listing::catalogs(org_id),
        )))
    }

    /// 目录下的目录项集合
    pub fn items(&self, catalog_id: &str) -> Collection<kind::CatalogItem> {
        Collection::new(Arc::new(ApiSource::<kind::CatalogItem>::new(
            self.client.clone(),
            Listing::CatalogItems {
                catalog_id: catalog_id.to_string(),
            },
        )))
    }
}
