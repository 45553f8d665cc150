//! 基于 HTTP 的记录来源
//!
//! 完整记录统一位于 `{RESOURCE_PATH}/{id}`；摘要列表则取自父资源文档中的
//! 不同位置，由 [`Listing`] 描述。

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::{RecordSource, Summary};
use crate::error::Result;
use crate::model::{EntityKind, Record};
use crate::parser;

/// 摘要列表的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// `org/` 下的 `Org` 元素
    Organizations,

    /// 组织文档中指定短类型的 `Link`
    OrgLinks {
        org_id: String,
        types: &'static [&'static str],
    },

    /// `tasksList/{org_id}` 下的 `Task` 元素
    Tasks { org_id: String },

    /// 目录文档中的 `CatalogItems/CatalogItem`
    CatalogItems { catalog_id: String },

    /// VDC 文档中类型为 vApp 的 `ResourceEntities/ResourceEntity`
    VApps { vdc_id: String },

    /// vApp 文档中的 `Children/Vm`
    Vms { vapp_id: String },

    /// 只能按 ID 获取，列表为空
    Unscoped,
}

impl Listing {
    pub fn catalogs(org_id: &str) -> Self {
        Self::OrgLinks {
            org_id: org_id.to_string(),
            types: &["catalog"],
        }
    }

    pub fn vdcs(org_id: &str) -> Self {
        Self::OrgLinks {
            org_id: org_id.to_string(),
            types: &["vdc"],
        }
    }

    pub fn networks(org_id: &str) -> Self {
        Self::OrgLinks {
            org_id: org_id.to_string(),
            types: &["network", "orgNetwork"],
        }
    }

    /// 父资源文档的路径及其中摘要元素的位置
    fn location(&self) -> Option<(String, &'static [&'static str])> {
        let location: (String, &'static [&'static str]) = match self {
            Self::Organizations => ("org/".to_string(), &["Org"]),
            Self::OrgLinks { org_id, .. } => (format!("org/{}", org_id), &["Link"]),
            Self::Tasks { org_id } => (format!("tasksList/{}", org_id), &["Task"]),
            Self::CatalogItems { catalog_id } => (
                format!("catalog/{}", catalog_id),
                &["CatalogItems", "CatalogItem"],
            ),
            Self::VApps { vdc_id } => (
                format!("vdc/{}", vdc_id),
                &["ResourceEntities", "ResourceEntity"],
            ),
            Self::Vms { vapp_id } => (format!("vApp/{}", vapp_id), &["Children", "Vm"]),
            Self::Unscoped => return None,
        };
        Some(location)
    }

    /// 按短类型过滤
    fn accepts(&self, item: &Value) -> bool {
        let types: &[&str] = match self {
            Self::OrgLinks { types, .. } => types,
            Self::VApps { .. } => &["vApp"],
            _ => return true,
        };

        item.get("type")
            .and_then(Value::as_str)
            .and_then(|t| parser::short_type(t).ok())
            .is_some_and(|short| types.contains(&short))
    }
}

/// 某一实体种类的 HTTP 记录来源
pub struct ApiSource<K: EntityKind> {
    client: VcloudClient,
    listing: Listing,
    _kind: PhantomData<K>,
}

impl<K: EntityKind> ApiSource<K> {
    pub fn new(client: VcloudClient, listing: Listing) -> Self {
        Self {
            client,
            listing,
            _kind: PhantomData,
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }
}

#[async_trait]
impl<K: EntityKind> RecordSource for ApiSource<K> {
    async fn item_list(&self) -> Result<Vec<Summary>> {
        let Some((path, items)) = self.listing.location() else {
            return Ok(Vec::new());
        };

        let document = self.client.request(VcloudRequest::get(path)).await?;
        let summaries = parser::children(&document, items)
            .into_iter()
            .filter(|item| self.listing.accepts(item))
            .map(|item| Summary::from_record(K::normalize(item)))
            .collect::<Result<Vec<_>>>()?;

        debug!("{} 列表共 {} 项", K::NAME, summaries.len());
        Ok(summaries)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
        let path = format!("{}/{}", K::RESOURCE_PATH, id);
        let document = match self.client.request(VcloudRequest::get(path)).await {
            Ok(document) => document,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut record = K::normalize(&document);
        record.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Some(record))
    }
}
