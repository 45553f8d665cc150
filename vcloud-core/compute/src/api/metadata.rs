//! 虚拟机元数据 API
//!
//! 写操作返回 202 和任务，等待任务完成后才返回。

use quick_xml::escape::escape;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::error::Result;
use crate::parser;

const METADATA_TYPE: &str = "application/vnd.vmware.vcloud.metadata+xml";
const METADATA_VALUE_TYPE: &str = "application/vnd.vmware.vcloud.metadata.value+xml";
const VCLOUD_NS: &str = "http://www.vmware.com/vcloud/v1.5";

/// 元数据键值对
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 元数据 API
pub struct MetadataApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> MetadataApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    /// 获取虚拟机元数据文档
    pub async fn get(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机元数据: {}", vm_id);
        self.client
            .request(VcloudRequest::get(format!("vApp/{}/metadata/", vm_id)))
            .await
    }

    /// 获取虚拟机元数据键值对
    pub async fn entries(&self, vm_id: &str) -> Result<Vec<MetadataEntry>> {
        Ok(metadata_entries(&self.get(vm_id).await?))
    }

    /// 合并写入多个键值对
    pub async fn post(&self, vm_id: &str, entries: &[MetadataEntry]) -> Result<()> {
        info!("写入虚拟机元数据: {} ({} 项)", vm_id, entries.len());
        let request = VcloudRequest::task(Method::POST, format!("vApp/{}/metadata/", vm_id))
            .body(METADATA_TYPE, metadata_xml(entries));
        let response = self.client.request(request).await?;
        self.client.process_task(&response).await
    }

    /// 设置单个键的值
    pub async fn put_value(&self, vm_id: &str, key: &str, value: &str) -> Result<()> {
        info!("设置虚拟机元数据: {} {}", vm_id, key);
        let request = VcloudRequest::task(Method::PUT, metadata_path(vm_id, key))
            .body(METADATA_VALUE_TYPE, metadata_value_xml(value));
        let response = self.client.request(request).await?;
        self.client.process_task(&response).await
    }

    /// 删除单个键
    pub async fn delete(&self, vm_id: &str, key: &str) -> Result<()> {
        info!("删除虚拟机元数据: {} {}", vm_id, key);
        let response = self
            .client
            .request(VcloudRequest::task(Method::DELETE, metadata_path(vm_id, key)))
            .await?;
        self.client.process_task(&response).await
    }
}

fn metadata_path(vm_id: &str, key: &str) -> String {
    format!("vApp/{}/metadata/{}", vm_id, urlencoding::encode(key))
}

/// `Metadata` 请求体
pub fn metadata_xml(entries: &[MetadataEntry]) -> String {
    let body: String = entries
        .iter()
        .map(|entry| {
            format!(
                "<MetadataEntry><Key>{}</Key><Value>{}</Value></MetadataEntry>",
                escape(entry.key.as_str()),
                escape(entry.value.as_str())
            )
        })
        .collect();
    format!(
        r#"<Metadata xmlns="{}" type="{}">{}</Metadata>"#,
        VCLOUD_NS, METADATA_TYPE, body
    )
}

/// `MetadataValue` 请求体
pub fn metadata_value_xml(value: &str) -> String {
    format!(
        r#"<MetadataValue xmlns="{}"><Value>{}</Value></MetadataValue>"#,
        VCLOUD_NS,
        escape(value)
    )
}

/// 从 `Metadata` 文档提取键值对
pub fn metadata_entries(document: &Value) -> Vec<MetadataEntry> {
    parser::children(document, &["MetadataEntry"])
        .into_iter()
        .filter_map(|entry| {
            let key = entry.get("Key")?.as_str()?;
            let value = parser::lookup(entry, &["Value"])
                .or_else(|| parser::lookup(entry, &["TypedValue", "Value"]))
                .and_then(Value::as_str)
                .unwrap_or_default();
            Some(MetadataEntry::new(key, value))
        })
        .collect()
}
