//! vCloud Director 计算服务 SDK
//!
//! 提供与 vCloud Director 1.5 REST API 交互的客户端实现。
//!
//! # 功能
//!
//! - **会话管理** (`VcloudClient`): Basic 认证登录、会话 Cookie 缓存与失效、可选的重新认证
//! - **响应解析** (`parser`): XML 响应转为嵌套文档，`<Link>` 解析并合成方法名
//! - **懒加载模型** (`Entity`): 属性首次访问时自动拉取完整记录
//! - **集合** (`Collection`): 懒索引 / 完整加载、按 ID 或名称查找
//! - **任务轮询** (`TaskPoller`): 等待异步任务进入终态
//!
//! # 示例
//!
//! ```ignore
//! use vcloud_compute::{VcloudClient, VcloudConfig};
//!
//! let client = VcloudClient::new(VcloudConfig::new("vcd.example.com", "admin@System", "password"))?;
//!
//! // 懒索引：一次请求列出组织
//! let orgs = client.organization().collection().list(true).await?;
//!
//! // 按名称查找 vApp 并开机
//! let vapps = client.vapp().collection("vdc-id");
//! if let Some(mut vapp) = vapps.find_by_name("web-01").await? {
//!     println!("{:?}", vapp.get("status").await?);
//! }
//! client.vm().power_on("vm-id").await?;
//! ```

pub mod api;
pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod model;
pub mod models;
pub mod parser;
pub mod source;
pub mod task;

#[cfg(test)]
mod testing;

pub use client::{VcloudClient, VcloudRequest};
pub use collection::{Collection, RecordSource, Summary};
pub use config::{ReauthPolicy, TaskPollConfig, VcloudConfig};
pub use error::{Result, VcloudError};
pub use model::{Entity, EntityKind, Field, Lazy, Record};
pub use parser::Link;
pub use source::{ApiSource, Listing};
pub use task::{TaskPoller, TaskStatus};

// 导出 API 模块
pub use api::{
    CatalogApi, MetadataApi, MetadataEntry, NetworkApi, OrganizationApi, TaskApi, VAppApi, VdcApi,
    VmApi,
};

// 导出数据模型
pub use models::{
    Catalog, CatalogItem, Network, Organization, Task, VApp, VAppTemplate, Vdc, Vm,
};
