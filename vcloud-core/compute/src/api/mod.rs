//! vCloud API 模块
//!
//! 每个请求对应一个 `(路径, 方法, 请求头, 期望状态码)` 的薄封装，并提供各资源
//! 的集合入口：
//! - 组织 (OrganizationApi)
//! - 目录与目录项 (CatalogApi)
//! - 虚拟数据中心 (VdcApi)
//! - vApp 与 vApp 模板 (VAppApi)
//! - 虚拟机电源与硬件 (VmApi)
//! - 任务 (TaskApi)
//! - 组织网络 (NetworkApi)
//! - 虚拟机元数据 (MetadataApi)

pub mod catalog;
pub mod metadata;
pub mod network;
pub mod organization;
pub mod task;
pub mod vapp;
pub mod vdc;
pub mod vm;

pub use catalog::CatalogApi;
pub use metadata::{MetadataApi, MetadataEntry};
pub use network::NetworkApi;
pub use organization::OrganizationApi;
pub use task::TaskApi;
pub use vapp::VAppApi;
pub use vdc::VdcApi;
pub use vm::VmApi;
