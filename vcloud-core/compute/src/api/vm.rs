//! 虚拟机 API
//!
//! 提供虚拟机相关功能，包括：
//! - 查询 vApp 中的虚拟机
//! - 开机（等待任务完成）
//! - 虚拟硬件、网络连接与客户机定制配置查询

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::client::{VcloudClient, VcloudRequest};
use crate::collection::Collection;
use crate::error::Result;
use crate::models::{kind, Vm};
use crate::source::{ApiSource, Listing};

/// 虚拟机 API
pub struct VmApi<'a> {
    client: &'a VcloudClient,
}

impl<'a> VmApi<'a> {
    pub(crate) fn new(client: &'a VcloudClient) -> Self {
        Self { client }
    }

    // ============================================
    // 查询
    // ============================================

    /// 查询 vApp 文档（包含 `Children/Vm`）
    pub async fn list_in_vapp(&self, vapp_id: &str) -> Result<Value> {
        info!("查询 vApp 中的虚拟机: {}", vapp_id);
        self.client
            .request(VcloudRequest::get(format!("vApp/{}", vapp_id)))
            .await
    }

    /// 获取虚拟机详情
    pub async fn get(&self, vm_id: &str) -> Result<Value> {
        info!("获取虚拟机详情: {}", vm_id);
        self.client
            .request(VcloudRequest::get(format!("vApp/{}", vm_id)))
            .await
    }

    /// vApp 下的虚拟机集合
    pub fn collection(&self, vapp_id: &str) -> Collection<kind::Vm> {
        Collection::new(Arc::new(ApiSource::<kind::Vm>::new(
            self.client.clone(),
            Listing::Vms {
                vapp_id: vapp_id.to_string(),
            },
        )))
    }

    /// 按 ID 查找虚拟机，不存在时返回 `None`
    pub async fn find(&self, vm_id: &str) -> Result<Option<Vm>> {
        Collection::<kind::Vm>::new(Arc::new(ApiSource::<kind::Vm>::new(
            self.client.clone(),
            Listing::Unscoped,
        )))
        .find(vm_id)
        .await
    }

    // ============================================
    // 电源操作
    // ============================================

    /// 开机，等待任务完成
    pub async fn power_on(&self, vm_id: &str) -> Result<()> {
        info!("虚拟机开机: {}", vm_id);
        let response = self
            .client
            .request(VcloudRequest::task(
                Method::POST,
                format!("vApp/{}/power/action/powerOn", vm_id),
            ))
            .await?;
        self.client.process_task(&response).await
    }

    // ============================================
    // 硬件配置
    // ============================================

    /// CPU 配置
    pub async fn get_cpu(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机 CPU: {}", vm_id);
        self.section(vm_id, "virtualHardwareSection/cpu").await
    }

    /// 内存配置
    pub async fn get_memory(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机内存: {}", vm_id);
        self.section(vm_id, "virtualHardwareSection/memory").await
    }

    /// 磁盘列表
    pub async fn get_disks(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机磁盘: {}", vm_id);
        self.section(vm_id, "virtualHardwareSection/disks").await
    }

    /// 网络连接
    pub async fn get_network(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机网络连接: {}", vm_id);
        self.section(vm_id, "networkConnectionSection/").await
    }

    /// 客户机定制
    pub async fn get_customization(&self, vm_id: &str) -> Result<Value> {
        info!("查询虚拟机客户机定制: {}", vm_id);
        self.section(vm_id, "guestCustomizationSection/").await
    }

    async fn section(&self, vm_id: &str, section: &str) -> Result<Value> {
        self.client
            .request(VcloudRequest::get(format!("vApp/{}/{}", vm_id, section)))
            .await
    }
}

impl Vm {
    /// 开机并刷新状态
    pub async fn power_on(&mut self, client: &VcloudClient) -> Result<()> {
        client.vm().power_on(self.id()).await?;
        self.reload().await
    }
}
