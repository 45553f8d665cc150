//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - vCloud 客户端创建
//! - 实体属性的展示（不触发加载）
//! - vApp/虚拟机状态码转换

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use vcloud_compute::{Entity, EntityKind, Lazy, VcloudClient};

use crate::commands::output::{print_table, LinkRow};
use crate::config;

/// 按配置创建 vCloud 客户端，首次请求时登录
pub fn create_client(config_path: Option<&Path>) -> Result<VcloudClient> {
    let config = config::load(config_path)?;
    VcloudClient::new(config).context("创建 vCloud 客户端失败")
}

/// 已加载属性的文本形式，未加载时为 `-`
pub fn field_text<K: EntityKind>(entity: &Entity<K>, name: &str) -> String {
    match entity.peek(name) {
        Some(Lazy::Loaded(Value::String(s))) => s.clone(),
        Some(Lazy::Loaded(Value::Null)) | Some(Lazy::NotLoaded) | None => "-".to_string(),
        Some(Lazy::Loaded(other)) => other.to_string(),
    }
}

/// 查找结果为空时报错
pub fn require<T>(found: Option<T>, what: &str, id: &str) -> Result<T> {
    found.with_context(|| format!("{} {} 不存在", what, id))
}

/// vApp/虚拟机状态码
pub fn status_label(code: &str) -> &str {
    match code {
        "-1" => "FAILED_CREATION",
        "0" => "UNRESOLVED",
        "1" => "RESOLVED",
        "3" => "SUSPENDED",
        "4" => "POWERED_ON",
        "5" => "WAITING_FOR_INPUT",
        "6" => "UNKNOWN",
        "7" => "UNRECOGNIZED",
        "8" => "POWERED_OFF",
        "9" => "INCONSISTENT_STATE",
        "10" => "MIXED",
        other => other,
    }
}

/// 打印实体详情及其链接
pub async fn print_entity<K: EntityKind>(entity: &mut Entity<K>) -> Result<()> {
    println!("{} {}", K::NAME, entity.id());
    for field in K::FIELDS.iter().filter(|f| f.name != "links") {
        println!("  {:<24}{}", field.name, field_text(entity, field.name));
    }

    if K::FIELDS.iter().any(|f| f.name == "links") {
        let links: Vec<LinkRow> = entity.links().await?.iter().map(LinkRow::from).collect();
        if !links.is_empty() {
            println!();
            print_table(&links);
        }
    }
    Ok(())
}
