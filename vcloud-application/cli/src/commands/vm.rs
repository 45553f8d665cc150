//! 虚拟机命令

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use vcloud_compute::{MetadataEntry, VcloudClient, Vm};

use crate::commands::common::{field_text, status_label};
use crate::commands::output::{output_formatted, TableRow};
use crate::VmAction;

pub async fn handle(client: &VcloudClient, action: VmAction, format: &str) -> Result<()> {
    match action {
        VmAction::List { vapp, eager } => {
            let vms = client.vm().collection(&vapp).list(!eager).await?;
            let rows: Vec<VmRow> = vms.iter().map(VmRow::from).collect();
            output_formatted(&rows, format)
        }
        VmAction::PowerOn { id } => power_on(client, &id).await,
        VmAction::Metadata { id } => {
            let entries = client.metadata().entries(&id).await?;
            let rows: Vec<MetadataRow> = entries.into_iter().map(MetadataRow).collect();
            output_formatted(&rows, format)
        }
        VmAction::SetMetadata { id, entries } => set_metadata(client, &id, &entries).await,
    }
}

#[derive(Debug, Serialize)]
pub struct VmRow {
    id: String,
    name: String,
    status: String,
    computer_name: String,
    operating_system: String,
}

impl From<&Vm> for VmRow {
    fn from(vm: &Vm) -> Self {
        Self {
            id: vm.id().to_string(),
            name: field_text(vm, "name"),
            status: status_label(&field_text(vm, "status")).to_string(),
            computer_name: field_text(vm, "computer_name"),
            operating_system: field_text(vm, "operating_system"),
        }
    }
}

impl TableRow for VmRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "STATUS", "COMPUTER NAME", "OS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.status.clone(),
            self.computer_name.clone(),
            self.operating_system.clone(),
        ]
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct MetadataRow(MetadataEntry);

impl TableRow for MetadataRow {
    fn headers() -> Vec<&'static str> {
        vec!["KEY", "VALUE"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.0.key.clone(), self.0.value.clone()]
    }
}

async fn power_on(client: &VcloudClient, id: &str) -> Result<()> {
    println!("虚拟机 {} 开机中...", id.cyan());
    client
        .vm()
        .power_on(id)
        .await
        .with_context(|| format!("虚拟机 {} 开机失败", id))?;
    println!("{} 虚拟机 {} 已开机", "✓".green().bold(), id.cyan().bold());
    Ok(())
}

async fn set_metadata(client: &VcloudClient, id: &str, pairs: &[String]) -> Result<()> {
    let entries = parse_entries(pairs)?;
    client
        .metadata()
        .post(id, &entries)
        .await
        .with_context(|| format!("写入虚拟机 {} 元数据失败", id))?;

    println!(
        "{} 虚拟机 {} 元数据已更新 ({} 项)",
        "✓".green().bold(),
        id.cyan().bold(),
        entries.len()
    );
    for entry in &entries {
        println!("  {} = {}", entry.key, entry.value.yellow());
    }
    Ok(())
}

/// 解析 `key=value` 参数
fn parse_entries(pairs: &[String]) -> Result<Vec<MetadataEntry>> {
    pairs
        .iter()
        .map(|pair| -> Result<MetadataEntry> {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("无效的元数据参数 (应为 key=value): {}", pair))?;
            if key.is_empty() {
                anyhow::bail!("元数据键不能为空: {}", pair);
            }
            Ok(MetadataEntry::new(key, value))
        })
        .collect()
}
