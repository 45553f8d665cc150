//! 虚拟数据中心命令

use anyhow::Result;
use serde::Serialize;
use vcloud_compute::{Vdc, VcloudClient};

use crate::commands::common::field_text;
use crate::commands::output::{output_formatted, TableRow};
use crate::VdcAction;

pub async fn handle(client: &VcloudClient, action: VdcAction, format: &str) -> Result<()> {
    match action {
        VdcAction::List { org, eager } => {
            let vdcs = client.vdc().collection(&org).list(!eager).await?;
            let rows: Vec<VdcRow> = vdcs.iter().map(VdcRow::from).collect();
            output_formatted(&rows, format)
        }
    }
}

#[derive(Debug, Serialize)]
struct VdcRow {
    id: String,
    name: String,
    allocation_model: String,
    enabled: String,
    vm_quota: String,
}

impl From<&Vdc> for VdcRow {
    fn from(vdc: &Vdc) -> Self {
        Self {
            id: vdc.id().to_string(),
            name: field_text(vdc, "name"),
            allocation_model: field_text(vdc, "allocation_model"),
            enabled: field_text(vdc, "is_enabled"),
            vm_quota: field_text(vdc, "vm_quota"),
        }
    }
}

impl TableRow for VdcRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "ALLOCATION", "ENABLED", "VM QUOTA"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.allocation_model.clone(),
            self.enabled.clone(),
            self.vm_quota.clone(),
        ]
    }
}
