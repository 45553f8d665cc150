//! vApp 命令

use anyhow::Result;
use serde::Serialize;
use vcloud_compute::{VApp, VcloudClient};

use crate::commands::common::{field_text, print_entity, require, status_label};
use crate::commands::output::{output_formatted, print_table, TableRow};
use crate::commands::vm::VmRow;
use crate::VAppAction;

pub async fn handle(client: &VcloudClient, action: VAppAction, format: &str) -> Result<()> {
    match action {
        VAppAction::List { vdc, eager } => {
            let vapps = client.vapp().collection(&vdc).list(!eager).await?;
            let rows: Vec<VAppRow> = vapps.iter().map(VAppRow::from).collect();
            output_formatted(&rows, format)
        }
        VAppAction::Show { id } => show_vapp(client, &id).await,
    }
}

#[derive(Debug, Serialize)]
struct VAppRow {
    id: String,
    name: String,
    status: String,
    deployed: String,
    owner: String,
}

impl From<&VApp> for VAppRow {
    fn from(vapp: &VApp) -> Self {
        Self {
            id: vapp.id().to_string(),
            name: field_text(vapp, "name"),
            status: status_label(&field_text(vapp, "status")).to_string(),
            deployed: field_text(vapp, "deployed"),
            owner: field_text(vapp, "owner"),
        }
    }
}

impl TableRow for VAppRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "STATUS", "DEPLOYED", "OWNER"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.status.clone(),
            self.deployed.clone(),
            self.owner.clone(),
        ]
    }
}

async fn show_vapp(client: &VcloudClient, id: &str) -> Result<()> {
    let found = client.vapp().find(id).await?;
    let mut vapp = require(found, "vApp", id)?;
    print_entity(&mut vapp).await?;

    let vms = client.vm().collection(id).list(true).await?;
    if !vms.is_empty() {
        println!();
        let rows: Vec<VmRow> = vms.iter().map(VmRow::from).collect();
        print_table(&rows);
    }
    Ok(())
}
