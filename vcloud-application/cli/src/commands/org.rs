//! 组织命令

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use vcloud_compute::{Organization, VcloudClient};

use crate::commands::common::{field_text, print_entity, require};
use crate::commands::output::{output_formatted, TableRow};
use crate::OrgAction;

pub async fn handle(client: &VcloudClient, action: OrgAction, format: &str) -> Result<()> {
    match action {
        OrgAction::List { eager } => list_orgs(client, eager, format).await,
        OrgAction::Show { id } => show_org(client, &id).await,
    }
}

#[derive(Debug, Serialize)]
struct OrgRow {
    id: String,
    name: String,
    full_name: String,
}

impl From<&Organization> for OrgRow {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id().to_string(),
            name: field_text(org, "name"),
            full_name: field_text(org, "full_name"),
        }
    }
}

impl TableRow for OrgRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "FULL NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.full_name.clone()]
    }
}

async fn list_orgs(client: &VcloudClient, eager: bool, format: &str) -> Result<()> {
    let orgs = client.organization().collection().list(!eager).await?;
    info!("共 {} 个组织", orgs.len());

    let rows: Vec<OrgRow> = orgs.iter().map(OrgRow::from).collect();
    output_formatted(&rows, format)
}

async fn show_org(client: &VcloudClient, id: &str) -> Result<()> {
    let found = client.organization().collection().find(id).await?;
    let mut org = require(found, "组织", id)?;
    print_entity(&mut org).await
}
