//! 目录命令

use anyhow::Result;
use serde::Serialize;
use vcloud_compute::{Catalog, CatalogItem, VcloudClient};

use crate::commands::common::field_text;
use crate::commands::output::{output_formatted, TableRow};
use crate::CatalogAction;

pub async fn handle(client: &VcloudClient, action: CatalogAction, format: &str) -> Result<()> {
    match action {
        CatalogAction::List { org, eager } => {
            let catalogs = client.catalog().collection(&org).list(!eager).await?;
            let rows: Vec<CatalogRow> = catalogs.iter().map(CatalogRow::from).collect();
            output_formatted(&rows, format)
        }
        CatalogAction::Items { catalog, eager } => {
            let items = client.catalog().items(&catalog).list(!eager).await?;
            let rows: Vec<CatalogItemRow> = items.iter().map(CatalogItemRow::from).collect();
            output_formatted(&rows, format)
        }
    }
}

#[derive(Debug, Serialize)]
struct CatalogRow {
    id: String,
    name: String,
    published: String,
}

impl From<&Catalog> for CatalogRow {
    fn from(catalog: &Catalog) -> Self {
        Self {
            id: catalog.id().to_string(),
            name: field_text(catalog, "name"),
            published: field_text(catalog, "is_published"),
        }
    }
}

impl TableRow for CatalogRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "PUBLISHED"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone(), self.published.clone()]
    }
}

#[derive(Debug, Serialize)]
struct CatalogItemRow {
    id: String,
    name: String,
    entity_type: String,
    entity_href: String,
}

impl From<&CatalogItem> for CatalogItemRow {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id().to_string(),
            name: field_text(item, "name"),
            entity_type: field_text(item, "entity_type"),
            entity_href: field_text(item, "entity_href"),
        }
    }
}

impl TableRow for CatalogItemRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "ENTITY TYPE", "ENTITY HREF"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.entity_type.clone(),
            self.entity_href.clone(),
        ]
    }
}
