//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式的通用实现

use anyhow::Result;
use serde::Serialize;
use vcloud_compute::Link;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[T]) {
    let headers = T::headers();

    // 打印表头
    let header_line: String = headers
        .iter()
        .map(|h| format!("{:<20}", h))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", header_line);
    println!("{}", "-".repeat(header_line.len()));

    // 打印数据行
    for item in items {
        let row_line: String = item
            .row()
            .iter()
            .map(|c| format!("{:<20}", c))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", row_line);
    }
}

/// JSON 格式输出
pub fn print_json<T: Serialize>(items: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(items: &[T], format: &str) -> Result<()> {
    match format {
        "json" => print_json(items)?,
        "table" => print_table(items),
        other => anyhow::bail!("不支持的输出格式: {} (可选 table/json)", other),
    }
    Ok(())
}

/// 链接行
#[derive(Debug, Serialize)]
pub struct LinkRow {
    pub rel: String,
    pub short_type: String,
    pub method_name: String,
    pub href: String,
}

impl From<&Link> for LinkRow {
    fn from(link: &Link) -> Self {
        Self {
            rel: link.rel.clone().unwrap_or_default(),
            short_type: link.short_type().unwrap_or("-").to_string(),
            method_name: link.method_name.clone().unwrap_or_else(|| "-".to_string()),
            href: link.href.clone().unwrap_or_default(),
        }
    }
}

impl TableRow for LinkRow {
    fn headers() -> Vec<&'static str> {
        vec!["REL", "TYPE", "METHOD", "HREF"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.rel.clone(),
            self.short_type.clone(),
            self.method_name.clone(),
            self.href.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_link_row() {
        let attributes: HashMap<String, String> = [
            ("rel", "down"),
            ("type", "application/vnd.vmware.vcloud.controlAccess+xml"),
            ("href", "https://vcd/api/vApp/vapp-1/controlAccess/"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let link = Link::from_attributes(&attributes).unwrap();

        let row = LinkRow::from(&link);
        assert_eq!(row.short_type, "controlAccess");
        assert_eq!(row.method_name, "down_control_access");
        assert_eq!(row.row().len(), LinkRow::headers().len());
    }

    #[test]
    fn test_unknown_format() {
        let rows: Vec<LinkRow> = Vec::new();
        assert!(output_formatted(&rows, "yaml").is_err());
        assert!(output_formatted(&rows, "json").is_ok());
    }
}
