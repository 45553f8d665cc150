//! 任务命令

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local};
use colored::Colorize;
use serde::Serialize;
use vcloud_compute::{Task, VcloudClient};

use crate::commands::common::{field_text, require};
use crate::commands::output::{output_formatted, TableRow};
use crate::TaskAction;

pub async fn handle(client: &VcloudClient, action: TaskAction, format: &str) -> Result<()> {
    match action {
        TaskAction::Show { id } => show_task(client, &id, format).await,
        TaskAction::Wait { id } => wait_task(client, &id).await,
    }
}

#[derive(Debug, Serialize)]
struct TaskRow {
    id: String,
    operation: String,
    status: String,
    started: String,
    duration: String,
    error: String,
}

impl TableRow for TaskRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "OPERATION", "STATUS", "STARTED", "DURATION", "ERROR"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.operation.clone(),
            self.status.clone(),
            self.started.clone(),
            self.duration.clone(),
            self.error.clone(),
        ]
    }
}

impl TaskRow {
    /// 只使用已加载的属性，运行中的任务没有 endTime 也不会再次查询
    fn build(task: &Task) -> Self {
        let started = task.loaded_time("start_time");
        let ended = task.loaded_time("end_time");

        Self {
            id: task.id().to_string(),
            operation: field_text(task, "operation_name"),
            status: field_text(task, "status"),
            started: started.map(local_time).unwrap_or_else(|| "-".to_string()),
            duration: match (started, ended) {
                (Some(s), Some(e)) => format!("{}s", (e - s).num_seconds()),
                _ => "-".to_string(),
            },
            error: field_text(task, "error_message"),
        }
    }
}

fn local_time(time: DateTime<FixedOffset>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

async fn show_task(client: &VcloudClient, id: &str, format: &str) -> Result<()> {
    let found = client.task().collection(None).find(id).await?;
    let task = require(found, "任务", id)?;

    output_formatted(&[TaskRow::build(&task)], format)
}

async fn wait_task(client: &VcloudClient, id: &str) -> Result<()> {
    println!("等待任务 {} ...", id.cyan());
    client
        .task()
        .wait(id)
        .await
        .with_context(|| format!("任务 {} 未成功完成", id))?;
    println!("{} 任务 {} 完成", "✓".green().bold(), id.cyan().bold());
    Ok(())
}
