//! vCloud CLI 应用

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "vcloud")]
#[command(about = "vCloud Director 计算资源命令行工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别（RUST_LOG 优先）
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 输出格式 (table/json)
    #[arg(short = 'f', long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 组织
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// 目录
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// 虚拟数据中心
    Vdc {
        #[command(subcommand)]
        action: VdcAction,
    },

    /// vApp
    Vapp {
        #[command(subcommand)]
        action: VAppAction,
    },

    /// 虚拟机
    Vm {
        #[command(subcommand)]
        action: VmAction,
    },

    /// 异步任务
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Subcommand)]
pub enum OrgAction {
    /// 列出组织
    List {
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
    /// 显示组织详情
    Show { id: String },
}

#[derive(Subcommand)]
pub enum CatalogAction {
    /// 列出组织下的目录
    List {
        /// 组织 ID
        #[arg(long)]
        org: String,
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
    /// 列出目录项
    Items {
        /// 目录 ID
        catalog: String,
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
}

#[derive(Subcommand)]
pub enum VdcAction {
    /// 列出组织下的 VDC
    List {
        /// 组织 ID
        #[arg(long)]
        org: String,
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
}

#[derive(Subcommand)]
pub enum VAppAction {
    /// 列出 VDC 下的 vApp
    List {
        /// VDC ID
        #[arg(long)]
        vdc: String,
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
    /// 显示 vApp 详情及其虚拟机
    Show { id: String },
}

#[derive(Subcommand)]
pub enum VmAction {
    /// 列出 vApp 中的虚拟机
    List {
        /// vApp ID
        #[arg(long)]
        vapp: String,
        /// 逐个加载完整记录
        #[arg(long)]
        eager: bool,
    },
    /// 开机并等待任务完成
    PowerOn { id: String },
    /// 查询元数据
    Metadata { id: String },
    /// 写入元数据
    SetMetadata {
        id: String,
        /// 键值对，格式 key=value
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// 显示任务
    Show { id: String },
    /// 等待任务结束
    Wait { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("vCloud CLI 启动");

    let client = commands::common::create_client(cli.config.as_deref())?;
    let format = cli.format.as_str();

    // 处理命令
    match cli.command {
        Commands::Org { action } => commands::org::handle(&client, action, format).await?,
        Commands::Catalog { action } => commands::catalog::handle(&client, action, format).await?,
        Commands::Vdc { action } => commands::vdc::handle(&client, action, format).await?,
        Commands::Vapp { action } => commands::vapp::handle(&client, action, format).await?,
        Commands::Vm { action } => commands::vm::handle(&client, action, format).await?,
        Commands::Task { action } => commands::task::handle(&client, action, format).await?,
    }

    Ok(())
}
