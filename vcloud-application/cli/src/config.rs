//! CLI 配置管理
//!
//! 配置文件查找顺序：`--config` 参数、`$VCLOUD_CONFIG`、`~/.config/vcloud/config.toml`。
//! 文件不存在时完全依赖环境变量（`VCLOUD_HOST` 等）。

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use vcloud_compute::VcloudConfig;

/// 配置文件环境变量
pub const CONFIG_ENV: &str = "VCLOUD_CONFIG";

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("无法获取用户主目录")?;
    Ok(home.join(".config").join("vcloud").join("config.toml"))
}

/// 确定配置文件路径
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

/// 加载客户端配置
pub fn load(explicit: Option<&Path>) -> Result<VcloudConfig> {
    let path = config_path(explicit)?;

    let mut config = if path.exists() {
        debug!("加载配置文件: {:?}", path);
        VcloudConfig::load_from_file(&path)?
    } else if explicit.is_some() {
        anyhow::bail!("配置文件不存在: {:?}", path);
    } else {
        debug!("配置文件不存在，使用环境变量: {:?}", path);
        VcloudConfig::new("", "", "")
    };

    config.apply_env_vars()?;
    config
        .validate()
        .with_context(|| format!("配置无效 (配置文件: {:?})", path))?;

    Ok(config)
}
