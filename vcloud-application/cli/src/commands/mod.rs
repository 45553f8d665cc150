//! CLI 命令处理模块

pub mod catalog;
pub mod common; // 公共工具函数
pub mod org;
pub mod output; // 输出格式化
pub mod task;
pub mod vapp;
pub mod vdc;
pub mod vm;
