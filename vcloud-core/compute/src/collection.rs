//! 集合：按 ID / 名称检索实体
//!
//! 两种列举方式：
//! - 懒索引：一次摘要查询，实体只填充摘要字段
//! - 完整加载：摘要查询后逐个拉取完整记录（1+N 次请求）

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, VcloudError};
use crate::model::{record_id, Entity, EntityKind, Record};

/// 列表中的单项摘要
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub id: String,

    /// 列表项可能没有名称
    pub name: Option<String>,

    /// 摘要中携带的属性
    pub record: Record,
}

impl Summary {
    pub fn from_record(mut record: Record) -> Result<Self> {
        let id = record_id(&record)
            .ok_or_else(|| VcloudError::ParseError("列表项缺少 id 和 href".to_string()))?;
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        record.insert("id".to_string(), Value::String(id.clone()));
        Ok(Self { id, name, record })
    }
}

/// 集合与实体共享的取数接口
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// 列出摘要
    async fn item_list(&self) -> Result<Vec<Summary>>;

    /// 按 ID 获取完整记录，不存在时返回 `None`
    async fn get_by_id(&self, id: &str) -> Result<Option<Record>>;
}

/// 某一实体种类的集合
pub struct Collection<K: EntityKind> {
    source: Arc<dyn RecordSource>,
    _kind: PhantomData<K>,
}

impl<K: EntityKind> Clone for Collection<K> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> Collection<K> {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            _kind: PhantomData,
        }
    }

    /// 列举全部实体
    ///
    /// `lazy` 为 true 时只做一次摘要查询；否则逐个拉取完整记录。
    pub async fn list(&self, lazy: bool) -> Result<Vec<Entity<K>>> {
        if lazy {
            self.index().await
        } else {
            self.list_full().await
        }
    }

    /// 懒索引
    pub async fn index(&self) -> Result<Vec<Entity<K>>> {
        let summaries = self.summaries().await?;
        summaries
            .into_iter()
            .map(|summary| self.new_entity(summary.record))
            .collect()
    }

    /// 完整加载
    pub async fn list_full(&self) -> Result<Vec<Entity<K>>> {
        let summaries = self.summaries().await?;
        let mut entities = Vec::with_capacity(summaries.len());

        for summary in summaries {
            match self.source.get_by_id(&summary.id).await? {
                Some(record) => entities.push(self.new_entity(record)?),
                None => debug!("{} {} 已不存在，跳过", K::NAME, summary.id),
            }
        }

        Ok(entities)
    }

    /// 摘要列表
    pub async fn summaries(&self) -> Result<Vec<Summary>> {
        info!("查询 {} 列表", K::NAME);
        self.source.item_list().await
    }

    /// 按 ID 查找，404 时返回 `None`
    pub async fn find(&self, id: &str) -> Result<Option<Entity<K>>> {
        info!("查询 {} 详情: {}", K::NAME, id);
        match self.source.get_by_id(id).await? {
            Some(record) => Ok(Some(self.new_entity(record)?)),
            None => Ok(None),
        }
    }

    /// 按名称精确匹配（区分大小写）
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Entity<K>>> {
        let found = self
            .summaries()
            .await?
            .into_iter()
            .find(|summary| summary.name.as_deref() == Some(name));

        match found {
            Some(summary) => self.find(&summary.id).await,
            None => Ok(None),
        }
    }

    /// 由记录构造实体，共享本集合的记录来源
    pub fn new_entity(&self, record: Record) -> Result<Entity<K>> {
        Entity::new(self.source.clone(), record)
    }
}
