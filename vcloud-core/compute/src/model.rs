//! 懒加载模型
//!
//! 每种实体声明一张静态属性表（[`EntityKind::FIELDS`]）。构造实体时，未提供的
//! 属性标记为 [`Lazy::NotLoaded`]；首次通过 [`Entity::get`] 访问未加载属性时，
//! 实体会从记录来源重新拉取完整记录。

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::collection::RecordSource;
use crate::error::{Result, VcloudError};
use crate::parser::{self, Link};

/// 以属性名为键的记录
pub type Record = Map<String, Value>;

/// 属性状态
#[derive(Debug, Clone, PartialEq)]
pub enum Lazy<T> {
    /// 已加载
    Loaded(T),

    /// 尚未加载
    NotLoaded,
}

impl<T> Lazy<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded => None,
        }
    }
}

/// 属性声明：属性名及其在解析后文档中的路径
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub path: &'static [&'static str],
}

impl Field {
    pub const fn new(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path }
    }
}

/// 实体种类
pub trait EntityKind: Send + Sync + 'static {
    /// 种类名称
    const NAME: &'static str;

    /// 资源路径前缀，完整记录位于 `{RESOURCE_PATH}/{id}`
    const RESOURCE_PATH: &'static str;

    /// 属性表
    const FIELDS: &'static [Field];

    /// 将解析后的文档映射为属性记录
    fn normalize(document: &Value) -> Record {
        let mut record = Record::new();
        if let Some(id) = document.get("id").and_then(Value::as_str) {
            record.insert("id".to_string(), Value::String(id.to_string()));
        }
        for field in Self::FIELDS {
            if let Some(value) = parser::lookup(document, field.path) {
                record.insert(field.name.to_string(), value.clone());
            }
        }
        record
    }

    /// 校验属性名是否已声明
    fn field(name: &str) -> Result<&'static str> {
        Self::FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.name)
            .ok_or_else(|| VcloudError::UnknownAttribute {
                kind: Self::NAME,
                name: name.to_string(),
            })
    }
}

/// 从记录中得出实体 ID：优先 `id`，否则取 `href` 最后一段
pub fn record_id(record: &Record) -> Option<String> {
    let explicit = record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty() && !id.starts_with("urn:"));
    if let Some(id) = explicit {
        return Some(id.to_string());
    }
    record
        .get("href")
        .and_then(Value::as_str)
        .and_then(parser::id_from_href)
        .map(str::to_string)
}

/// 懒加载实体
pub struct Entity<K: EntityKind> {
    id: String,
    attributes: BTreeMap<&'static str, Lazy<Value>>,
    source: Arc<dyn RecordSource>,
    _kind: PhantomData<K>,
}

impl<K: EntityKind> Entity<K> {
    /// 由部分或完整记录构造实体，未提供的属性标记为未加载
    pub fn new(source: Arc<dyn RecordSource>, record: Record) -> Result<Self> {
        let id = record_id(&record).ok_or_else(|| {
            VcloudError::ParseError(format!("{} 记录缺少 id 和 href", K::NAME))
        })?;

        let attributes = K::FIELDS
            .iter()
            .map(|field| {
                let state = match record.get(field.name) {
                    Some(value) => Lazy::Loaded(value.clone()),
                    None => Lazy::NotLoaded,
                };
                (field.name, state)
            })
            .collect();

        Ok(Self {
            id,
            attributes,
            source,
            _kind: PhantomData,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &'static str {
        K::NAME
    }

    /// 读取属性；未加载时先重新加载
    pub async fn get(&mut self, name: &str) -> Result<&Lazy<Value>> {
        let key = K::field(name)?;

        let loaded = self.attributes.get(key).is_some_and(Lazy::is_loaded);
        if !loaded {
            self.reload().await?;
        }

        self.attributes
            .get(key)
            .ok_or_else(|| VcloudError::UnknownAttribute {
                kind: K::NAME,
                name: name.to_string(),
            })
    }

    /// 读取字符串属性
    pub async fn get_str(&mut self, name: &str) -> Result<Option<String>> {
        Ok(self
            .get(name)
            .await?
            .as_loaded()
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// 不触发加载，直接查看当前状态
    pub fn peek(&self, name: &str) -> Option<&Lazy<Value>> {
        self.attributes.get(name)
    }

    /// 所有属性是否都已加载
    pub fn is_fully_loaded(&self) -> bool {
        self.attributes.values().all(Lazy::is_loaded)
    }

    pub async fn name(&mut self) -> Result<Option<String>> {
        self.get_str("name").await
    }

    pub async fn href(&mut self) -> Result<Option<String>> {
        self.get_str("href").await
    }

    /// 重新拉取完整记录并覆盖属性
    pub async fn reload(&mut self) -> Result<()> {
        debug!("重新加载 {} {}", K::NAME, self.id);

        let record = self
            .source
            .get_by_id(&self.id)
            .await?
            .ok_or_else(|| VcloudError::NotFound(format!("{} {}", K::NAME, self.id)))?;

        self.merge(record);
        Ok(())
    }

    /// 合并新记录；新记录中缺失的属性保持原状态
    pub(crate) fn merge(&mut self, record: Record) {
        for field in K::FIELDS {
            if let Some(value) = record.get(field.name) {
                self.attributes
                    .insert(field.name, Lazy::Loaded(value.clone()));
            }
        }
    }

    /// 实体上的链接（需声明 `links` 属性）
    pub async fn links(&mut self) -> Result<Vec<Link>> {
        let value = match self.get("links").await? {
            Lazy::Loaded(value) => value.clone(),
            Lazy::NotLoaded => return Ok(Vec::new()),
        };

        match value {
            Value::Array(items) => items.iter().map(Link::from_value).collect(),
            Value::Object(_) => Ok(vec![Link::from_value(&value)?]),
            _ => Ok(Vec::new()),
        }
    }

    /// 按 rel 查找链接
    pub async fn link(&mut self, rel: &str) -> Result<Option<Link>> {
        Ok(self
            .links()
            .await?
            .into_iter()
            .find(|link| link.rel.as_deref() == Some(rel)))
    }

    /// 按当前状态渲染全部属性，从不触发加载
    pub fn inspect(&self) -> String {
        let parts: Vec<String> = K::FIELDS
            .iter()
            .filter_map(|field| {
                let state = self.attributes.get(field.name)?;
                Some(format!("{}={}", field.name, render(state)))
            })
            .collect();
        format!("<{} id={} {}>", K::NAME, self.id, parts.join(" "))
    }
}

fn render(state: &Lazy<Value>) -> String {
    match state {
        Lazy::Loaded(value) => value.to_string(),
        Lazy::NotLoaded => "NotLoaded".to_string(),
    }
}

impl<K: EntityKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(K::NAME);
        out.field("id", &self.id);
        for field in K::FIELDS {
            if let Some(state) = self.attributes.get(field.name) {
                out.field(field.name, &format_args!("{}", render(state)));
            }
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{record, FakeSource};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    struct Widget;

    impl EntityKind for Widget {
        const NAME: &'static str = "Widget";
        const RESOURCE_PATH: &'static str = "widget";
        const FIELDS: &'static [Field] = &[
            Field::new("name", &["name"]),
            Field::new("href", &["href"]),
            Field::new("size", &["Size"]),
            Field::new("owner", &["Owner", "name"]),
        ];
    }

    fn full_widget() -> Record {
        record(json!({
            "id": "w-1",
            "name": "alpha",
            "href": "https://vcd/api/widget/w-1",
            "size": 3,
            "owner": "ops",
        }))
    }

    #[test]
    fn test_construct_marks_missing_fields() {
        let source = Arc::new(FakeSource::new());
        let entity: Entity<Widget> = Entity::new(
            source,
            record(json!({ "href": "https://vcd/api/widget/w-9", "name": "beta" })),
        )
        .unwrap();

        assert_eq!(entity.id(), "w-9");
        assert_eq!(entity.peek("name"), Some(&Lazy::Loaded(json!("beta"))));
        assert_eq!(entity.peek("size"), Some(&Lazy::NotLoaded));
        assert_eq!(entity.peek("owner"), Some(&Lazy::NotLoaded));
        assert!(!entity.is_fully_loaded());
    }

    #[test]
    fn test_construct_requires_identity() {
        let source = Arc::new(FakeSource::new());
        let result: Result<Entity<Widget>> = Entity::new(source, record(json!({ "name": "x" })));
        assert!(matches!(result, Err(VcloudError::ParseError(_))));
    }

    #[test]
    fn test_normalize_follows_paths() {
        let document = json!({
            "name": "alpha",
            "href": "https://vcd/api/widget/w-1",
            "Size": "3",
            "Owner": { "name": "ops", "type": "user" },
            "Ignored": "x",
        });
        let normalized = Widget::normalize(&document);

        assert_eq!(normalized["size"], "3");
        assert_eq!(normalized["owner"], "ops");
        assert!(!normalized.contains_key("Ignored"));
    }

    #[tokio::test]
    async fn test_first_access_reloads_once() {
        let source = Arc::new(FakeSource::new().with_record("w-1", full_widget()));
        let mut entity: Entity<Widget> =
            Entity::new(source.clone(), record(json!({ "id": "w-1" }))).unwrap();

        for field in Widget::FIELDS {
            entity.get(field.name).await.unwrap();
        }
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 1);

        assert_eq!(entity.get("size").await.unwrap(), &Lazy::Loaded(json!(3)));
        assert_eq!(entity.name().await.unwrap().as_deref(), Some("alpha"));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 1);
        assert!(entity.is_fully_loaded());
    }

    #[tokio::test]
    async fn test_loaded_attribute_never_fetches() {
        let source = Arc::new(FakeSource::new().with_record("w-1", full_widget()));
        let mut entity: Entity<Widget> = Entity::new(
            source.clone(),
            record(json!({ "id": "w-1", "name": "alpha" })),
        )
        .unwrap();

        assert_eq!(entity.name().await.unwrap().as_deref(), Some("alpha"));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inspect_never_reloads() {
        let source = Arc::new(FakeSource::new().with_record("w-1", full_widget()));
        let mut entity: Entity<Widget> =
            Entity::new(source.clone(), record(json!({ "id": "w-1" }))).unwrap();

        let rendered = entity.inspect();
        assert!(rendered.contains("size=NotLoaded"));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 0);

        let debug = format!("{:?}", entity);
        assert!(debug.contains("NotLoaded"));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 0);

        // 检视不影响之后的懒加载
        entity.get("size").await.unwrap();
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reload_keeps_loaded_values() {
        let partial = record(json!({ "id": "w-1", "name": "alpha" }));
        let source = Arc::new(FakeSource::new().with_record("w-1", partial));
        let mut entity: Entity<Widget> = Entity::new(
            source.clone(),
            record(json!({ "id": "w-1", "size": 7 })),
        )
        .unwrap();

        let owner = entity.get("owner").await.unwrap().clone();
        assert_eq!(owner, Lazy::NotLoaded);
        assert_eq!(entity.peek("size"), Some(&Lazy::Loaded(json!(7))));
        assert_eq!(entity.peek("name"), Some(&Lazy::Loaded(json!("alpha"))));
    }

    #[tokio::test]
    async fn test_reload_missing_record() {
        let source = Arc::new(FakeSource::new());
        let mut entity: Entity<Widget> =
            Entity::new(source, record(json!({ "id": "w-404" }))).unwrap();

        assert!(matches!(
            entity.get("size").await,
            Err(VcloudError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_attribute() {
        let source = Arc::new(FakeSource::new());
        let mut entity: Entity<Widget> =
            Entity::new(source.clone(), record(json!({ "id": "w-1" }))).unwrap();

        assert!(matches!(
            entity.get("colour").await,
            Err(VcloudError::UnknownAttribute { kind: "Widget", .. })
        ));
        assert_eq!(source.get_calls.load(Ordering::SeqCst), 0);
    }
}
