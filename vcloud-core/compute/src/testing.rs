//! 单元测试用的内存记录来源

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::collection::{RecordSource, Summary};
use crate::error::Result;
use crate::model::Record;

pub(crate) fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

/// 记录来源假实现，统计调用次数
///
/// 同一 ID 可登记多个版本，每次 `get_by_id` 依次返回，最后一个版本保持不变。
#[derive(Default)]
pub(crate) struct FakeSource {
    summaries: Vec<Summary>,
    records: Mutex<HashMap<String, VecDeque<Record>>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, id: &str, name: &str) -> Self {
        self.summaries.push(Summary {
            id: id.to_string(),
            name: Some(name.to_string()),
            record: record(json!({ "id": id, "name": name })),
        });
        self
    }

    /// 由原始列表项登记摘要
    pub fn with_summary_record(mut self, record: Record) -> Self {
        self.summaries.push(Summary::from_record(record).unwrap());
        self
    }

    pub fn with_record(self, id: &str, record: Record) -> Self {
        self.with_versions(id, vec![record])
    }

    pub fn with_versions(self, id: &str, versions: Vec<Record>) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records
                .entry(id.to_string())
                .or_default()
                .extend(versions);
        }
        self
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn item_list(&self) -> Result<Vec<Summary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.summaries.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(id).and_then(|versions| {
            if versions.len() > 1 {
                versions.pop_front()
            } else {
                versions.front().cloned()
            }
        }))
    }
}
