//! XML 响应解析
//!
//! 将 vCloud 的 XML 响应转换为嵌套的 `serde_json::Value`：
//! - 根元素的属性与子元素平铺为对象键（去掉命名空间前缀）
//! - 同名子元素合并为数组
//! - 仅含文本的子元素直接转为字符串
//! - 同时含属性和文本的元素，文本保存在 `content` 键下
//!
//! 另外负责 `<Link>` 元素的解析，根据 `rel` 与 `type` 合成方法名。

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{Result, VcloudError};

/// `<Link>` 元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// MIME 类型，如 `application/vnd.vmware.vcloud.vApp+xml`
    pub link_type: Option<String>,

    /// 关系，如 `down`、`power:powerOn`
    pub rel: Option<String>,

    /// 目标地址
    pub href: Option<String>,

    /// 合成的方法名 `{rel}_{snake_case(short_type)}`
    pub method_name: Option<String>,
}

impl Link {
    /// 从属性表构建
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Result<Self> {
        let link_type = attributes.get("type").cloned();
        let rel = attributes.get("rel").cloned();
        let href = attributes.get("href").cloned();

        let method_name = match (&rel, &link_type) {
            (Some(rel), Some(link_type)) => Some(method_name(rel, link_type)?),
            _ => None,
        };

        Ok(Self {
            link_type,
            rel,
            href,
            method_name,
        })
    }

    /// 从解析后的文档节点构建
    pub fn from_value(value: &Value) -> Result<Self> {
        let attributes = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();
        Self::from_attributes(&attributes)
    }

    /// 短类型，如 `vApp`
    pub fn short_type(&self) -> Option<&str> {
        self.link_type.as_deref().and_then(|t| short_type(t).ok())
    }
}

/// 收集元素的全部属性（本地名 → 值）
pub fn parse_attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attributes = HashMap::new();

    for attr in element.attributes() {
        let attr = attr.map_err(|e| VcloudError::ParseError(e.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }

        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| VcloudError::ParseError(e.to_string()))?
            .into_owned();
        attributes.insert(name, value);
    }

    Ok(attributes)
}

/// 解析 `<Link>` 元素
pub fn parse_link(element: &BytesStart<'_>) -> Result<Link> {
    Link::from_attributes(&parse_attributes(element)?)
}

/// 读取文档中的全部 `Link` 子元素
pub fn links(document: &Value) -> Result<Vec<Link>> {
    children(document, &["Link"])
        .into_iter()
        .map(Link::from_value)
        .collect()
}

/// MIME 类型中最后一个 `.` 与第一个 `+` 之间的部分
pub fn short_type(media_type: &str) -> Result<&str> {
    let plus = media_type.find('+').ok_or_else(|| {
        VcloudError::ParseError(format!("无效的媒体类型（缺少 '+'）: {}", media_type))
    })?;
    let head = &media_type[..plus];
    let dot = head.rfind('.').ok_or_else(|| {
        VcloudError::ParseError(format!("无效的媒体类型（缺少 '.'）: {}", media_type))
    })?;
    Ok(&head[dot + 1..])
}

/// 大写字母前插入 `_` 并转为小写
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// 合成方法名
pub fn method_name(rel: &str, media_type: &str) -> Result<String> {
    Ok(format!("{}_{}", rel, snake_case(short_type(media_type)?)))
}

/// href 的最后一段作为资源 ID
pub fn id_from_href(href: &str) -> Option<&str> {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// 按路径取值
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// 按路径取子元素，单个或数组统一展开为列表
pub fn children<'a>(value: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    match lookup(value, path) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item) if item.is_object() => vec![item],
        _ => Vec::new(),
    }
}

/// 解析中的元素
struct Node {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Node {
    fn open(element: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let fields = parse_attributes(element)?
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn close(self, is_root: bool) -> (String, Value) {
        let Node {
            name,
            mut fields,
            text,
        } = self;

        if fields.is_empty() && !is_root {
            return (name, Value::String(text));
        }
        if !text.is_empty() {
            fields.insert("content".to_string(), Value::String(text));
        }
        (name, Value::Object(fields))
    }
}

fn attach(parent: &mut Node, name: String, value: Value) {
    match parent.fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.fields.insert(name, value);
        }
    }
}

/// 解析 XML 文档
pub fn parse_document(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            VcloudError::ParseError(format!(
                "XML 解析失败 (位置 {}): {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => stack.push(Node::open(e)?),
            Event::Empty(ref e) => {
                let node = Node::open(e)?;
                match stack.last_mut() {
                    Some(parent) => {
                        let (name, value) = node.close(false);
                        attach(parent, name, value);
                    }
                    None => root = Some(node.close(true).1),
                }
            }
            Event::Text(ref t) => {
                if let Some(node) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| VcloudError::ParseError(e.to_string()))?;
                    node.text.push_str(text.trim());
                }
            }
            Event::CData(ref c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| VcloudError::ParseError("多余的结束标签".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => {
                        let (name, value) = node.close(false);
                        attach(parent, name, value);
                    }
                    None => root = Some(node.close(true).1),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(VcloudError::ParseError("XML 文档不完整".to_string()));
    }
    root.ok_or_else(|| VcloudError::ParseError("XML 文档为空".to_string()))
}
