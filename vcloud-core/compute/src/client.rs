//! vCloud 客户端核心实现
//!
//! 负责会话 Cookie 的获取与失效、请求发送以及响应解析。同一客户端的克隆共享
//! 同一个会话。

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE,
};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{
    CatalogApi, MetadataApi, NetworkApi, OrganizationApi, TaskApi, VAppApi, VdcApi, VmApi,
};
use crate::config::{ReauthPolicy, VcloudConfig};
use crate::error::{Result, VcloudError};
use crate::models::{kind, Task};
use crate::parser;
use crate::source::{ApiSource, Listing};
use crate::task::TaskPoller;

/// 单次 API 请求
#[derive(Debug, Clone)]
pub struct VcloudRequest {
    pub method: Method,

    /// 相对于 API 根路径的路径；`override_path` 为 true 时为绝对路径
    pub path: String,

    pub override_path: bool,

    /// 附加请求头，覆盖默认的 Accept
    pub headers: HeaderMap,

    pub body: Option<String>,

    /// 期望的响应状态码
    pub expects: u16,
}

impl VcloudRequest {
    pub fn new(method: Method, path: impl Into<String>, expects: u16) -> Self {
        Self {
            method,
            path: path.into(),
            override_path: false,
            headers: HeaderMap::new(),
            body: None,
            expects,
        }
    }

    /// GET，期望 200
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, 200)
    }

    /// 异步操作，期望 202
    pub fn task(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, 202)
    }

    pub fn override_path(mut self) -> Self {
        self.override_path = true;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, content_type: &'static str, body: String) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.body = Some(body);
        self
    }
}

/// vCloud 客户端
#[derive(Clone)]
pub struct VcloudClient {
    /// 配置
    config: Arc<VcloudConfig>,

    /// HTTP 客户端
    http_client: Client,

    /// 会话 Cookie
    cookie: Arc<RwLock<Option<String>>>,
}

impl VcloudClient {
    /// 创建新的 vCloud 客户端
    pub fn new(config: VcloudConfig) -> Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| VcloudError::Connection(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
            cookie: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &VcloudConfig {
        &self.config
    }

    /// 登录并返回会话 Cookie（不缓存）
    pub async fn auth_token(&self) -> Result<String> {
        if !self.config.has_credentials() {
            return Err(VcloudError::AuthError(
                "未配置 vCloud 用户名或密码".to_string(),
            ));
        }

        info!("vCloud 登录: {}", self.config.username);

        let url = format!("{}{}/sessions", self.config.endpoint(), self.config.path);
        let credentials = STANDARD.encode(format!(
            "{}:{}",
            self.config.username, self.config.password
        ));

        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, format!("Basic {}", credentials))
            .header(ACCEPT, self.config.accept_header())
            .send()
            .await
            .map_err(|e| VcloudError::Connection(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("vCloud 登录失败: {} - {}", status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    VcloudError::AuthError(format!("登录被拒绝 ({})", status.as_u16()))
                }
                _ => VcloudError::HttpError {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(session_cookie)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| VcloudError::AuthError("登录响应缺少 Set-Cookie".to_string()))?;

        info!("vCloud 登录成功");
        Ok(cookie)
    }

    /// 获取缓存的会话 Cookie，没有时先登录
    async fn session(&self) -> Result<String> {
        let cached = self.cookie.read().await.clone();
        if let Some(cookie) = cached {
            return Ok(cookie);
        }

        let cookie = self.auth_token().await?;
        *self.cookie.write().await = Some(cookie.clone());
        Ok(cookie)
    }

    /// 清除会话，下次请求重新登录
    pub async fn reset_session(&self) {
        *self.cookie.write().await = None;
    }

    /// 是否持有会话
    pub async fn has_session(&self) -> bool {
        self.cookie.read().await.is_some()
    }

    /// 发送请求并解析响应
    pub async fn request(&self, request: VcloudRequest) -> Result<Value> {
        let cookie = self.session().await?;

        match self.do_request(&request, &cookie).await {
            Err(e) if e.is_unauthorized() && self.config.reauth == ReauthPolicy::RetryOnce => {
                info!("会话已失效，重新登录后重试: {}", request.path);
                let cookie = self.session().await?;
                self.do_request(&request, &cookie).await
            }
            other => other,
        }
    }

    /// 按完整 href 发送 GET
    pub async fn get_href(&self, href: &str) -> Result<Value> {
        let path = match url::Url::parse(href) {
            Ok(url) => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
            Err(_) => href.to_string(),
        };
        self.request(VcloudRequest::get(path).override_path()).await
    }

    async fn do_request(&self, request: &VcloudRequest, cookie: &str) -> Result<Value> {
        let url = self.url_for(request);
        debug!("vCloud API 请求: {} {}", request.method, url);

        let result = self.exchange(request, &url, cookie).await;
        if let Err(e) = &result {
            match e {
                VcloudError::HttpError { status, body } => {
                    warn!("API 请求失败: {} {} - {}", request.method, status, body)
                }
                other => warn!("API 请求失败: {} {} - {}", request.method, url, other),
            }
            self.reset_session().await;
        }
        result
    }

    async fn exchange(&self, request: &VcloudRequest, url: &str, cookie: &str) -> Result<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&self.config.accept_header())?);
        headers.insert(COOKIE, header_value(cookie)?);
        headers.extend(request.headers.clone());

        let mut builder = self
            .http_client
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| VcloudError::Connection(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| VcloudError::Connection(e.to_string()))?;

        if status != request.expects {
            return Err(VcloudError::HttpError { status, body: text });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        parser::parse_document(&text)
    }

    pub(crate) fn url_for(&self, request: &VcloudRequest) -> String {
        if request.override_path {
            format!("{}{}", self.config.endpoint(), request.path)
        } else {
            format!(
                "{}{}/{}",
                self.config.endpoint(),
                self.config.path,
                request.path.trim_start_matches('/')
            )
        }
    }

    /// 按配置创建任务轮询器
    pub fn poller(&self) -> TaskPoller {
        TaskPoller::new(&self.config.task_poll)
    }

    /// 由 202 响应体构建 Task 实体
    pub fn make_task_object(&self, response: &Value) -> Result<Task> {
        use crate::model::EntityKind;

        let record = kind::Task::normalize(response);
        let source = ApiSource::<kind::Task>::new(self.clone(), Listing::Unscoped);
        Task::new(Arc::new(source), record)
    }

    /// 等待 202 响应对应的任务完成
    pub async fn process_task(&self, response: &Value) -> Result<()> {
        let mut task = self.make_task_object(response)?;
        self.poller().await_completion(&mut task).await
    }

    /// 获取组织 API
    pub fn organization(&self) -> OrganizationApi<'_> {
        OrganizationApi::new(self)
    }

    /// 获取目录 API
    pub fn catalog(&self) -> CatalogApi<'_> {
        CatalogApi::new(self)
    }

    /// 获取虚拟数据中心 API
    pub fn vdc(&self) -> VdcApi<'_> {
        VdcApi::new(self)
    }

    /// 获取 vApp API
    pub fn vapp(&self) -> VAppApi<'_> {
        VAppApi::new(self)
    }

    /// 获取虚拟机 API
    pub fn vm(&self) -> VmApi<'_> {
        VmApi::new(self)
    }

    /// 获取任务 API
    pub fn task(&self) -> TaskApi<'_> {
        TaskApi::new(self)
    }

    /// 获取网络 API
    pub fn network(&self) -> NetworkApi<'_> {
        NetworkApi::new(self)
    }

    /// 获取元数据 API
    pub fn metadata(&self) -> MetadataApi<'_> {
        MetadataApi::new(self)
    }
}

/// `Set-Cookie` 中的 `name=value` 部分
fn session_cookie(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| VcloudError::ParseError(format!("无效的请求头 {:?}: {}", value, e)))
}
