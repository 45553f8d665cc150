//! 会话与集合集成测试
//!
//! 在 127.0.0.1 的随机端口上启动一个 axum 实现的 vCloud 假服务，验证：
//! - 登录次数与会话 Cookie 失效
//! - 重新认证策略
//! - 基于 HTTP 的集合（懒索引 / 完整加载 / 查找）
//! - 开机与任务轮询
//!
//! 运行方法:
//! ```bash
//! cargo test -p vcloud-compute --test session_tests -- --nocapture
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use vcloud_compute::{Lazy, ReauthPolicy, VcloudClient, VcloudConfig, VcloudError};

const USERNAME: &str = "admin@System";
const PASSWORD: &str = "secret";
const ACCEPT: &str = "application/*+xml;version=1.5";
const BASE: &str = "https://vcd.example.com/api";

/// vCloud 假服务状态
#[derive(Default)]
struct FakeVcloud {
    logins: AtomicUsize,
    requests: AtomicUsize,
    token: Mutex<Option<String>>,
    task_polls: Mutex<HashMap<String, usize>>,
}

impl FakeVcloud {
    fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn polls(&self, task_id: &str) -> usize {
        self.task_polls
            .lock()
            .unwrap()
            .get(task_id)
            .copied()
            .unwrap_or_default()
    }

    /// 服务端使会话失效
    fn revoke(&self) {
        *self.token.lock().unwrap() = None;
    }

    /// 校验 Cookie 与 Accept 头，失败时返回错误响应
    fn guard(&self, headers: &HeaderMap) -> Option<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
        if accept != Some(ACCEPT) {
            return Some(StatusCode::NOT_ACCEPTABLE.into_response());
        }

        let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
        let token = self.token.lock().unwrap().clone();
        match (cookie, token) {
            (Some(cookie), Some(token)) if cookie == token => None,
            _ => Some(xml(StatusCode::UNAUTHORIZED, error_doc(401, "session expired"))),
        }
    }
}

type Shared = Arc<FakeVcloud>;

fn xml(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/vnd.vmware.vcloud+xml")],
        body,
    )
        .into_response()
}

fn error_doc(code: u16, message: &str) -> String {
    format!(
        r#"<Error xmlns="http://www.vmware.com/vcloud/v1.5" majorErrorCode="{}" message="{}"/>"#,
        code, message
    )
}

fn not_found() -> Response {
    xml(StatusCode::NOT_FOUND, error_doc(404, "not found"))
}

async fn login(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let expected = format!("Basic {}", STANDARD.encode(format!("{}:{}", USERNAME, PASSWORD)));
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected.as_str()) {
        return xml(StatusCode::UNAUTHORIZED, error_doc(401, "bad credentials"));
    }

    let n = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("vcloud-token=tok-{}", n);
    *state.token.lock().unwrap() = Some(token.clone());

    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("{}; Secure; Path=/", token))],
        format!(r#"<Session user="{}" org="System"/>"#, USERNAME),
    )
        .into_response()
}

async fn org_list(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }
    xml(
        StatusCode::OK,
        format!(
            r#"<OrgList xmlns="http://www.vmware.com/vcloud/v1.5" type="application/vnd.vmware.vcloud.orgList+xml" href="{base}/org/">
    <Org type="application/vnd.vmware.vcloud.org+xml" name="lab" href="{base}/org/org-1"/>
    <Org type="application/vnd.vmware.vcloud.org+xml" name="retired" href="{base}/org/org-2"/>
</OrgList>"#,
            base = BASE
        ),
    )
}

async fn org(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }
    if id != "org-1" {
        return not_found();
    }
    xml(
        StatusCode::OK,
        format!(
            r#"<Org xmlns="http://www.vmware.com/vcloud/v1.5" name="lab" id="urn:vcloud:org:org-1" type="application/vnd.vmware.vcloud.org+xml" href="{base}/org/org-1">
    <Link rel="down" type="application/vnd.vmware.vcloud.vdc+xml" name="dc1" href="{base}/vdc/vdc-1"/>
    <Link rel="down" type="application/vnd.vmware.vcloud.catalog+xml" name="public" href="{base}/catalog/cat-1"/>
    <Link rel="down" type="application/vnd.vmware.vcloud.tasksList+xml" href="{base}/tasksList/org-1"/>
    <Description>Lab organization</Description>
    <FullName>Lab Org</FullName>
</Org>"#,
            base = BASE
        ),
    )
}

async fn vdc(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }
    if id != "vdc-1" {
        return not_found();
    }
    xml(
        StatusCode::OK,
        format!(
            r#"<Vdc xmlns="http://www.vmware.com/vcloud/v1.5" status="1" name="dc1" type="application/vnd.vmware.vcloud.vdc+xml" href="{base}/vdc/vdc-1">
    <AllocationModel>AllocationPool</AllocationModel>
    <ResourceEntities>
        <ResourceEntity type="application/vnd.vmware.vcloud.vApp+xml" name="web" href="{base}/vApp/vapp-1"/>
        <ResourceEntity type="application/vnd.vmware.vcloud.vApp+xml" name="db" href="{base}/vApp/vapp-2"/>
        <ResourceEntity type="application/vnd.vmware.vcloud.vAppTemplate+xml" name="centos" href="{base}/vAppTemplate/vappTemplate-1"/>
    </ResourceEntities>
    <IsEnabled>true</IsEnabled>
</Vdc>"#,
            base = BASE
        ),
    )
}

async fn vapp(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }
    let body = match id.as_str() {
        "vapp-1" => format!(
            r#"<VApp xmlns="http://www.vmware.com/vcloud/v1.5" status="8" deployed="false" name="web" type="application/vnd.vmware.vcloud.vApp+xml" href="{base}/vApp/vapp-1">
    <Link rel="power:powerOn" href="{base}/vApp/vapp-1/power/action/powerOn"/>
    <Owner type="application/vnd.vmware.vcloud.owner+xml">
        <User type="application/vnd.vmware.admin.user+xml" name="ops" href="{base}/admin/user/u-1"/>
    </Owner>
    <Children>
        <Vm status="8" deployed="false" name="web-vm" type="application/vnd.vmware.vcloud.vm+xml" href="{base}/vApp/vm-1"/>
        <Vm status="8" deployed="false" name="broken-vm" type="application/vnd.vmware.vcloud.vm+xml" href="{base}/vApp/vm-2"/>
    </Children>
</VApp>"#,
            base = BASE
        ),
        "vapp-2" => format!(
            r#"<VApp xmlns="http://www.vmware.com/vcloud/v1.5" status="4" deployed="true" name="db" href="{base}/vApp/vapp-2"/>"#,
            base = BASE
        ),
        "vm-1" | "vm-2" => format!(
            r#"<Vm xmlns="http://www.vmware.com/vcloud/v1.5" status="8" deployed="false" name="{id}" type="application/vnd.vmware.vcloud.vm+xml" href="{base}/vApp/{id}">
    <GuestCustomizationSection><ComputerName>{id}-host</ComputerName></GuestCustomizationSection>
</Vm>"#,
            base = BASE,
            id = id
        ),
        _ => return not_found(),
    };
    xml(StatusCode::OK, body)
}

async fn power_on(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }
    let task_id = match id.as_str() {
        "vm-1" => "task-ok",
        "vm-2" => "task-fail",
        _ => return not_found(),
    };
    xml(
        StatusCode::ACCEPTED,
        format!(
            r#"<Task xmlns="http://www.vmware.com/vcloud/v1.5" status="queued" operationName="vappPowerOn" name="task" type="application/vnd.vmware.vcloud.task+xml" href="{base}/task/{task_id}"/>"#,
            base = BASE,
            task_id = task_id
        ),
    )
}

async fn task(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Some(denied) = state.guard(&headers) {
        return denied;
    }

    let poll = {
        let mut polls = state.task_polls.lock().unwrap();
        let count = polls.entry(id.clone()).or_default();
        *count += 1;
        *count
    };

    let (status, error) = match (id.as_str(), poll) {
        ("task-ok", 1) => ("queued", ""),
        ("task-ok", 2) => ("running", ""),
        ("task-ok", _) => ("success", ""),
        ("task-fail", 1) => ("running", ""),
        ("task-fail", _) => (
            "error",
            r#"<Error minorErrorCode="INTERNAL" message="disk full" majorErrorCode="500"/>"#,
        ),
        _ => return not_found(),
    };

    xml(
        StatusCode::OK,
        format!(
            r#"<Task xmlns="http://www.vmware.com/vcloud/v1.5" status="{status}" operationName="vappPowerOn" name="task" type="application/vnd.vmware.vcloud.task+xml" href="{base}/task/{id}">{error}</Task>"#,
            status = status,
            base = BASE,
            id = id,
            error = error
        ),
    )
}

/// 启动假服务，返回共享状态与端口
async fn spawn_fake_vcloud() -> (Shared, u16) {
    let state: Shared = Arc::new(FakeVcloud::default());

    let app = Router::new()
        .route("/api/sessions", post(login))
        .route("/api/org/", get(org_list))
        .route("/api/org/:id", get(org))
        .route("/api/vdc/:id", get(vdc))
        .route("/api/vApp/:id", get(vapp))
        .route("/api/vApp/:id/power/action/powerOn", post(power_on))
        .route("/api/task/:id", get(task))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, port)
}

fn config_for(port: u16, password: &str) -> VcloudConfig {
    let mut config = VcloudConfig::new("127.0.0.1", USERNAME, password);
    config.scheme = "http".to_string();
    config.port = port;
    config.task_poll.interval_ms = 5;
    config
}

async fn setup() -> (Shared, VcloudClient) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vcloud_compute=debug")
        .with_test_writer()
        .try_init();

    let (state, port) = spawn_fake_vcloud().await;
    let client = VcloudClient::new(config_for(port, PASSWORD)).unwrap();
    (state, client)
}

// ============================================
// 会话
// ============================================

#[tokio::test]
async fn test_first_request_logs_in_once() {
    let (state, client) = setup().await;

    client.organization().list().await.unwrap();
    client.organization().list().await.unwrap();

    assert_eq!(state.logins(), 1);
    assert_eq!(state.requests(), 2);
    assert!(client.has_session().await);
}

#[tokio::test]
async fn test_reset_session_forces_one_login() {
    let (state, client) = setup().await;

    client.organization().list().await.unwrap();
    client.reset_session().await;
    client.organization().list().await.unwrap();
    client.organization().list().await.unwrap();

    assert_eq!(state.logins(), 2);
}

#[tokio::test]
async fn test_rejected_credentials() {
    let (state, port) = spawn_fake_vcloud().await;
    let client = VcloudClient::new(config_for(port, "wrong")).unwrap();

    let result = client.organization().list().await;
    assert!(matches!(result, Err(VcloudError::AuthError(_))));
    assert_eq!(state.logins(), 0);
    assert_eq!(state.requests(), 0);
}

#[tokio::test]
async fn test_revoked_session_surfaces_401_by_default() {
    let (state, client) = setup().await;

    client.organization().list().await.unwrap();
    state.revoke();

    match client.organization().list().await {
        Err(VcloudError::HttpError { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("session expired"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!client.has_session().await);

    client.organization().list().await.unwrap();
    assert_eq!(state.logins(), 2);
}

#[tokio::test]
async fn test_revoked_session_retry_once() {
    let (state, port) = spawn_fake_vcloud().await;
    let mut config = config_for(port, PASSWORD);
    config.reauth = ReauthPolicy::RetryOnce;
    let client = VcloudClient::new(config).unwrap();

    client.organization().list().await.unwrap();
    state.revoke();

    let document = client.organization().list().await.unwrap();
    assert!(document["Org"].is_array());
    assert_eq!(state.logins(), 2);
    assert_eq!(state.requests(), 3);
}

#[tokio::test]
async fn test_get_href_follows_absolute_link() {
    let (_state, client) = setup().await;

    let document = client
        .get_href("https://vcd.example.com/api/vdc/vdc-1")
        .await
        .unwrap();
    assert_eq!(document["name"], "dc1");
    assert_eq!(document["AllocationModel"], "AllocationPool");
}

// ============================================
// 集合
// ============================================

#[tokio::test]
async fn test_lazy_index_is_one_request() {
    let (state, client) = setup().await;
    let vapps = client.vapp().collection("vdc-1");

    let mut items = vapps.list(true).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(state.requests(), 1);

    let web = &mut items[0];
    assert_eq!(web.peek("name"), Some(&Lazy::Loaded("web".into())));
    assert_eq!(web.peek("owner"), Some(&Lazy::NotLoaded));
    assert_eq!(state.requests(), 1);

    // 首次访问未加载属性时拉取完整记录
    assert_eq!(web.get_str("owner").await.unwrap().as_deref(), Some("ops"));
    assert_eq!(web.get_str("status").await.unwrap().as_deref(), Some("8"));
    assert_eq!(state.requests(), 2);
}

#[tokio::test]
async fn test_full_listing_is_one_plus_n_requests() {
    let (state, client) = setup().await;
    let vapps = client.vapp().collection("vdc-1");

    let items = vapps.list(false).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(state.requests(), 3);
    assert_eq!(items[1].peek("deployed"), Some(&Lazy::Loaded("true".into())));
}

#[tokio::test]
async fn test_full_listing_skips_vanished_items() {
    let (_state, client) = setup().await;

    let orgs = client.organization().collection().list(false).await.unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].id(), "org-1");
    assert_eq!(orgs[0].peek("full_name"), Some(&Lazy::Loaded("Lab Org".into())));
}

#[tokio::test]
async fn test_find_and_find_by_name() {
    let (_state, client) = setup().await;
    let vdcs = client.vdc().collection("org-1");

    assert!(vdcs.find("vdc-404").await.unwrap().is_none());
    assert!(vdcs.find_by_name("DC1").await.unwrap().is_none());

    let mut dc = vdcs.find_by_name("dc1").await.unwrap().unwrap();
    assert_eq!(dc.id(), "vdc-1");
    assert_eq!(
        dc.get_str("allocation_model").await.unwrap().as_deref(),
        Some("AllocationPool")
    );

    let catalogs = client.catalog().collection("org-1").list(true).await.unwrap();
    assert_eq!(catalogs.len(), 1);
    assert_eq!(catalogs[0].id(), "cat-1");
}

// ============================================
// 开机与任务
// ============================================

#[tokio::test]
async fn test_power_on_waits_for_success() {
    let (state, client) = setup().await;

    client.vm().power_on("vm-1").await.unwrap();
    assert_eq!(state.polls("task-ok"), 3);
}

#[tokio::test]
async fn test_power_on_task_failure() {
    let (state, client) = setup().await;

    match client.vm().power_on("vm-2").await {
        Err(VcloudError::TaskFailed { status, message }) => {
            assert_eq!(status, "error");
            assert_eq!(message, "disk full");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(state.polls("task-fail"), 2);
}

#[tokio::test]
async fn test_vm_entity_power_on() {
    let (state, client) = setup().await;

    let mut vm = client
        .vm()
        .collection("vapp-1")
        .find_by_name("web-vm")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        vm.get_str("computer_name").await.unwrap().as_deref(),
        Some("vm-1-host")
    );

    vm.power_on(&client).await.unwrap();
    assert_eq!(state.polls("task-ok"), 3);
}
