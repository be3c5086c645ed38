//! subdomain からテナントを解決 → TenantCtx を extensions に入れる
//!
//! - `Host` の先頭ラベルを tenant id とみなす (`acme.example.com` → `acme`)
//! - port は剥がさない。最後のラベルに付くだけなので先頭ラベルには影響しない
//! - loopback (`127.0.0.1`) 宛ては subdomain を持ち得ないので常に拒否
//! - テナントの存在確認はしない (未登録テナントも後段に流す)

use std::borrow::Cow;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::extractors::{TenantCtx, TenantId};
use crate::error::TenantError;
use crate::state::AppState;

/// Hosts containing this are never tenant-scoped.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// 全ルートに tenant 解決を掛ける。
///
/// 例：
/// ```ignore
/// let router = api::routes();
/// let router = middleware::tenant::apply(router, state.clone());
/// let app = router.with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, tenant_middleware))
}

/// Extract the tenant identifier from a raw host string.
///
/// Pure and allocation-light; the same host always yields the same result.
pub fn resolve_tenant(host: &str) -> Result<TenantId, TenantError> {
    if host.contains(LOOPBACK_HOST) {
        return Err(TenantError::MissingSubdomain);
    }

    let mut labels = host.split('.');
    let first = labels.next().unwrap_or_default();

    // `domain.tld` や `localhost` のように subdomain の位置が無い
    if labels.clone().count() < 2 {
        return Err(TenantError::MissingSubdomain);
    }

    TenantId::new(first).ok_or(TenantError::EmptyTenantId)
}

fn request_host(req: &Request<Body>) -> Cow<'_, str> {
    // HTTP/1.1 は Host ヘッダ、HTTP/2 は :authority (URI) に入る
    // 非 ASCII のラベルも弾かない (文字種の検証はしない)
    match req.headers().get(header::HOST) {
        Some(v) => String::from_utf8_lossy(v.as_bytes()),
        None => Cow::Borrowed(
            req.uri()
                .authority()
                .map(|a| a.as_str())
                .unwrap_or_default(),
        ),
    }
}

async fn tenant_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let tenant_id = match resolve_tenant(&request_host(&req)) {
        Ok(tenant_id) => tenant_id,
        Err(err) => {
            tracing::warn!(
                host = %request_host(&req),
                error = %err,
                "tenant resolution failed"
            );
            return err.into_response();
        }
    };

    tracing::debug!(tenant_id = %tenant_id, "tenant resolved");

    state.db.set_tenant(tenant_id.as_str());

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(TenantCtx::new(tenant_id));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        body::to_bytes,
        http::{HeaderValue, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::database::testing::RecordingDb;

    fn resolved(host: &str) -> Option<String> {
        resolve_tenant(host).ok().map(|t| t.to_string())
    }

    #[test]
    fn loopback_hosts_are_rejected() {
        for host in ["127.0.0.1", "127.0.0.1:8080", "a.b.127.0.0.1", "tenant.127.0.0.1.nip.io"] {
            assert_eq!(
                resolve_tenant(host),
                Err(TenantError::MissingSubdomain),
                "host {host}"
            );
        }
    }

    #[test]
    fn hosts_without_subdomain_are_rejected() {
        for host in ["", "localhost", "localhost:3000", "example.com", "example.com:8080"] {
            assert_eq!(
                resolve_tenant(host),
                Err(TenantError::MissingSubdomain),
                "host {host}"
            );
        }
    }

    #[test]
    fn first_label_is_the_tenant() {
        assert_eq!(resolved("tenant.app.localhost").as_deref(), Some("tenant"));
        assert_eq!(resolved("acme.example.com").as_deref(), Some("acme"));
        assert_eq!(resolved("acme.example.com:8080").as_deref(), Some("acme"));
        assert_eq!(resolved("a.b.c.d").as_deref(), Some("a"));
    }

    #[test]
    fn tenant_case_is_preserved() {
        assert_eq!(resolved("AcMe.example.com").as_deref(), Some("AcMe"));
    }

    #[test]
    fn empty_first_label_is_rejected() {
        assert_eq!(
            resolve_tenant(".app.localhost"),
            Err(TenantError::EmptyTenantId)
        );
    }

    #[test]
    fn resolution_is_stable_across_calls() {
        for host in ["test.app.localhost", "example.com", ".app.localhost"] {
            assert_eq!(resolve_tenant(host), resolve_tenant(host));
        }
    }

    async fn echo_tenant(Extension(ctx): Extension<TenantCtx>) -> String {
        ctx.tenant_id.to_string()
    }

    fn app(db: Arc<RecordingDb>) -> Router {
        let state = AppState::new(db);
        let router = Router::new().route("/", get(echo_tenant));
        apply(router, state.clone()).with_state(state)
    }

    fn request(host: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: Router, host: &str) -> (StatusCode, String) {
        let res = app.oneshot(request(host)).await.unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn forwards_and_binds_tenant() {
        let db = Arc::new(RecordingDb::default());

        let (status, body) = send(app(db.clone()), "acme.example.com").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "acme");
        assert_eq!(db.tenants(), vec!["acme"]);
    }

    #[tokio::test]
    async fn rejects_loopback_without_calling_next() {
        let db = Arc::new(RecordingDb::default());

        let (status, body) = send(app(db.clone()), "127.0.0.1:3000").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Tenant ID is required in subdomain");
        assert!(db.tenants().is_empty());
    }

    #[tokio::test]
    async fn rejects_two_label_host() {
        let db = Arc::new(RecordingDb::default());

        let (status, body) = send(app(db.clone()), "example.com").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Tenant ID is required in subdomain");
        assert!(db.tenants().is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_tenant_label() {
        let db = Arc::new(RecordingDb::default());

        let (status, body) = send(app(db.clone()), ".app.localhost").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Tenant ID is required");
        assert!(db.tenants().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_uri_authority_without_host_header() {
        let db = Arc::new(RecordingDb::default());
        let req = Request::builder()
            .uri("http://beta.example.com/")
            .body(Body::empty())
            .unwrap();

        let res = app(db.clone()).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(db.tenants(), vec!["beta"]);
    }

    #[tokio::test]
    async fn tenant_is_bound_before_handler_runs() {
        let db = Arc::new(RecordingDb::default());
        let seen = db.clone();
        let state = AppState::new(db.clone());
        let router = Router::new().route(
            "/",
            get(move || {
                let seen = seen.clone();
                async move { seen.tenants().join(",") }
            }),
        );
        let app = apply(router, state.clone()).with_state(state);

        let (status, body) = send(app, "test.app.localhost").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "test");
        assert_eq!(db.tenants(), vec!["test"]);
    }

    #[tokio::test]
    async fn non_ascii_tenant_label_is_passed_through() {
        let db = Arc::new(RecordingDb::default());
        let req = Request::builder()
            .uri("/")
            .header(
                header::HOST,
                HeaderValue::from_bytes("café.example.com".as_bytes()).unwrap(),
            )
            .body(Body::empty())
            .unwrap();

        let res = app(db.clone()).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], "café".as_bytes());
        assert_eq!(db.tenants(), vec!["café"]);
    }

    #[tokio::test]
    async fn same_host_twice_binds_same_tenant() {
        let db = Arc::new(RecordingDb::default());
        let app = app(db.clone());

        let first = send(app.clone(), "test.app.localhost").await;
        let second = send(app, "test.app.localhost").await;

        assert_eq!(first, second);
        assert_eq!(db.tenants(), vec!["test", "test"]);
    }
}
