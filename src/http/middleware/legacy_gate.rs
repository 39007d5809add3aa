//! Legacy protocol gate middleware.
//! Rejects requests whose protocol version the matched scope blocks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::gate::{decide, ProtocolVersion, RequestFacts, Verdict};
use crate::http::request::RequestLine;
use crate::http::server::SharedRuntime;
use crate::observability::metrics;
use crate::routing::matcher::request_host;
use crate::routing::Scope;

/// Scope selected for a request, attached for the forwarding handler.
#[derive(Clone, Debug)]
pub struct MatchedScope(pub Arc<Scope>);

pub async fn legacy_gate_middleware(
    State(runtime): State<SharedRuntime>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // One generation for the whole request, even if a reload lands meanwhile.
    let runtime = runtime.load_full();
    let scope = runtime
        .router
        .match_scope(request_host(&req), req.uri().path())
        .clone();

    let version = ProtocolVersion::from(req.version());
    let verdict = {
        let client = addr.ip();
        let request_line = RequestLine::of(&req);
        let facts = RequestFacts {
            version,
            client: &client,
            request_line: &request_line,
        };
        decide(&scope.policy, &facts)
    };

    match verdict {
        Ok(Verdict::Allow) => {
            metrics::record_decision(version.as_str(), true);
            req.extensions_mut().insert(MatchedScope(scope));
            next.run(req).await
        }
        Ok(Verdict::Reject(rejection)) => {
            rejection.log.emit();
            tracing::debug!(scope = %scope.label, generation = runtime.generation, "Request rejected");
            metrics::record_decision(version.as_str(), false);
            rejection.into_response()
        }
        Err(e) => {
            tracing::error!(scope = %scope.label, error = %e, "Failed to build rejection");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GateConfig, HostConfig, LocationConfig};
    use crate::http::server::{build_router, AppState, Runtime};
    use crate::policy::{PolicyFragment, Toggle};
    use crate::routing::ScopeRouter;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, Version};
    use tower::ServiceExt;

    fn scenario() -> GateConfig {
        let mut config = GateConfig::default();
        config.policy = PolicyFragment {
            enabled: Toggle::On,
            block_http10: Toggle::On,
            ..Default::default()
        };
        let mut custom = PolicyFragment::default();
        custom.set_custom_message("blocked").unwrap();
        config.hosts = vec![
            HostConfig {
                name: "example.com".into(),
                upstream: None,
                policy: PolicyFragment::default(),
                locations: vec![LocationConfig {
                    path_prefix: "/legacy".into(),
                    upstream: None,
                    policy: PolicyFragment {
                        block_http10: Toggle::Off,
                        ..Default::default()
                    },
                }],
            },
            HostConfig {
                name: "custom.test".into(),
                upstream: None,
                policy: custom,
                locations: Vec::new(),
            },
        ];
        config
    }

    fn app(config: &GateConfig) -> axum::Router {
        let state = AppState::new(Runtime::new(0, ScopeRouter::from_config(config)), config);
        build_router(config, state).layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 5], 4000))))
    }

    fn request(host: &str, path: &str, version: Version) -> Request<Body> {
        Request::builder()
            .uri(path)
            .version(version)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_http10_rejected_outside_exempt_path() {
        let response = app(&scenario())
            .oneshot(request("example.com", "/", Version::HTTP_10))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
        assert_eq!(response.headers()[header::UPGRADE], "HTTP/2.0, HTTP/1.1");
        assert_eq!(response.headers()[header::CONNECTION], "Upgrade");
        let declared: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), declared);
        assert!(std::str::from_utf8(&body).unwrap().contains("Your client used: HTTP/1.0"));
    }

    #[tokio::test]
    async fn test_http10_allowed_on_exempt_path() {
        // Allowed through the gate; no upstream is configured so the handler answers 404.
        let response = app(&scenario())
            .oneshot(request("example.com", "/legacy/app", Version::HTTP_10))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_http11_and_http2_pass() {
        let config = scenario();
        for version in [Version::HTTP_11, Version::HTTP_2] {
            let response = app(&config)
                .oneshot(request("example.com", "/", version))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{version:?}");
        }
    }

    #[tokio::test]
    async fn test_custom_body_for_host() {
        let response = app(&scenario())
            .oneshot(request("custom.test", "/anything", Version::HTTP_10))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "blocked");
    }

    #[tokio::test]
    async fn test_disabled_module_passes_everything() {
        let config = GateConfig::default();
        let response = app(&config)
            .oneshot(request("example.com", "/", Version::HTTP_10))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
