//! Mock API tests for the session layer.
//!
//! These tests use wiremock to simulate the REST API and check the token
//! manager and gateway against it.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use securecloud_client::api::{
    DateRange, ExportFormat, ExportOptions, NewAlert, NewUser, UserUpdate,
};
use securecloud_client::{ClientConfig, LogoutReason, SecureCloud, SessionEvent};
use securecloud_core::error::{AuthError, Error};
use securecloud_core::models::{AlertSeverity, FilterOptions, UserRole};
use securecloud_core::{
    ACCESS_TOKEN_KEY, AccessToken, ApiUrl, Credentials, MemoryStore, REFRESH_TOKEN_KEY,
    RealtimeUrl, TokenStore,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, store: Arc<MemoryStore>) -> SecureCloud {
    let config = ClientConfig::new(
        ApiUrl::new(format!("{}/api/v1", server.uri())).unwrap(),
        RealtimeUrl::new("ws://127.0.0.1:9").unwrap(),
    );
    SecureCloud::new(config, store).unwrap()
}

fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    if let Some(access) = access {
        store.set(ACCESS_TOKEN_KEY, access).unwrap();
    }
    if let Some(refresh) = refresh {
        store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
    }
    store
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": data,
        "timestamp": "2024-05-01T10:00:00Z"
    }))
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "success": false,
        "error": "Unauthorized",
        "message": "token expired"
    }))
}

fn user() -> Value {
    json!({
        "id": "u-1",
        "email": "analyst@example.com",
        "name": "Ana Lyst",
        "role": "analyst"
    })
}

async fn mount_refresh(server: &MockServer, from: &str, to: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": from})))
        .respond_with(
            ok(json!({"access_token": to, "refresh_token": format!("{}-refresh", to)}))
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Login / Logout
// ============================================================================

#[tokio::test]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({
            "email": "analyst@example.com",
            "password": "secret123"
        })))
        .respond_with(ok(json!({
            "user": user(),
            "access_token": "a1",
            "refresh_token": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(None, None);
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    let creds = Credentials::new("analyst@example.com", "secret123").unwrap();
    let user = client.login(&creds).await.unwrap();

    assert_eq!(user.name, "Ana Lyst");
    assert!(client.is_authenticated());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("a1"));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("r1"));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Started);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, store_with(None, None));
    let creds = Credentials::new("bad@example.com", "wrong").unwrap();
    let err = client.login(&creds).await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials)));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_session_even_if_server_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    client.logout().await;

    assert!(!client.is_authenticated());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedOut {
            reason: LogoutReason::UserInitiated
        }
    );
    assert!(events.try_recv().is_err());
}

// ============================================================================
// Gateway
// ============================================================================

#[tokio::test]
async fn test_bearer_token_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ok(user()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let me = client.current_user().await.unwrap();
    assert_eq!(me.id, "u-1");
}

#[tokio::test]
async fn test_unauthorized_once_is_retried_with_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ok(user()))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh(&server, "r1", "a2", Duration::ZERO).await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    let me = client.current_user().await.unwrap();

    assert_eq!(me.email, "analyst@example.com");
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("a2"));
    assert_eq!(
        store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(),
        Some("a2-refresh")
    );
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Refreshed);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_second_unauthorized_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(unauthorized())
        .expect(2)
        .mount(&server)
        .await;

    mount_refresh(&server, "r1", "a2", Duration::ZERO).await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert!(!client.is_authenticated());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);

    assert_eq!(events.try_recv().unwrap(), SessionEvent::Refreshed);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedOut {
            reason: LogoutReason::AuthFailed(AuthError::SessionExpired)
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_unauthorized_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ok(user()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/settings"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/settings"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ok(json!({"theme": "dark"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh(&server, "r1", "a2", Duration::from_millis(200)).await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let settings = client.settings();
    let (me, settings) = tokio::join!(client.current_user(), settings.get());

    assert_eq!(me.unwrap().id, "u-1");
    assert_eq!(settings.unwrap()["theme"], "dark");
    assert_eq!(client.tokens().access_token(), Some(AccessToken::new("a2")));
}

#[tokio::test]
async fn test_error_responses_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "NotFound",
            "message": "alert does not exist"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let err = client.alerts().get("missing").await.unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status, 404);
            assert_eq!(api.error.as_deref(), Some("NotFound"));
            assert_eq!(api.message.as_deref(), Some("alert does not exist"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_invalid_id_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ok(Value::Null))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let err = client.alerts().get("  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_paginated_alert_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts"))
        .and(query_param("severity", "critical,high"))
        .and(query_param("page", "2"))
        .and(query_param("pageSize", "1"))
        .respond_with(ok(json!({
            "data": [{
                "id": "a-7",
                "type": "intrusion",
                "severity": "critical",
                "title": "SSH brute force",
                "sourceIp": "203.0.113.9",
                "timestamp": "2024-05-01T10:00:00Z",
                "status": "new"
            }],
            "total": 3,
            "page": 2,
            "pageSize": 1,
            "totalPages": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let filters = FilterOptions {
        severity: vec![AlertSeverity::Critical, AlertSeverity::High],
        ..FilterOptions::page(2, 1)
    };
    let page = client.alerts().list(&filters).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "SSH brute force");
    assert_eq!(page.data[0].severity, AlertSeverity::Critical);
    assert!(page.has_next());
}

// ============================================================================
// Account and resource endpoints
// ============================================================================

fn alert_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": "intrusion",
        "severity": "high",
        "title": title,
        "sourceIp": "203.0.113.9",
        "timestamp": "2024-05-01T10:00:00Z",
        "status": "new"
    })
}

#[tokio::test]
async fn test_register_does_not_start_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({
            "email": "analyst@example.com",
            "password": "secret123",
            "name": "Ana Lyst"
        })))
        .respond_with(ok(json!({"user": user()})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(None, None));
    let creds = Credentials::new("analyst@example.com", "secret123").unwrap();
    let registered = client.register(&creds, " Ana Lyst ").await.unwrap();

    assert_eq!(registered.id, "u-1");
    assert!(!client.is_authenticated());

    let err = client.register(&creds, "  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_profile_and_password_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/auth/profile"))
        .and(header("authorization", "Bearer a1"))
        .and(body_json(json!({"name": "Ana B. Lyst"})))
        .respond_with(ok(json!({
            "id": "u-1",
            "email": "analyst@example.com",
            "name": "Ana B. Lyst",
            "role": "analyst"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/change-password"))
        .and(body_json(json!({"old_password": "old", "new_password": "new"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/reset-password"))
        .and(body_json(json!({"email": "analyst@example.com"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));

    let update = UserUpdate {
        name: Some("Ana B. Lyst".to_string()),
        ..UserUpdate::default()
    };
    let me = client.update_profile(&update).await.unwrap();
    assert_eq!(me.name, "Ana B. Lyst");

    client.change_password("old", "new").await.unwrap();
    client.reset_password(" analyst@example.com ").await.unwrap();

    assert!(matches!(
        client.change_password("old", "").await,
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_create_and_export_alerts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/alerts"))
        .and(body_json(json!({
            "type": "intrusion",
            "severity": "high",
            "title": "Port scan",
            "sourceIp": "203.0.113.9",
            "port": 22
        })))
        .respond_with(ok(alert_json("a-9", "Port scan")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/alerts/export"))
        .and(body_partial_json(json!({
            "format": "csv",
            "dateRange": {"from": "2024-05-01", "to": "2024-05-02"},
            "includeFields": ["id", "title"]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string("id,title\na-9,Port scan\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));

    let created = client
        .alerts()
        .create(&NewAlert {
            kind: "intrusion".to_string(),
            severity: AlertSeverity::High,
            title: "Port scan".to_string(),
            description: String::new(),
            source_ip: "203.0.113.9".to_string(),
            destination_ip: None,
            port: Some(22),
            protocol: None,
            tags: Vec::new(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "a-9");

    let file = client
        .alerts()
        .export(&ExportOptions {
            format: ExportFormat::Csv,
            date_range: DateRange {
                from: "2024-05-01".to_string(),
                to: "2024-05-02".to_string(),
            },
            include_fields: vec!["id".to_string(), "title".to_string()],
            filters: FilterOptions::default(),
        })
        .await
        .unwrap();
    assert_eq!(file, b"id,title\na-9,Port scan\n");
}

#[tokio::test]
async fn test_export_error_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/alerts/export"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "BadRequest",
            "message": "unsupported format"
        })))
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let err = client
        .alerts()
        .export(&ExportOptions {
            format: ExportFormat::Pdf,
            date_range: DateRange {
                from: "2024-05-01".to_string(),
                to: "2024-05-02".to_string(),
            },
            include_fields: Vec::new(),
            filters: FilterOptions::default(),
        })
        .await
        .unwrap_err();

    match err {
        Error::Api(api) => assert_eq!(api.status, 400),
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_management_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users"))
        .and(body_json(json!({
            "email": "new@example.com",
            "name": "New Hire",
            "role": "viewer"
        })))
        .respond_with(ok(json!({
            "id": "u-2",
            "email": "new@example.com",
            "name": "New Hire",
            "role": "viewer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/users/u-2"))
        .and(body_json(json!({"email": "hire@example.com"})))
        .respond_with(ok(json!({
            "id": "u-2",
            "email": "hire@example.com",
            "name": "New Hire",
            "role": "viewer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/u-2/permissions"))
        .and(body_json(json!({"permissions": ["alerts:read", "alerts:write"]})))
        .respond_with(ok(json!({
            "id": "u-2",
            "email": "hire@example.com",
            "name": "New Hire",
            "role": "viewer",
            "permissions": ["alerts:read", "alerts:write"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let users = client.users();

    let created = users
        .create(&NewUser {
            email: "new@example.com".to_string(),
            name: "New Hire".to_string(),
            role: UserRole::Viewer,
            password: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "u-2");

    let updated = users
        .update(
            "u-2",
            &UserUpdate {
                email: Some("hire@example.com".to_string()),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "hire@example.com");

    let permissions = vec!["alerts:read".to_string(), "alerts:write".to_string()];
    let updated = users.update_permissions("u-2", &permissions).await.unwrap();
    assert_eq!(updated.permissions, permissions);
}

#[tokio::test]
async fn test_server_defined_report_endpoints() {
    let server = MockServer::start().await;

    for (route, data) in [
        ("/api/v1/system/metrics", json!({"cpu": [12, 14]})),
        ("/api/v1/network/traffic", json!({"inbound": 1024})),
        ("/api/v1/dashboard/alert-trends", json!([{"day": "mon", "count": 3}])),
        ("/api/v1/dashboard/network-metrics", json!({"latency": 4})),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("time_range", "24h"))
            .respond_with(ok(data))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/threat-distribution"))
        .respond_with(ok(json!([{"type": "malware", "count": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let page = json!({
        "data": [{"message": "started"}],
        "total": 1,
        "page": 1,
        "pageSize": 20,
        "totalPages": 1
    });
    for route in ["/api/v1/system/logs", "/api/v1/network/packets"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ok(page.clone()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let range = Some("24h");

    assert_eq!(client.system().metrics(range).await.unwrap()["cpu"][1], 14);
    assert_eq!(client.network().traffic(range).await.unwrap()["inbound"], 1024);
    assert_eq!(client.dashboard().alert_trends(range).await.unwrap().len(), 1);
    assert_eq!(client.dashboard().network_metrics(range).await.unwrap()["latency"], 4);
    assert_eq!(
        client.dashboard().threat_distribution().await.unwrap()[0]["type"],
        "malware"
    );

    let filters = FilterOptions::default();
    let logs = client.system().logs(&filters).await.unwrap();
    assert_eq!(logs.data[0]["message"], "started");
    let packets = client.network().packets(&filters).await.unwrap();
    assert_eq!(packets.total, 1);
}

// ============================================================================
// Token manager
// ============================================================================

#[tokio::test]
async fn test_concurrent_refresh_is_single_flight() {
    let server = MockServer::start().await;
    mount_refresh(&server, "r1", "a2", Duration::from_millis(200)).await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));
    let tokens = client.tokens();

    let results = join_all((0..8).map(|_| tokens.refresh())).await;

    for result in results {
        assert_eq!(result.unwrap(), AccessToken::new("a2"));
    }
}

#[tokio::test]
async fn test_rejected_refresh_fails_every_waiter_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(unauthorized().set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    let results = join_all((0..4).map(|_| client.tokens().refresh())).await;

    for result in results {
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::RefreshRejected { .. }))
        ));
    }
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedOut {
            reason: LogoutReason::AuthFailed(AuthError::RefreshRejected { .. })
        }
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_missing_refresh_token_ends_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(unauthorized())
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("a1"), None);
    let client = client(&server, store.clone());

    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::MissingRefreshToken)));
    assert!(err.is_auth());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_refresh_after_completion_issues_new_request() {
    let server = MockServer::start().await;
    mount_refresh(&server, "r1", "a2", Duration::ZERO).await;
    mount_refresh(&server, "a2-refresh", "a3", Duration::ZERO).await;

    let client = client(&server, store_with(Some("a1"), Some("r1")));

    assert_eq!(client.tokens().refresh().await.unwrap(), AccessToken::new("a2"));
    assert_eq!(client.tokens().refresh().await.unwrap(), AccessToken::new("a3"));
}

#[tokio::test]
async fn test_logout_during_refresh_discards_new_tokens() {
    let server = MockServer::start().await;
    mount_refresh(&server, "r1", "a2", Duration::from_millis(300)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());
    let mut events = client.tokens().subscribe();

    let tokens = client.tokens().clone();
    let refresh = tokio::spawn(async move { tokens.refresh().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.logout().await;
    assert!(!client.is_authenticated());

    let result = refresh.await.unwrap();

    assert!(matches!(result, Err(Error::Auth(AuthError::SessionEnded))));
    assert!(!client.is_authenticated());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::LoggedOut {
            reason: LogoutReason::UserInitiated
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_login_during_refresh_keeps_new_session() {
    let server = MockServer::start().await;
    mount_refresh(&server, "r1", "a2", Duration::from_millis(300)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ok(json!({
            "user": user(),
            "access_token": "b1",
            "refresh_token": "s1"
        })))
        .mount(&server)
        .await;

    let store = store_with(Some("a1"), Some("r1"));
    let client = client(&server, store.clone());

    let tokens = client.tokens().clone();
    let refresh = tokio::spawn(async move { tokens.refresh().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let creds = Credentials::new("analyst@example.com", "secret123").unwrap();
    client.login(&creds).await.unwrap();

    let result = refresh.await.unwrap();

    assert!(matches!(result, Err(Error::Auth(AuthError::SessionEnded))));
    assert_eq!(client.tokens().access_token(), Some(AccessToken::new("b1")));
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("s1"));
}
