#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use brainquiz::{
    config::Config,
    state::AppState,
    store::{Repository, Store},
    web::routes::build_app,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
    pub headers: axum::http::HeaderMap,
    pub raw: Vec<u8>,
}

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub data_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Store::open(data_dir.path()).await;

        let config = Config {
            data_dir: data_dir.path().to_path_buf(),
            bcrypt_cost: 4,
            max_upload_bytes: 64 * 1024,
            admin_username: ADMIN_USER.to_string(),
            admin_password: Some(ADMIN_PASS.to_string()),
            ..Config::default()
        };
        brainquiz::services::user_service::ensure_bootstrap_admin(&store, &config)
            .await
            .expect("Failed to create bootstrap admin");

        let router = build_app(AppState::new(config, store.clone()), MemoryStore::default());
        Self { router, store, data_dir }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let raw = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        TestResponse { status, body, cookie, headers, raw }
    }

    pub async fn call(&self, method: &str, uri: &str, cookie: Option<&str>, json: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Faz login e devolve o cookie de sessão ("id=...").
    pub async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .call("POST", "/login", None, Some(serde_json::json!({ "usuario": username, "senha": password })))
            .await;
        assert_eq!(res.status, StatusCode::OK, "login falhou: {}", res.body);
        res.cookie.expect("login sem cookie de sessão")
    }

    pub async fn login_admin(&self) -> String {
        self.login(ADMIN_USER, ADMIN_PASS).await
    }

    /// Submete um cadastro e aprova-o com o administrador; devolve o id do novo utilizador.
    pub async fn approved_user(&self, username: &str, password: &str) -> String {
        let res = self
            .call(
                "POST",
                "/cadastro",
                None,
                Some(serde_json::json!({
                    "usuario": username,
                    "senha": password,
                    "nome": "Teste",
                    "email": format!("{}@escola.pt", username),
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "cadastro falhou: {}", res.body);
        let id = res.body["cadastro"]["id"].as_str().unwrap().to_string();

        let admin = self.login_admin().await;
        let res = self.call("POST", &format!("/api/cadastros/{}/aprovar", id), Some(&admin), None).await;
        assert_eq!(res.status, StatusCode::OK, "aprovação falhou: {}", res.body);
        id
    }

    /// Promove um utilizador a moderador diretamente no armazenamento.
    pub async fn promote_to_moderator(&self, user_id: &str) {
        let _guard = self.store.lock().await;
        let mut user = self.store.users.find(user_id).await.unwrap().unwrap();
        user.role = brainquiz::models::user::Role::Moderador;
        assert!(self.store.users.replace(user).await.unwrap());
    }
}

pub fn multipart_pdf(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "----brainquiz-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", field, file_name).as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}
