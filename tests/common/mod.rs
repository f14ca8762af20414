#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use my_finance_api::api::{self, AppState};
use my_finance_api::auth::TokenManager;
use my_finance_api::config::{AppConfig, Environment};
use my_finance_api::database::MemoryStore;

pub const PASSWORD: &str = "longenough1";

/// Full router over a fresh in-memory store.
pub struct TestApp {
    router: Router,
    pub tokens: TokenManager,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }

    /// Id at the end of the `Location` header of a 201.
    pub fn created_id(&self) -> Result<Uuid> {
        let location = self
            .headers
            .get(header::LOCATION)
            .context("missing Location header")?
            .to_str()?;
        let id = location.rsplit('/').next().context("empty Location")?;
        Ok(Uuid::parse_str(id)?)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::defaults(
            Environment::Development,
            "integration-secret".to_string(),
            None,
        );
        config.security.bcrypt_cost = 4;

        let state = AppState::in_memory(MemoryStore::new(), &config.security)
            .expect("test state");
        let tokens = state.tokens.clone();
        Self {
            router: api::router(state, &config),
            tokens,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await?.to_bytes().to_vec();
        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers a user and logs in, returning its id and a bearer token.
    pub async fn register(&self, name: &str, email: &str) -> Result<(Uuid, String)> {
        let res = self
            .request(
                Method::POST,
                "/api/v1/users/signup",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "signup failed: {}", res.status);
        let id = res.created_id()?;

        let res = self
            .request(
                Method::POST,
                "/api/v1/users/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.status);
        let token = res.json()?["token"]
            .as_str()
            .context("token missing")?
            .to_string();
        Ok((id, token))
    }

    pub async fn create_account(&self, token: &str, body: Value) -> Result<Uuid> {
        let res = self.post("/api/v1/accounts", token, body).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "account create: {}", res.status);
        res.created_id()
    }

    pub async fn create_category(&self, token: &str, name: &str, kind: &str) -> Result<Uuid> {
        let res = self
            .post(
                "/api/v1/categories",
                token,
                json!({ "name": name, "type": kind }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "category create: {}", res.status);
        res.created_id()
    }
}
