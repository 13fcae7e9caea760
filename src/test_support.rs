//! Router-level helpers for handler tests.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{app::build_app, state::AppState};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let (state, dir) = AppState::fake().await;
        Self {
            router: build_app(state.clone()),
            state,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::get(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        self.send(req.body(Body::from(form.to_string())).unwrap())
            .await
    }

    pub async fn register(&self, username: &str, password: &str, role: &str) {
        let body = format!("username={username}&password={password}&role={role}");
        let res = self.post("/register", &body, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "register {username}");
    }

    /// Logs in and returns the `name=value` cookie pair.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = format!("username={username}&password={password}");
        let res = self.post("/login", &body, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "login {username}");
        session_cookie(&res).expect("session cookie")
    }

    pub async fn admin(&self) -> String {
        self.register("admin", "adminpw", "admin").await;
        self.login("admin", "adminpw").await
    }

    pub async fn patient(&self, username: &str) -> String {
        self.register(username, "pw1", "patient").await;
        self.login(username, "pw1").await
    }
}

pub fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    let raw = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(|s| s.trim().to_string())
}

pub async fn json(res: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
