#![allow(dead_code)]

//! In-memory stand-ins for the PostgreSQL repositories, plus helpers to
//! assemble an [`AppState`] and router around them. The HTTP tests run
//! hermetically: no database, no network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::get;
use axum::{Router, middleware};
use axum_test::TestRequest;
use chrono::Utc;

use linkhop::api::handlers::{health_handler, redirect_handler};
use linkhop::api::middleware::auth;
use linkhop::cache::{CacheSettings, ResolverCache};
use linkhop::domain::entities::{Link, User};
use linkhop::domain::repositories::{LinkRepository, UserRepository};
use linkhop::error::AppError;
use linkhop::infrastructure::LinkResolutionStore;
use linkhop::routes::api_routes;
use linkhop::state::AppState;
use linkhop::utils::codec::{Codec, DEFAULT_ALPHABET};
use linkhop::utils::password::hash_password;

/// In-memory link repository that counts resolve calls and records every
/// visit delta it receives, so tests can assert on cache behavior.
pub struct StubLinkRepository {
    links: Mutex<HashMap<i64, Link>>,
    next_id: AtomicI64,
    /// Number of `retrieve` calls (the cache's miss-resolve path).
    pub retrieve_calls: AtomicUsize,
    /// Every accepted `(link_id, delta)` pair, in arrival order.
    pub visit_deltas: Mutex<Vec<(i64, u64)>>,
    /// When set, `add_visits` fails without recording anything.
    pub fail_add_visits: AtomicBool,
}

impl StubLinkRepository {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            retrieve_calls: AtomicUsize::new(0),
            visit_deltas: Mutex::new(Vec::new()),
            fail_add_visits: AtomicBool::new(false),
        }
    }

    /// Inserts a link directly, returning its id.
    pub fn seed(&self, url: &str, created_by: &str) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.links.lock().unwrap().insert(
            id,
            Link::new(id, url.to_string(), 0, Utc::now(), created_by.to_string()),
        );
        id
    }

    pub fn visits(&self, id: i64) -> i64 {
        self.links.lock().unwrap().get(&id).map_or(0, |l| l.visits)
    }

    pub fn recorded_deltas(&self) -> Vec<(i64, u64)> {
        self.visit_deltas.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkRepository for StubLinkRepository {
    async fn create(&self, url: &str, created_by: &str) -> Result<Link, AppError> {
        let id = self.seed(url, created_by);
        Ok(self.links.lock().unwrap()[&id].clone())
    }

    async fn retrieve(&self, id: i64) -> Result<Option<Link>, AppError> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.links.lock().unwrap().get(&id).cloned())
    }

    async fn add_visits(&self, id: i64, delta: u64) -> Result<(), AppError> {
        if self.fail_add_visits.load(Ordering::SeqCst) {
            return Err(AppError::internal(
                "Database error",
                serde_json::json!({}),
            ));
        }
        if let Some(link) = self.links.lock().unwrap().get_mut(&id) {
            link.visits += delta as i64;
        }
        self.visit_deltas.lock().unwrap().push((id, delta));
        Ok(())
    }

    async fn retrieve_and_bump(&self, id: i64) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();
        Ok(links.get_mut(&id).map(|link| {
            link.visits += 1;
            link.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.links.lock().unwrap().remove(&id).is_some())
    }

    async fn list_for_user(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let links = self.links.lock().unwrap();
        let mut owned: Vec<Link> = links
            .values()
            .filter(|l| l.created_by == username)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_for_user(&self, username: &str) -> Result<i64, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links.values().filter(|l| l.created_by == username).count() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-memory user repository.
pub struct StubUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl StubUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a user with a properly hashed password.
    pub fn seed(&self, username: &str, password: &str, is_admin: bool) {
        self.users.lock().unwrap().insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password: hash_password(password),
                is_admin,
                created_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl UserRepository for StubUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                serde_json::json!({ "username": username }),
            ));
        }
        let user = User {
            username: username.to_string(),
            password: password_hash.to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn retrieve(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().unwrap();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(username) {
            Some(user) => {
                user.password = password_hash.to_string();
                Ok(())
            }
            None => Err(AppError::not_found(
                "User not found",
                serde_json::json!({ "username": username }),
            )),
        }
    }

    async fn toggle_admin(&self, username: &str) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(username) {
            Some(user) => {
                user.is_admin = !user.is_admin;
                Ok(())
            }
            None => Err(AppError::not_found(
                "User not found",
                serde_json::json!({ "username": username }),
            )),
        }
    }

    async fn delete(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().remove(username).is_some())
    }
}

/// Everything a test needs: the state plus direct handles to the stubs.
pub struct TestApp {
    pub state: AppState,
    pub links: Arc<StubLinkRepository>,
    pub users: Arc<StubUserRepository>,
    pub cache: Option<ResolverCache>,
    pub codec: Arc<Codec>,
}

/// Builds an [`AppState`] over fresh stubs. With `use_cache`, a real
/// coordinator runs over the stub store; its sync interval is long enough
/// that only explicit `flush` calls write back.
pub fn test_app(use_cache: bool) -> TestApp {
    let links = Arc::new(StubLinkRepository::new());
    let users = Arc::new(StubUserRepository::new());
    let codec = Arc::new(Codec::new(DEFAULT_ALPHABET).unwrap());

    let cache = use_cache.then(|| {
        let store = Arc::new(LinkResolutionStore::new(
            codec.clone(),
            links.clone() as Arc<dyn LinkRepository>,
        ));
        ResolverCache::spawn(
            store,
            CacheSettings {
                capacity: 64,
                sync_interval: Duration::from_secs(600),
            },
        )
    });

    let state = AppState::new(
        links.clone(),
        users.clone(),
        cache.clone(),
        codec.clone(),
        "https://lnk.test".to_string(),
        None,
    );

    TestApp {
        state,
        links,
        users,
        cache,
        codec,
    }
}

/// Minimal standard base64 encoder (with padding) — just enough to build
/// the `Authorization: Basic` header the HTTP tests send.
fn base64_encode(input: &[u8]) -> String {
    const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for chunk in input.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = *chunk.get(1).unwrap_or(&0) as u32;
        let b2 = *chunk.get(2).unwrap_or(&0) as u32;
        let n = (b0 << 16) | (b1 << 8) | b2;
        out.push(ALPHABET[((n >> 18) & 63) as usize] as char);
        out.push(ALPHABET[((n >> 12) & 63) as usize] as char);
        out.push(if chunk.len() > 1 {
            ALPHABET[((n >> 6) & 63) as usize] as char
        } else {
            '='
        });
        out.push(if chunk.len() > 2 {
            ALPHABET[(n & 63) as usize] as char
        } else {
            '='
        });
    }
    out
}

/// Extension adding the `authorization_basic` helper the HTTP tests expect,
/// setting the standard `Authorization: Basic base64(user:pass)` header.
pub trait AuthorizationBasicExt {
    fn authorization_basic(self, username: &str, password: &str) -> Self;
}

impl AuthorizationBasicExt for TestRequest {
    fn authorization_basic(self, username: &str, password: &str) -> Self {
        let token = base64_encode(format!("{username}:{password}").as_bytes());
        self.authorization(format!("Basic {token}"))
    }
}

/// The app's routes without the rate limiter, which needs a real socket
/// peer address.
pub fn test_router(state: AppState) -> Router {
    let api = api_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    Router::new()
        .route("/{id}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
}
