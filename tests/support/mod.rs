//! Shared harness for the HTTP integration tests
//!
//! [`TestApp`] serves the full router over in-memory collaborators with Alice
//! and Bob registered. [`Browser`] keeps its own cookie jar so several
//! sessions can drive the same server side by side.

#![allow(dead_code)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::{TestResponse, TestServer};
use blogful::prelude::*;
use chrono::{Duration, TimeZone};
use serde_json::Value;
use std::collections::BTreeMap;

pub const PASSWORD: &str = "test";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";

pub struct TestApp {
    pub server: TestServer,
    pub entries: InMemoryEntryRepository,
    pub alice: User,
    pub bob: User,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(BlogConfig::default()).await
    }

    pub async fn spawn_with(config: BlogConfig) -> Self {
        Self::spawn_wrapped(config, |entries| entries).await
    }

    /// Serve `wrap(entries)` as the entry repository, keeping direct access
    /// to the underlying in-memory store
    pub async fn spawn_wrapped<R>(
        mut config: BlogConfig,
        wrap: impl FnOnce(InMemoryEntryRepository) -> R,
    ) -> Self
    where
        R: EntryRepository + 'static,
    {
        config.users = vec![seed("Alice", ALICE), seed("Bob", BOB)];

        let hasher = Argon2Verifier::with_cost(1024, 1, 1).expect("argon2 params");
        let users = InMemoryUserRepository::new();
        seed_users(&users, &config.users, &hasher)
            .await
            .expect("seed users");
        let alice = users.find_by_email(ALICE).await.unwrap().unwrap();
        let bob = users.find_by_email(BOB).await.unwrap().unwrap();

        let entries = InMemoryEntryRepository::new();
        let app = ServerBuilder::new()
            .with_config(config)
            .with_entry_repository(wrap(entries.clone()))
            .with_user_repository(users)
            .with_password_verifier(hasher)
            .build()
            .expect("build router");

        Self {
            server: TestServer::new(app).expect("Failed to create test server"),
            entries,
            alice,
            bob,
        }
    }

    pub fn browser(&self) -> Browser<'_> {
        Browser {
            server: &self.server,
            cookies: BTreeMap::new(),
        }
    }

    /// Insert `n` entries titled "Entry 1".."Entry n", one minute apart
    pub async fn seed_entries(&self, owner: &User, n: usize) {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..n {
            self.entries
                .insert(
                    NewEntry::new(owner.id, format!("Entry {}", i + 1), "body")
                        .at(base + Duration::minutes(i as i64)),
                )
                .await
                .unwrap();
        }
    }
}

fn seed(name: &str, email: &str) -> SeedUser {
    SeedUser {
        name: name.to_string(),
        email: email.to_string(),
        password: Some(PASSWORD.to_string()),
        password_hash: None,
    }
}

/// A client with a cookie jar; redirects are not followed
pub struct Browser<'a> {
    server: &'a TestServer,
    cookies: BTreeMap<String, String>,
}

impl Browser<'_> {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.get_with(path, &[]).await
    }

    pub async fn get_with(&mut self, path: &str, query: &[(&str, &str)]) -> TestResponse {
        let mut request = self.server.get(path);
        for (key, value) in query {
            request = request.add_query_param(key, value);
        }
        if let Some(cookie) = self.cookie_header() {
            request = request.add_header(header::COOKIE, cookie);
        }
        let response = request.await;
        self.absorb(&response);
        response
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.post_with(path, &[], form).await
    }

    pub async fn post_with(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> TestResponse {
        let mut request = self.server.post(path).form(&form);
        for (key, value) in query {
            request = request.add_query_param(key, value);
        }
        if let Some(cookie) = self.cookie_header() {
            request = request.add_header(header::COOKIE, cookie);
        }
        let response = request.await;
        self.absorb(&response);
        response
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post("/login", &[("email", email), ("password", password)])
            .await
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    fn cookie_header(&self) -> Option<HeaderValue> {
        if self.cookies.is_empty() {
            return None;
        }
        let joined = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(HeaderValue::from_str(&joined).unwrap())
    }

    fn absorb(&mut self, response: &TestResponse) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

/// Assert a `303 See Other` and return its target
pub fn redirect_target(response: &TestResponse) -> String {
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// `(level, message)` pairs of the flashes in a rendered view
pub fn flashes(body: &Value) -> Vec<(String, String)> {
    body["flashes"]
        .as_array()
        .expect("view without flashes")
        .iter()
        .map(|flash| {
            (
                flash["level"].as_str().unwrap().to_string(),
                flash["message"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}
