//! End-to-end tests of the browser flows: login, logout and the entry
//! lifecycle, including refusals for anonymous callers and non-owners.

mod support;

use axum::http::StatusCode;
use blogful::prelude::EntryRepository;
use serde_json::Value;
use support::{ALICE, BOB, PASSWORD, TestApp, flashes, redirect_target};

fn danger(message: &str) -> (String, String) {
    ("danger".to_string(), message.to_string())
}

// =============================================================================
// Login / logout
// =============================================================================

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_login_correct() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        browser.get("/login").await.assert_status_ok();
        let response = browser.login(ALICE, PASSWORD).await;

        assert_eq!(redirect_target(&response), "/");
        assert!(browser.has_cookie("blogful_session"));

        let body: Value = browser.get("/").await.json();
        assert_eq!(body["current_user"]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_login_incorrect() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        let response = browser.login("carol@example.com", PASSWORD).await;

        assert_eq!(redirect_target(&response), "/login");
        assert!(!browser.has_cookie("blogful_session"));

        let body: Value = browser.get("/login").await.json();
        assert_eq!(flashes(&body), vec![danger("Incorrect username or password")]);
        assert!(body["current_user"].is_null());

        // Flashes are shown once
        let again: Value = browser.get("/login").await.json();
        assert!(flashes(&again).is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_reads_like_unknown_email() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        browser.login(ALICE, "not-the-password").await;
        let body: Value = browser.get("/login").await.json();

        assert_eq!(flashes(&body), vec![danger("Incorrect username or password")]);
    }

    #[tokio::test]
    async fn test_empty_credentials_are_a_generic_failure() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        let response = browser.post("/login", &[("email", ""), ("password", "")]).await;
        assert_eq!(redirect_target(&response), "/login");

        let body: Value = browser.get("/login").await.json();
        assert_eq!(flashes(&body), vec![danger("Incorrect username or password")]);
    }

    #[tokio::test]
    async fn test_failed_login_drops_existing_session() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        browser.login(ALICE, "wrong").await;

        let body: Value = browser.get("/").await.json();
        assert!(body["current_user"].is_null());
    }

    #[tokio::test]
    async fn test_login_view_then_redirect_back() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        let home: Value = browser.get("/").await.json();
        assert!(home["current_user"].is_null());

        let response = browser.get("/entry/add").await;
        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2Fadd");

        let login: Value = browser
            .get_with("/login", &[("next", "/entry/add")])
            .await
            .json();
        assert_eq!(flashes(&login), vec![danger("Please log in to access this page.")]);
        assert_eq!(login["next"], "/entry/add");

        let response = browser
            .post_with(
                "/login",
                &[("next", "/entry/add")],
                &[("email", ALICE), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(redirect_target(&response), "/entry/add");

        let add: Value = browser.get("/entry/add").await.json();
        assert_eq!(add["view"], "add_entry");
        assert_eq!(add["current_user"]["name"], "Alice");
    }

    #[tokio::test]
    async fn test_failed_login_keeps_next() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        let response = browser
            .post_with(
                "/login",
                &[("next", "/entry/add")],
                &[("email", ALICE), ("password", "wrong")],
            )
            .await;

        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2Fadd");
    }

    #[tokio::test]
    async fn test_offsite_next_is_ignored() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        for next in ["https://evil.example/", "//evil.example/"] {
            let response = browser
                .post_with(
                    "/login",
                    &[("next", next)],
                    &[("email", ALICE), ("password", PASSWORD)],
                )
                .await;
            assert_eq!(redirect_target(&response), "/");
        }
    }

    #[tokio::test]
    async fn test_logout() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        let response = browser.get("/logout").await;

        assert_eq!(redirect_target(&response), "/");
        assert!(!browser.has_cookie("blogful_session"));
        let body: Value = browser.get("/").await.json();
        assert!(body["current_user"].is_null());
        assert_eq!(
            flashes(&body),
            vec![("info".to_string(), "You have been logged out".to_string())]
        );
    }

    #[tokio::test]
    async fn test_logout_when_anonymous() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();

        let response = browser.get("/logout").await;

        assert_eq!(redirect_target(&response), "/");
        let body: Value = browser.get("/").await.json();
        assert!(flashes(&body).is_empty());
    }

    #[tokio::test]
    async fn test_garbage_session_cookie_is_anonymous() {
        let app = TestApp::spawn().await;

        let response = app
            .server
            .get("/")
            .add_header(
                axum::http::header::COOKIE,
                axum::http::HeaderValue::from_static("blogful_session=not-a-token"),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["current_user"].is_null());
    }
}

// =============================================================================
// Entry lifecycle
// =============================================================================

mod entry_tests {
    use super::*;

    /// Add an entry as the logged-in browser and return its id
    async fn add_entry(browser: &mut support::Browser<'_>, title: &str, content: &str) -> u64 {
        let response = browser
            .post("/entry/add", &[("title", title), ("content", content)])
            .await;
        assert_eq!(redirect_target(&response), "/");

        let body: Value = browser.get("/").await.json();
        body["entries"][0]["id"].as_u64().unwrap()
    }

    #[tokio::test]
    async fn test_add_edit_delete_entry() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        let id = add_entry(&mut browser, "Test Entry", "Testibg new entry.").await;

        let home: Value = browser.get("/").await.json();
        assert_eq!(home["entries"][0]["title"], "Test Entry");
        assert_eq!(home["entries"][0]["content"], "Testibg new entry.");

        let edit_form: Value = browser.get(&format!("/entry/{}/edit", id)).await.json();
        assert_eq!(edit_form["view"], "edit_entry");
        assert_eq!(edit_form["entry"]["content"], "Testibg new entry.");

        let response = browser
            .post(
                &format!("/entry/{}/edit", id),
                &[("title", "Test Entry"), ("content", "Testing new entry.")],
            )
            .await;
        assert_eq!(redirect_target(&response), "/");

        let shown: Value = browser.get(&format!("/entry/{}", id)).await.json();
        assert_eq!(shown["entry"]["content"], "Testing new entry.");
        assert_eq!(shown["owned"], true);
        assert_eq!(
            flashes(&shown),
            vec![("success".to_string(), "Entry updated".to_string())]
        );

        let confirm: Value = browser.get(&format!("/entry/{}/delete", id)).await.json();
        assert_eq!(confirm["view"], "delete_entry");

        let response = browser.post(&format!("/entry/{}/delete", id), &[]).await;
        assert_eq!(redirect_target(&response), "/");

        let gone = browser.get(&format!("/entry/{}", id)).await;
        assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
        let body: Value = gone.json();
        assert_eq!(body["code"], "ENTRY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_entry_records_owner() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        let id = add_entry(&mut browser, "Mine", "body").await;

        let shown: Value = browser.get(&format!("/entry/{}", id)).await.json();
        assert_eq!(shown["entry"]["owner_id"], app.alice.id.to_string());
    }

    #[tokio::test]
    async fn test_anonymous_reads_are_public() {
        let app = TestApp::spawn().await;
        app.seed_entries(&app.alice, 1).await;
        let mut browser = app.browser();

        let home: Value = browser.get("/").await.json();
        let id = home["entries"][0]["id"].as_u64().unwrap();

        let shown = browser.get(&format!("/entry/{}", id)).await;
        shown.assert_status_ok();
        let body: Value = shown.json();
        assert_eq!(body["entry"]["title"], "Entry 1");
        assert_eq!(body["owned"], false);
    }

    #[tokio::test]
    async fn test_anonymous_mutations_redirect_to_login() {
        let app = TestApp::spawn().await;
        app.seed_entries(&app.alice, 1).await;
        let mut browser = app.browser();

        let response = browser
            .post("/entry/add", &[("title", "t"), ("content", "c")])
            .await;
        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2Fadd");

        let response = browser.get("/entry/1/edit").await;
        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2F1%2Fedit");

        let response = browser
            .post("/entry/1/edit", &[("title", "t"), ("content", "c")])
            .await;
        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2F1%2Fedit");

        let response = browser.post("/entry/1/delete", &[]).await;
        assert_eq!(redirect_target(&response), "/login?next=%2Fentry%2F1%2Fdelete");

        assert_eq!(app.entries.count().await.unwrap(), 1);
        let entry = app.entries.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(entry.title, "Entry 1");
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        let response = browser
            .post("/entry/add", &[("title", ""), ("content", "body")])
            .await;

        assert_eq!(redirect_target(&response), "/entry/add");
        let body: Value = browser.get("/entry/add").await.json();
        assert_eq!(flashes(&body), vec![danger("Title is required")]);
        assert_eq!(app.entries.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_entry_id_is_rejected() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        for response in [
            browser.get("/entry/abc").await,
            browser.get("/entry/abc/edit").await,
            browser.post("/entry/abc/delete", &[]).await,
        ] {
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["code"], "INVALID_REQUEST");
            assert_eq!(body["details"]["field"], "id");
        }
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let app = TestApp::spawn().await;
        let mut browser = app.browser();
        browser.login(ALICE, PASSWORD).await;

        assert_eq!(
            browser.get("/entry/999").await.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            browser.get("/entry/999/edit").await.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            browser.post("/entry/999/delete", &[]).await.status_code(),
            StatusCode::NOT_FOUND
        );
    }
}

// =============================================================================
// Ownership
// =============================================================================

mod ownership_tests {
    use super::*;

    #[tokio::test]
    async fn test_bob_cannot_edit_alices_entry() {
        let app = TestApp::spawn().await;
        app.seed_entries(&app.alice, 1).await;
        let mut bob = app.browser();
        bob.login(BOB, PASSWORD).await;

        let response = bob.get("/entry/1/edit").await;
        assert_eq!(redirect_target(&response), "/entry/1");
        let shown: Value = bob.get("/entry/1").await.json();
        assert_eq!(flashes(&shown), vec![danger("You can only edit your own posts")]);

        let response = bob
            .post("/entry/1/edit", &[("title", "Bob's now"), ("content", "ours")])
            .await;
        assert_eq!(redirect_target(&response), "/entry/1");

        let entry = app.entries.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(entry.title, "Entry 1");
        assert_eq!(entry.owner_id(), app.alice.id);
    }

    #[tokio::test]
    async fn test_bob_cannot_delete_alices_entry() {
        let app = TestApp::spawn().await;
        app.seed_entries(&app.alice, 1).await;
        let mut bob = app.browser();
        bob.login(BOB, PASSWORD).await;

        let response = bob.get("/entry/1/delete").await;
        assert_eq!(redirect_target(&response), "/entry/1");

        let response = bob.post("/entry/1/delete", &[]).await;
        assert_eq!(redirect_target(&response), "/entry/1");
        let shown: Value = bob.get("/entry/1").await.json();
        assert_eq!(
            flashes(&shown),
            vec![danger("You can only delete your own posts")]
        );

        assert!(app.entries.get_by_id(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let app = TestApp::spawn().await;
        let mut alice = app.browser();
        let mut bob = app.browser();
        alice.login(ALICE, PASSWORD).await;
        bob.login(BOB, PASSWORD).await;

        let alice_home: Value = alice.get("/").await.json();
        let bob_home: Value = bob.get("/").await.json();

        assert_eq!(alice_home["current_user"]["name"], "Alice");
        assert_eq!(bob_home["current_user"]["name"], "Bob");

        alice.get("/logout").await;
        let bob_home: Value = bob.get("/").await.json();
        assert_eq!(bob_home["current_user"]["name"], "Bob");
    }
}

// =============================================================================
// Repository traffic
// =============================================================================

mod repository_traffic_tests {
    use super::*;
    use blogful::prelude::{Entry, EntryId, InMemoryEntryRepository, NewEntry, Result, async_trait};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts `get_by_id` calls on the way to the in-memory store
    struct CountingRepository {
        inner: InMemoryEntryRepository,
        lookups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EntryRepository for CountingRepository {
        async fn count(&self) -> Result<usize> {
            self.inner.count().await
        }

        async fn ordered_slice(&self, start: usize, end: usize) -> Result<Vec<Entry>> {
            self.inner.ordered_slice(start, end).await
        }

        async fn get_by_id(&self, id: EntryId) -> Result<Option<Entry>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id).await
        }

        async fn insert(&self, entry: NewEntry) -> Result<Entry> {
            self.inner.insert(entry).await
        }

        async fn update(&self, entry: Entry) -> Result<Entry> {
            self.inner.update(entry).await
        }

        async fn delete_by_id(&self, id: EntryId) -> Result<bool> {
            self.inner.delete_by_id(id).await
        }
    }

    async fn counted_app() -> (TestApp, Arc<AtomicUsize>) {
        let lookups = Arc::new(AtomicUsize::new(0));
        let counter = lookups.clone();
        let app = TestApp::spawn_wrapped(Default::default(), move |inner| CountingRepository {
            inner,
            lookups: counter,
        })
        .await;
        app.seed_entries(&app.alice, 2).await;
        (app, lookups)
    }

    #[tokio::test]
    async fn test_each_write_loads_the_entry_once() {
        let (app, lookups) = counted_app().await;
        let mut alice = app.browser();
        alice.login(ALICE, PASSWORD).await;

        lookups.store(0, Ordering::SeqCst);
        let response = alice
            .post("/entry/1/edit", &[("title", "Renamed"), ("content", "body")])
            .await;
        assert_eq!(redirect_target(&response), "/");
        assert_eq!(lookups.load(Ordering::SeqCst), 1);

        lookups.store(0, Ordering::SeqCst);
        let response = alice.post("/entry/2/delete", &[]).await;
        assert_eq!(redirect_target(&response), "/");
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refused_writes_load_the_entry_once() {
        let (app, lookups) = counted_app().await;
        let mut bob = app.browser();
        bob.login(BOB, PASSWORD).await;

        lookups.store(0, Ordering::SeqCst);
        let response = bob
            .post("/entry/1/edit", &[("title", ""), ("content", "body")])
            .await;
        assert_eq!(redirect_target(&response), "/entry/1");
        assert_eq!(lookups.load(Ordering::SeqCst), 1);

        lookups.store(0, Ordering::SeqCst);
        let response = bob.post("/entry/1/delete", &[]).await;
        assert_eq!(redirect_target(&response), "/entry/1");
        assert_eq!(lookups.load(Ordering::SeqCst), 1);

        assert_eq!(app.entries.count().await.unwrap(), 2);
    }
}
