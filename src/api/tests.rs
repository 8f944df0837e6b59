//! Router tests driven through `tower::ServiceExt::oneshot`

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use super::*;
use crate::config::Config;
use crate::db::repositories::test_support::{seed_user, Seeded};
use crate::db::repositories::{
    EntryRepository, LikeRepository, SessionRepository, ShareRepository, SqlxEntryRepository,
    SqlxLikeRepository, SqlxSessionRepository, SqlxShareRepository,
};
use crate::models::{EntryKind, Session, TargetKind};
use crate::theme::ThemeEngine;

struct TestApp {
    router: Router,
    seeded: Seeded,
    _templates: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::build("http://localhost:3000", &[]).await
    }

    async fn with_cors_origin(cors_origin: &str) -> Self {
        Self::build(cors_origin, &[]).await
    }

    async fn with_template_override(name: &str, body: &str) -> Self {
        Self::build("http://localhost:3000", &[(name, body)]).await
    }

    async fn build(cors_origin: &str, overrides: &[(&str, &str)]) -> Self {
        let seeded = Seeded::new().await;
        let templates = TempDir::new().unwrap();
        for (name, body) in overrides {
            std::fs::write(templates.path().join(name), body).unwrap();
        }
        let engine = ThemeEngine::new(templates.path()).unwrap();
        let state = AppState::new(seeded.pool.clone(), engine, &Config::default());

        Self {
            router: build_router(state, cors_origin),
            seeded,
            _templates: templates,
        }
    }

    /// Issue a session token for an existing user
    async fn session_for(&self, user_id: i64) -> String {
        let token = format!("token-{}", user_id);
        SqlxSessionRepository::new(self.seeded.pool.clone())
            .create(&Session::new(token.clone(), user_id, Duration::days(1)))
            .await
            .unwrap();
        token
    }

    /// Seed a visitor account and sign it in
    async fn visitor(&self, name: &str) -> (i64, String) {
        let user_id = seed_user(&self.seeded.pool, name).await;
        (user_id, self.session_for(user_id).await)
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_form(&self, uri: &str, token: Option<&str>, body: &str) -> Response {
        let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session={}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    fn entries(&self) -> SqlxEntryRepository {
        SqlxEntryRepository::new(self.seeded.pool.clone())
    }

    fn likes(&self) -> SqlxLikeRepository {
        SqlxLikeRepository::new(self.seeded.pool.clone())
    }
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn json_request(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_post_comment_redirects_to_comment_with_flash() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let piece_id = app.seeded.piece_id;

    let response = app
        .post_form(&format!("/pieces/{}/comments/new", piece_id), Some(&token), "content=Lovely+brushwork")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let entries = app.entries().list_for_target(EntryKind::Comment, piece_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry.content, "Lovely brushwork");
    assert_eq!(location(&response), format!("/pieces/{}#comment-{}", piece_id, entries[0].entry.id));

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("flash=Comment%20posted."));
}

#[tokio::test]
async fn test_anonymous_comment_is_unauthorized() {
    let app = TestApp::new().await;
    let piece_id = app.seeded.piece_id;

    let response = app
        .post_form(&format!("/pieces/{}/comments/new", piece_id), None, "content=hi")
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.entries().count_for_target(EntryKind::Comment, piece_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_comment_on_missing_piece_is_not_found() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;

    let response = app.post_form("/pieces/9999/comments/new", Some(&token), "content=hi").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_submission_redirects_to_target() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let exhibition_id = app.seeded.exhibition_id;
    let uri = format!("/exhibitions/{}/guestbook/new", exhibition_id);

    let response = app.get(&uri, Some(&format!("session={}", token))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/exhibitions/{}", exhibition_id));

    let response = app.post_form(&uri, Some(&token), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/exhibitions/{}", exhibition_id));
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    assert_eq!(
        app.entries().count_for_target(EntryKind::Guestbook, exhibition_id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_blank_content_is_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;

    let response = app
        .post_form(&format!("/pieces/{}/comments/new", app.seeded.piece_id), Some(&token), "content=+++")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_guestbook_entry_ownership() {
    let app = TestApp::new().await;
    let (_, alice) = app.visitor("alice").await;
    let (_, bob) = app.visitor("bob").await;
    let exhibition_id = app.seeded.exhibition_id;

    app.post_form(&format!("/exhibitions/{}/guestbook/new", exhibition_id), Some(&alice), "content=Hello")
        .await;
    let entry_id = app.entries().list_for_target(EntryKind::Guestbook, exhibition_id).await.unwrap()[0]
        .entry
        .id;
    let uri = format!("/guestbook/{}/delete", entry_id);

    let response = app.post_form(&uri, None, "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.post_form(&uri, Some(&bob), "").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.entries().get_by_id(EntryKind::Guestbook, entry_id).await.unwrap().is_some());

    let response = app.post_form(&uri, Some(&alice), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/exhibitions/{}", exhibition_id));
    assert!(response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .starts_with("flash=Guestbook%20entry%20deleted."));
    assert!(app.entries().get_by_id(EntryKind::Guestbook, entry_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_like_twice_keeps_one_like() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let piece_id = app.seeded.piece_id;
    let uri = format!("/pieces/{}/like", piece_id);

    let first = app.post_form(&uri, Some(&token), "").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    let like = app.likes().list_by_user(TargetKind::Piece, 2, &crate::models::ListParams::new(1, 8)).await.unwrap().0;
    assert_eq!(like.len(), 1);
    assert_eq!(location(&first), format!("/pieces/{}#like-{}", piece_id, like[0].like.id));

    let second = app.post_form(&uri, Some(&token), "").await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&second), format!("/pieces/{}", piece_id));
    assert_eq!(app.likes().count_for_target(TargetKind::Piece, piece_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_dislike_by_other_user_is_forbidden() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.visitor("alice").await;
    let (_, bob) = app.visitor("bob").await;
    let piece_id = app.seeded.piece_id;

    app.post_form(&format!("/pieces/{}/like", piece_id), Some(&alice), "").await;
    let like = app.likes().find(TargetKind::Piece, piece_id, alice_id).await.unwrap().unwrap();
    let uri = &format!("/piece-likes/{}/delete", like.id);

    let response = app.post_form(uri, Some(&bob), "").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.likes().count_for_target(TargetKind::Piece, piece_id).await.unwrap(), 1);

    let response = app.post_form(uri, Some(&alice), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/pieces/{}", piece_id));
    assert_eq!(app.likes().count_for_target(TargetKind::Piece, piece_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_anonymous_like_and_dislike_are_unauthorized() {
    let app = TestApp::new().await;
    let (alice_id, alice) = app.visitor("alice").await;
    let piece_id = app.seeded.piece_id;

    let response = app.post_form(&format!("/pieces/{}/like", piece_id), None, "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.likes().count_for_target(TargetKind::Piece, piece_id).await.unwrap(), 0);

    app.post_form(&format!("/pieces/{}/like", piece_id), Some(&alice), "").await;
    let like = app.likes().find(TargetKind::Piece, piece_id, alice_id).await.unwrap().unwrap();

    let response = app.post_form(&format!("/piece-likes/{}/delete", like.id), None, "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.likes().get_by_id(TargetKind::Piece, like.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_dislike_missing_like_is_not_found() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;

    let response = app.post_form("/exhibition-likes/42/delete", Some(&token), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_records_every_request() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let exhibition_id = app.seeded.exhibition_id;
    let uri = format!("/exhibitions/{}/share", exhibition_id);

    for _ in 0..3 {
        let response = app.post_form(&uri, Some(&token), "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/exhibitions/{}", exhibition_id));
    }

    let shares = SqlxShareRepository::new(app.seeded.pool.clone());
    assert_eq!(shares.count_for_target(TargetKind::Exhibition, exhibition_id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_detail_page_shows_and_clears_flash() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let piece_id = app.seeded.piece_id;

    let response = app
        .get(
            &format!("/pieces/{}", piece_id),
            Some(&format!("session={}; flash=Comment%20posted.", token)),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("flash=;"));
    assert!(cookie.contains("Max-Age=0"));

    let html = body_text(response).await;
    assert!(html.contains("Comment posted."));
    assert!(html.contains("Piece"));
    assert!(html.contains("alice"));
}

#[tokio::test]
async fn test_detail_page_missing_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/exhibitions/777", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Error 404"));
}

#[tokio::test]
async fn test_liked_listing_requires_auth_and_checks_page() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;
    let cookie = format!("session={}", token);

    let response = app.get("/me/likes/pieces", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/me/likes/pieces", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/me/likes/pieces?page=2", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/me/likes/exhibitions?page=0", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_liked_listing_shows_target_names() {
    let app = TestApp::new().await;
    let (_, token) = app.visitor("alice").await;

    app.post_form(&format!("/exhibitions/{}/like", app.seeded.exhibition_id), Some(&token), "")
        .await;

    let response = app.get("/me/likes/exhibitions", Some(&format!("session={}", token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Liked exhibitions"));
    assert!(html.contains(&format!("/exhibitions/{}", app.seeded.exhibition_id)));
}

#[tokio::test]
async fn test_search_pages() {
    let app = TestApp::new().await;

    let response = app.get("/search/exhibitions/About", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("1 result"));

    let response = app.get("/search/pieces/Oil", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(&format!("/pieces/{}", app.seeded.piece_id)));

    let response = app.get("/search/pieces/nothing-matches?page=2", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_taxonomy_pages() {
    let app = TestApp::new().await;

    let response = app.get("/categories/modern", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Exhibition"));

    let response = app.get("/materials/oil", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/categories/modern-art", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wildcard_cors_origin_is_ignored() {
    let app = TestApp::with_cors_origin("*").await;

    let response = app
        .send(
            Request::get(format!("/exhibitions/{}", app.seeded.exhibition_id))
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_broken_template_is_server_error() {
    let app = TestApp::with_template_override("piece_detail.html", "{{ no_such.field }}").await;

    let response = app.get(&format!("/pieces/{}", app.seeded.piece_id), None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(body.contains(crate::theme::RENDER_FAILURE_MESSAGE));
    assert!(!body.contains("no_such"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/no/such/page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_me_logout() {
    let app = TestApp::new().await;

    let register = Request::post("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"username":"carol","email":"carol@example.com","password":"secret"}"#,
        ))
        .unwrap();
    let response = app.send(register).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers()[header::SET_COOKIE].to_str().unwrap().starts_with("session="));

    let login = Request::post("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username_or_email":"carol@example.com","password":"secret"}"#))
        .unwrap();
    let response = app.send(login).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "carol");
    let token = json["token"].as_str().unwrap().to_string();

    let me = Request::get("/api/v1/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(me).await.status(), StatusCode::OK);

    let logout = Request::post("/api/v1/auth/logout")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(logout).await.status(), StatusCode::NO_CONTENT);

    let me = Request::get("/api/v1/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(me).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let login = Request::post("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username_or_email":"nobody","password":"nope"}"#))
        .unwrap();
    let response = app.send(login).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_curator_api() {
    let app = TestApp::new().await;
    let curator = app.session_for(app.seeded.user_id).await;
    let (_, other) = app.visitor("mallory").await;
    let pieces_uri = format!("/api/v1/curator/exhibitions/{}/pieces", app.seeded.exhibition_id);

    let response = app
        .send(json_request("/api/v1/curator/categories", None, r#"{"name":"Modern Art"}"#.to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request("/api/v1/curator/categories", Some(&curator), r#"{"name":"Modern Art"}"#.to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["slug"], "modern-art");

    let response = app
        .send(json_request("/api/v1/curator/categories", Some(&curator), r#"{"name":"Modern Art"}"#.to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            &pieces_uri,
            Some(&other),
            format!(r#"{{"name":"Forgery","author":"Mallory","material_id":{}}}"#, app.seeded.material_id),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            &pieces_uri,
            Some(&curator),
            format!(r#"{{"name":"Sunrise","author":"Monet","material_id":{}}}"#, app.seeded.material_id),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["name"], "Sunrise");

    let list = Request::get("/api/v1/curator/categories")
        .header(header::AUTHORIZATION, format!("Bearer {}", curator))
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.send(list).await).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}
