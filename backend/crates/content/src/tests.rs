//! Unit tests for the content crate

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use auth::MemoryAuditSink;
    use kernel::id::{ContentItemId, IdentityId};

    use crate::application::{DraftInput, ManageContentUseCase};
    use crate::domain::entity::ContentItem;
    use crate::domain::value_object::ContentKind;
    use crate::infra::MemoryContentRepository;

    pub fn draft(slug: &str) -> DraftInput {
        DraftInput {
            slug: slug.to_string(),
            title: format!("Title of {slug}"),
            summary: String::new(),
            body: serde_json::json!({ "blocks": [] }),
            course_id: None,
            published: true,
        }
    }

    pub fn child_of(slug: &str, course_id: ContentItemId) -> DraftInput {
        DraftInput {
            course_id: Some(course_id),
            ..draft(slug)
        }
    }

    pub struct Fixture {
        pub repo: Arc<MemoryContentRepository>,
        pub audit: Arc<MemoryAuditSink>,
        pub author: IdentityId,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                repo: Arc::new(MemoryContentRepository::new()),
                audit: Arc::new(MemoryAuditSink::new()),
                author: IdentityId::new(),
            }
        }

        pub fn manage(&self) -> ManageContentUseCase<MemoryContentRepository> {
            ManageContentUseCase::new(self.repo.clone(), self.audit.clone())
        }

        pub async fn create(&self, kind: ContentKind, input: DraftInput) -> ContentItem {
            self.manage().create(self.author, kind, input).await.unwrap()
        }
    }
}

#[cfg(test)]
mod manage_tests {
    use super::support::*;
    use crate::domain::value_object::ContentKind;
    use crate::error::ContentError;
    use kernel::id::ContentItemId;

    #[tokio::test]
    async fn test_create_normalizes_fields() {
        let fixture = Fixture::new();
        let mut input = draft("Intro-Post");
        input.title = "  Hello  ".to_string();
        input.body = serde_json::Value::Null;

        let item = fixture.create(ContentKind::Blog, input).await;

        assert_eq!(item.slug.as_str(), "intro-post");
        assert_eq!(item.title, "Hello");
        assert_eq!(item.body, serde_json::json!({}));
        assert_eq!(item.author_id, fixture.author);
        assert_eq!(item.created_at, item.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let fixture = Fixture::new();
        let manage = fixture.manage();

        let mut bad_slug = draft("ok");
        bad_slug.slug = "Bad Slug!".to_string();
        let mut no_title = draft("ok");
        no_title.title = "   ".to_string();
        let mut scalar_body = draft("ok");
        scalar_body.body = serde_json::json!("just text");

        for input in [bad_slug, no_title, scalar_body] {
            let result = manage.create(fixture.author, ContentKind::Blog, input).await;
            assert!(matches!(result, Err(ContentError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_slug_conflict_within_kind() {
        let fixture = Fixture::new();
        fixture.create(ContentKind::Blog, draft("welcome")).await;
        fixture.create(ContentKind::Course, draft("welcome")).await;

        let result = fixture
            .manage()
            .create(fixture.author, ContentKind::Blog, draft("welcome"))
            .await;
        assert!(matches!(result, Err(ContentError::SlugTaken)));
    }

    #[tokio::test]
    async fn test_parent_course_rules() {
        let fixture = Fixture::new();
        let manage = fixture.manage();
        let course = fixture.create(ContentKind::Course, draft("rust-101")).await;
        let blog = fixture.create(ContentKind::Blog, draft("news")).await;

        let video = fixture
            .create(ContentKind::Video, child_of("lesson-1", course.id))
            .await;
        assert_eq!(video.course_id, Some(course.id));

        // Only materials and videos have a parent
        let result = manage
            .create(fixture.author, ContentKind::Blog, child_of("nested", course.id))
            .await;
        assert!(matches!(result, Err(ContentError::InvalidInput(_))));

        // The parent must be an existing course
        for parent in [blog.id, ContentItemId::new()] {
            let result = manage
                .create(fixture.author, ContentKind::Material, child_of("sheet", parent))
                .await;
            assert!(matches!(result, Err(ContentError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_update_replaces_editable_fields() {
        let fixture = Fixture::new();
        let item = fixture.create(ContentKind::Blog, draft("first")).await;

        let mut input = draft("renamed");
        input.published = false;
        let updated = fixture
            .manage()
            .update(fixture.author, ContentKind::Blog, &item.id, input)
            .await
            .unwrap();

        assert_eq!(updated.id, item.id);
        assert_eq!(updated.slug.as_str(), "renamed");
        assert!(!updated.published);
        assert_eq!(updated.author_id, item.author_id);
        assert_eq!(updated.created_at, item.created_at);
        assert!(updated.updated_at >= item.updated_at);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let fixture = Fixture::new();
        let manage = fixture.manage();
        let blog = fixture.create(ContentKind::Blog, draft("taken")).await;
        let other = fixture.create(ContentKind::Blog, draft("other")).await;
        let material = fixture.create(ContentKind::Material, draft("sheet")).await;

        let result = manage
            .update(fixture.author, ContentKind::Blog, &ContentItemId::new(), draft("x"))
            .await;
        assert!(matches!(result, Err(ContentError::NotFound)));

        // Wrong kind for an existing id
        let result = manage.update(fixture.author, ContentKind::Video, &blog.id, draft("x")).await;
        assert!(matches!(result, Err(ContentError::NotFound)));

        let result = manage.update(fixture.author, ContentKind::Blog, &other.id, draft("taken")).await;
        assert!(matches!(result, Err(ContentError::SlugTaken)));

        let result = manage
            .update(fixture.author, ContentKind::Material, &material.id, child_of("sheet", material.id))
            .await;
        assert!(matches!(result, Err(ContentError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_course_keeps_children() {
        let fixture = Fixture::new();
        let manage = fixture.manage();
        let course = fixture.create(ContentKind::Course, draft("course")).await;
        let material = fixture
            .create(ContentKind::Material, child_of("notes", course.id))
            .await;

        manage.delete(fixture.author, ContentKind::Course, &course.id).await.unwrap();

        let remaining = manage.list(ContentKind::Material).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, material.id);
        assert_eq!(remaining[0].course_id, None);

        let result = manage.delete(fixture.author, ContentKind::Course, &course.id).await;
        assert!(matches!(result, Err(ContentError::NotFound)));
    }

    #[tokio::test]
    async fn test_mutations_are_audited() {
        use auth::models::audit::{AuditKind, AuditOutcome};

        let fixture = Fixture::new();
        let manage = fixture.manage();
        let item = fixture.create(ContentKind::Blog, draft("audited")).await;
        manage
            .update(fixture.author, ContentKind::Blog, &item.id, draft("audited-2"))
            .await
            .unwrap();
        manage
            .delete(fixture.author, ContentKind::Blog, &item.id)
            .await
            .unwrap();

        // Failed mutations leave no trace
        let _ = manage
            .delete(fixture.author, ContentKind::Blog, &item.id)
            .await;

        let events = fixture.audit.events();
        let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["create_content", "update_content", "delete_content"]);

        for event in &events {
            assert_eq!(event.kind, AuditKind::AdminAction);
            assert_eq!(event.outcome, AuditOutcome::Success);
            assert_eq!(event.actor, fixture.author.to_string());
            assert_eq!(event.metadata["target"], item.id.to_string());
            assert_eq!(event.metadata["kind"], "blog");
        }
    }

    #[tokio::test]
    async fn test_list_includes_drafts_newest_first() {
        let fixture = Fixture::new();
        let mut hidden = draft("hidden");
        hidden.published = false;
        let first = fixture.create(ContentKind::Blog, draft("first")).await;
        let second = fixture.create(ContentKind::Blog, hidden).await;

        let items = fixture.manage().list(ContentKind::Blog).await.unwrap();

        assert_eq!(items.len(), 2);
        assert!(items[0].created_at >= items[1].created_at);
        assert!(items.iter().any(|item| item.id == first.id));
        assert!(items.iter().any(|item| item.id == second.id));
    }
}

#[cfg(test)]
mod browse_tests {
    use super::support::*;
    use crate::application::BrowseContentUseCase;
    use crate::domain::value_object::ContentKind;
    use crate::error::ContentError;

    #[tokio::test]
    async fn test_get_by_id_or_slug() {
        let fixture = Fixture::new();
        let item = fixture.create(ContentKind::Blog, draft("hello-world")).await;
        let browse = BrowseContentUseCase::new(fixture.repo.clone());

        let by_id = browse
            .get(ContentKind::Blog, &item.id.to_string())
            .await
            .unwrap();
        let by_slug = browse.get(ContentKind::Blog, "hello-world").await.unwrap();

        assert_eq!(by_id.id, item.id);
        assert_eq!(by_slug.id, item.id);
    }

    #[tokio::test]
    async fn test_drafts_are_not_found() {
        let fixture = Fixture::new();
        let mut input = draft("secret");
        input.published = false;
        let item = fixture.create(ContentKind::Course, input).await;
        let browse = BrowseContentUseCase::new(fixture.repo.clone());

        for key in [item.id.to_string(), "secret".to_string(), "NOT a slug".to_string()] {
            let result = browse.get(ContentKind::Course, &key).await;
            assert!(matches!(result, Err(ContentError::NotFound)));
        }
        assert!(browse.list(ContentKind::Course, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_course() {
        let fixture = Fixture::new();
        let rust = fixture.create(ContentKind::Course, draft("rust")).await;
        let go = fixture.create(ContentKind::Course, draft("go")).await;
        fixture.create(ContentKind::Video, child_of("ownership", rust.id)).await;
        fixture.create(ContentKind::Video, child_of("goroutines", go.id)).await;
        let mut unpublished = child_of("lifetimes", rust.id);
        unpublished.published = false;
        fixture.create(ContentKind::Video, unpublished).await;

        let browse = BrowseContentUseCase::new(fixture.repo.clone());
        let videos = browse.list(ContentKind::Video, Some(rust.id)).await.unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].slug.as_str(), "ownership");
        assert_eq!(browse.list(ContentKind::Video, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_unavailable() {
        let fixture = Fixture::new();
        fixture.repo.set_unavailable(true);

        let result = BrowseContentUseCase::new(fixture.repo.clone())
            .list(ContentKind::Blog, None)
            .await;
        assert!(matches!(result, Err(ContentError::StoreUnavailable(_))));
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::ContentError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ContentError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ContentError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ContentError::SlugTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ContentError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = ContentError::Internal("row decode failed".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(!body.contains("row decode"));
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use auth::models::display_name::DisplayName;
    use auth::models::identity::VerifiedIdentity;
    use auth::{AuthConfig, GateState, MemoryAuditSink, MemoryAuthRepository, SessionIssuer, UserRole};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use kernel::id::IdentityId;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::infra::MemoryContentRepository;
    use crate::presentation::{ContentAppState, admin_content_router, content_router};

    struct TestApp {
        router: Router,
        issuer: SessionIssuer<MemoryAuthRepository>,
        audit: Arc<MemoryAuditSink>,
    }

    impl TestApp {
        fn new() -> Self {
            let auth_repo = Arc::new(MemoryAuthRepository::new());
            let auth_config = Arc::new(AuthConfig::development());
            let audit = Arc::new(MemoryAuditSink::new());
            let state = ContentAppState::new(
                Arc::new(MemoryContentRepository::new()),
                audit.clone(),
            );

            let router = Router::new()
                .nest("/content", content_router(state.clone()))
                .nest(
                    "/admin/content",
                    admin_content_router(
                        state,
                        GateState::new(auth_repo.clone(), auth_config.clone(), UserRole::Admin),
                    ),
                );

            Self {
                router,
                issuer: SessionIssuer::new(auth_repo, auth_config),
                audit,
            }
        }

        async fn token(&self, role: UserRole) -> (IdentityId, String) {
            let identity = VerifiedIdentity {
                id: IdentityId::new(),
                role,
                display_name: DisplayName::new("Editor").unwrap(),
            };
            let issued = self.issuer.issue(&identity).await.unwrap();
            (identity.id, issued.token)
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }
    }

    fn item(slug: &str, published: bool) -> Value {
        json!({
            "slug": slug,
            "title": "A title",
            "summary": "Short",
            "body": { "blocks": [{ "type": "paragraph", "text": "hi" }] },
            "published": published,
        })
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let app = TestApp::new();
        let (_, user_token) = app.token(UserRole::User).await;

        let (status, body) = app
            .send("POST", "/admin/content/blog", None, Some(item("a", true)))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authentication required");

        let (status, _) = app
            .send("GET", "/admin/content/blog", Some(&user_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send("POST", "/admin/content/blog", Some("garbage.token.value"), Some(item("a", true)))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_crud_flow() {
        let app = TestApp::new();
        let (admin_id, token) = app.token(UserRole::Admin).await;

        let (status, created) = app
            .send("POST", "/admin/content/courses", Some(&token), Some(item("rust", false)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["kind"], "course");
        assert_eq!(created["authorId"], admin_id.to_string());
        let id = created["id"].as_str().unwrap().to_string();

        // Drafts are hidden from the public router
        let (status, _) = app.send("GET", "/content/course/rust", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, listed) = app.send("GET", "/admin/content/course", Some(&token), None).await;
        assert_eq!(listed["items"].as_array().unwrap().len(), 1);

        let (status, updated) = app
            .send(
                "PUT",
                &format!("/admin/content/course/{id}"),
                Some(&token),
                Some(item("rust", true)),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["published"], true);

        let (status, fetched) = app.send("GET", "/content/courses/rust", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id.as_str());
        assert_eq!(fetched["body"]["blocks"][0]["text"], "hi");

        let (status, _) = app
            .send("DELETE", &format!("/admin/content/course/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.send("GET", &format!("/content/course/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let events = app.audit.events();
        let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["create_content", "update_content", "delete_content"]);
        assert!(events.iter().all(|e| e.actor == admin_id.to_string()));
    }

    #[tokio::test]
    async fn test_public_listing_with_course_filter() {
        let app = TestApp::new();
        let (_, token) = app.token(UserRole::Admin).await;

        let (_, course) = app
            .send("POST", "/admin/content/course", Some(&token), Some(item("intro", true)))
            .await;
        let course_id = course["id"].as_str().unwrap().to_string();

        let mut video = item("first-steps", true);
        video["courseId"] = json!(course_id);
        let (status, _) = app
            .send("POST", "/admin/content/video", Some(&token), Some(video))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        app.send("POST", "/admin/content/video", Some(&token), Some(item("standalone", true)))
            .await;

        let (status, all) = app.send("GET", "/content/videos", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["items"].as_array().unwrap().len(), 2);

        let (_, filtered) = app
            .send("GET", &format!("/content/videos?course={course_id}"), None, None)
            .await;
        let filtered = filtered["items"].as_array().unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["slug"], "first-steps");

        let (status, _) = app.send("GET", "/content/videos?course=nope", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_responses() {
        let app = TestApp::new();
        let (_, token) = app.token(UserRole::Admin).await;

        let (status, _) = app.send("GET", "/content/podcasts", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.send("POST", "/admin/content/blog", Some(&token), Some(item("dup", true)))
            .await;
        let (status, body) = app
            .send("POST", "/admin/content/blog", Some(&token), Some(item("dup", true)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["action"], "Choose a different slug");

        let (status, body) = app
            .send("POST", "/admin/content/blog", Some(&token), Some(json!({ "slug": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = app
            .send("PUT", "/admin/content/blog/not-a-uuid", Some(&token), Some(item("x", true)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
