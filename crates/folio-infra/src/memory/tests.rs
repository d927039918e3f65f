use std::sync::Arc;

use pretty_assertions::assert_eq;

use folio_core::domain::{
    ChangeType, HistoryField, ImageFile, NewPost, NewUser, PostPatch, PostStatus, Role,
    StatusFilter, User,
};
use folio_core::ports::{CredentialProvider, UserDirectory};
use folio_core::services::{AccountAdmin, PostListing, PostService};
use folio_core::{DomainError, GatewayError};

use super::{InMemoryBackend, InMemoryGateway};
use crate::credentials::SessionCredentials;

const PNG_HEADER: [u8; 24] = [
    0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 2,
    0x80, 0, 0, 1, 0xe0,
];

struct Session {
    backend: InMemoryBackend,
    credentials: Arc<SessionCredentials>,
    gateway: Arc<InMemoryGateway>,
    user: User,
}

async fn session(role: Role) -> Session {
    let backend = InMemoryBackend::new();
    session_on(&backend, role, "author@folio.test").await
}

async fn session_on(backend: &InMemoryBackend, role: Role, email: &str) -> Session {
    let user = backend.add_user("author", email, "secret", role).await;
    let token = backend.issue_token(&user.id).await;
    let credentials = Arc::new(SessionCredentials::new(Some(token)));
    let gateway = Arc::new(backend.gateway(credentials.clone()));
    Session {
        backend: backend.clone(),
        credentials,
        gateway,
        user,
    }
}

#[tokio::test]
async fn test_create_then_publish_records_two_snapshots() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());

    let post = posts.create(NewPost::new("A")).await.unwrap();
    assert_eq!(post.snapshot().await.status, PostStatus::Draft);

    post.publish().await.unwrap();

    let history = post.history().await.unwrap();
    assert_eq!(history.len(), 2);
    let entries = history.entries();
    assert_eq!(entries[0].change_type, ChangeType::Created);
    assert_eq!(entries[1].change_type, ChangeType::Updated);
    assert_eq!(entries[1].title, "A");
    assert_eq!(entries[0].changed_by.id(), &s.user.id);
}

#[tokio::test]
async fn test_update_changes_only_named_fields() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());

    let post = posts
        .create(NewPost::new("A").with_description("d").with_content("c"))
        .await
        .unwrap();
    let saved = post
        .update(PostPatch::default().content("new body"))
        .await
        .unwrap();

    assert_eq!(saved.title, "A");
    assert_eq!(saved.description, "d");
    assert_eq!(saved.content, "new body");

    let history = post.history().await.unwrap();
    let revisions = history.revisions();
    assert_eq!(revisions[1].changed, vec![HistoryField::Content]);
    assert_eq!(revisions[1].entry.description, "d");
}

#[tokio::test]
async fn test_unchanged_update_records_no_history() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());

    let post = posts.create(NewPost::new("Same")).await.unwrap();
    post.update(PostPatch::default().title("  Same ")).await.unwrap();

    assert_eq!(post.history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_from_stale_aggregate_reaches_backend() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());

    let mine = posts.create(NewPost::new("Hello")).await.unwrap();
    let other = posts.open(mine.id()).await.unwrap();
    other.publish().await.unwrap();

    let saved = mine.unpublish().await.unwrap();
    assert_eq!(saved.status, PostStatus::Draft);
    assert_eq!(posts.get(mine.id()).await.unwrap().status, PostStatus::Draft);
    assert_eq!(mine.snapshot().await.status, PostStatus::Draft);
    assert_eq!(mine.history().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_blank_title_update_leaves_post_untouched() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Kept")).await.unwrap();

    let result = post.update(PostPatch::default().title("   ")).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(posts.get(post.id()).await.unwrap().title, "Kept");
    assert_eq!(post.history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_each_update_appends_one_snapshot_in_order() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Draft 0")).await.unwrap();

    for i in 1..=4 {
        post.update(PostPatch::default().title(format!("Draft {i}")))
            .await
            .unwrap();
    }

    let history = post.history().await.unwrap();
    assert_eq!(history.len(), 5);
    let entries = history.entries();
    assert!(entries.windows(2).all(|w| w[0].changed_at < w[1].changed_at));
    assert_eq!(entries[4].title, "Draft 4");
}

#[tokio::test]
async fn test_second_page_of_fifteen_holds_five() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    for i in 1..=15 {
        posts.create(NewPost::new(format!("Post {i}"))).await.unwrap();
    }

    let mut listing = PostListing::new(s.gateway.clone());
    listing.set_page(2).unwrap();
    let page = listing.fetch().await.unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 15);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items[0].title, "Post 5");
}

#[tokio::test]
async fn test_listing_paginates_newest_first() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    for i in 1..=12 {
        posts.create(NewPost::new(format!("Post {i}"))).await.unwrap();
    }

    let mut listing = PostListing::new(s.gateway.clone());
    let first = listing.fetch().await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total, 12);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].title, "Post 12");

    listing.set_page(2).unwrap();
    let second = listing.fetch().await.unwrap();
    assert_eq!(second.items.len(), 2);
    assert!(second.is_last());

    listing.set_page(3).unwrap();
    let beyond = listing.fetch().await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 12);
}

#[tokio::test]
async fn test_listing_filters_by_status_and_search() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let rust = posts.create(NewPost::new("Learning Rust")).await.unwrap();
    rust.publish().await.unwrap();
    posts
        .create(NewPost::new("Gardening").with_description("about rust on tools"))
        .await
        .unwrap();
    posts.create(NewPost::new("Cooking")).await.unwrap();

    let mut listing = PostListing::new(s.gateway.clone());
    listing.set_search(Some("RUST"));
    assert_eq!(listing.fetch().await.unwrap().total, 2);

    listing.set_status(StatusFilter::Only(PostStatus::Published));
    let page = listing.fetch().await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Learning Rust");
}

#[tokio::test]
async fn test_empty_collection_has_no_pages() {
    let s = session(Role::Employee).await;
    let page = PostListing::new(s.gateway.clone()).fetch().await.unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_commit_appends_images_in_staging_order() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Gallery")).await.unwrap();

    let outcome = post
        .stage_images(vec![
            ImageFile::new("cover.png", PNG_HEADER.to_vec()),
            ImageFile::new("notes.txt", b"hello".to_vec()),
            ImageFile::new("second.jpg", vec![0xff, 0xd8, 0xff]),
        ])
        .await;
    assert_eq!(outcome.staged.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);

    let images = post.commit_images().await.unwrap();
    let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["cover", "second"]);
    assert_eq!((images[0].width, images[0].height), (640, 480));
    assert!(post.staged().await.is_empty());

    let stored = posts.get(post.id()).await.unwrap();
    assert_eq!(stored.images, post.snapshot().await.images);
}

#[tokio::test]
async fn test_image_rename_and_removal_leave_history_alone() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Gallery")).await.unwrap();
    post.stage_images(vec![ImageFile::new("a.gif", b"GIF89a\x10\x00\x08\x00".to_vec())])
        .await;
    let image = post.commit_images().await.unwrap().remove(0);
    assert_eq!((image.width, image.height), (16, 8));

    post.rename_image(&image.id, "  Banner ").await.unwrap();
    let once = post.snapshot().await;
    assert_eq!(once.images[0].name, "Banner");

    post.rename_image(&image.id, "Banner").await.unwrap();
    assert_eq!(post.snapshot().await.images, once.images);

    post.remove_image(&image.id).await.unwrap();
    assert!(post.snapshot().await.images.is_empty());
    assert_eq!(post.history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_image_is_not_found() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Gallery")).await.unwrap();

    let err = post.remove_image(&"missing".into()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_history_survives_post_deletion() {
    let s = session(Role::Admin).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Short lived")).await.unwrap();
    let id = post.id().clone();

    post.delete(&s.user).await.unwrap();
    assert!(post.is_closed());

    let err = posts.get(&id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(posts.history().list(&id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_employee_cannot_delete_even_past_the_client_check() {
    let s = session(Role::Employee).await;
    let posts = PostService::new(s.gateway.clone());
    let post = posts.create(NewPost::new("Keep")).await.unwrap();

    let mut forged = s.user.clone();
    forged.role = Role::Admin;
    let err = posts.delete(&forged, post.id()).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn test_rejected_credential_is_invalidated() {
    let s = session(Role::Employee).await;
    let mut events = s.credentials.subscribe();
    s.backend.revoke_tokens(&s.user.id).await;

    let err = PostListing::new(s.gateway.clone()).fetch().await.unwrap_err();

    assert!(matches!(err, DomainError::Unauthenticated));
    events.changed().await.unwrap();
    assert_eq!(s.credentials.bearer_token(), None);
}

#[tokio::test]
async fn test_account_admin_requires_admin_role() {
    let backend = InMemoryBackend::new();
    let admin = session_on(&backend, Role::Admin, "admin@folio.test").await;
    let employee = session_on(&backend, Role::Employee, "staff@folio.test").await;

    let err = AccountAdmin::for_current_user(employee.gateway.clone())
        .await
        .unwrap()
        .list_users()
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let accounts = AccountAdmin::for_current_user(admin.gateway.clone())
        .await
        .unwrap();
    let created = accounts
        .create_user(NewUser {
            username: " writer ".to_string(),
            email: "writer@folio.test".to_string(),
            password: "pw".to_string(),
            role: Role::Employee,
        })
        .await
        .unwrap();
    assert_eq!(created.username, "writer");
    assert_eq!(accounts.list_users().await.unwrap().len(), 3);

    let (user, _token) = backend.login("writer@folio.test", "pw").await.unwrap();
    assert_eq!(user.id, created.id);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let s = session(Role::Admin).await;
    let err = s
        .gateway
        .create_user(&NewUser {
            username: "again".to_string(),
            email: "author@folio.test".to_string(),
            password: "pw".to_string(),
            role: Role::Employee,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 409, .. }));
}

#[tokio::test]
async fn test_change_password_checks_current() {
    let s = session(Role::Employee).await;
    assert!(s.gateway.change_password("wrong", "next").await.is_err());
    s.gateway.change_password("secret", "next").await.unwrap();
    assert!(s.backend.login("author@folio.test", "next").await.is_ok());
}
