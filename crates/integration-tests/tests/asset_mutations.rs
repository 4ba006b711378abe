//! Asset create/update/delete flows through the full application surface.

use kv_library_client::catalog::workflow::PLACEHOLDER_THUMBNAIL;
use kv_library_client::catalog::{Attachment, CatalogFilter, MutationError};
use kv_library_client::error::RemoteError;
use kv_library_client::nav::{Page, Transition};
use kv_library_core::Role;

use kv_library_integration_tests::{Backend, TestApp, asset, complete_draft, user};

fn editor_backend() -> Backend {
    let backend = Backend::new();
    backend.add_user(
        "sari@example.com",
        "hunter2",
        user("u-1", "Sari", "sari@example.com", Role::Editor),
    );
    backend
}

async fn editor_app(backend: &Backend) -> TestApp {
    backend.signed_in_app("sari@example.com", "hunter2").await
}

fn attachment() -> Attachment {
    Attachment {
        file_name: "kv.png".to_owned(),
        content_type: "image/png".to_owned(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

#[tokio::test]
async fn test_create_then_load_contains_the_asset_exactly_once() {
    let backend = editor_backend();
    let mut app = editor_app(&backend).await;

    app.new_asset();
    let transition = app
        .submit_asset(&complete_draft("KV Lebaran"), Some(attachment()))
        .await
        .expect("submit");

    assert_eq!(transition, Transition::Moved(Page::Dashboard));
    assert_eq!(backend.bucket.upload_count(), 1);

    let view = app.filtered_view(&CatalogFilter::default());
    let matches: Vec<_> = view.iter().filter(|a| a.name == "KV Lebaran").collect();
    assert_eq!(matches.len(), 1);
    let created = matches.first().expect("created asset");
    assert!(created.thumbnail.starts_with("https://cdn.test/thumbnails/"));
    assert!(created.thumbnail.ends_with(".png"));
}

#[tokio::test]
async fn test_create_without_attachment_uses_placeholder() {
    let backend = editor_backend();
    let mut app = editor_app(&backend).await;

    app.new_asset();
    app.submit_asset(&complete_draft("KV Plain"), None)
        .await
        .expect("submit");

    assert_eq!(backend.bucket.upload_count(), 0);
    let view = app.filtered_view(&CatalogFilter::default());
    assert_eq!(
        view.first().map(|a| a.thumbnail.as_str()),
        Some(PLACEHOLDER_THUMBNAIL)
    );
}

#[tokio::test]
async fn test_edit_without_new_attachment_keeps_thumbnail() {
    let backend = editor_backend();
    let mut seeded = asset("kv-a", "KV Original", 1);
    seeded.thumbnail = "https://cdn.test/thumbnails/existing.png".to_owned();
    backend.assets.seed(seeded);
    let mut app = editor_app(&backend).await;

    let id = app.collection().assets.first().expect("seeded").id.clone();
    app.view_details(&id);
    app.edit_selected();
    app.submit_asset(&complete_draft("KV Renamed"), None)
        .await
        .expect("submit");

    let view = app.filtered_view(&CatalogFilter::default());
    assert_eq!(view.len(), 1);
    let updated = view.first().expect("updated asset");
    assert_eq!(updated.name, "KV Renamed");
    assert_eq!(updated.thumbnail, "https://cdn.test/thumbnails/existing.png");
    assert_eq!(backend.bucket.upload_count(), 0);
}

#[tokio::test]
async fn test_delete_then_load_contains_nothing() {
    let backend = editor_backend();
    backend.assets.seed(asset("kv-a", "KV Doomed", 1));
    let mut app = editor_app(&backend).await;

    let id = app.collection().assets.first().expect("seeded").id.clone();
    app.view_details(&id);
    let transition = app.delete_selected().await.expect("delete");

    assert_eq!(transition, Transition::Moved(Page::Dashboard));
    assert!(app.filtered_view(&CatalogFilter::default()).is_empty());
    assert_eq!(backend.assets.row_count(), 0);
}

#[tokio::test]
async fn test_guest_never_reaches_the_form() {
    let backend = Backend::new();
    backend.add_user(
        "visitor@example.com",
        "hunter2",
        user("u-2", "Visitor", "visitor@example.com", Role::Guest),
    );
    backend.assets.seed(asset("kv-a", "KV March", 1));
    let mut app = backend.signed_in_app("visitor@example.com", "hunter2").await;

    assert_eq!(app.new_asset(), Transition::Blocked);
    let id = app.collection().assets.first().expect("seeded").id.clone();
    app.view_details(&id);
    assert_eq!(app.edit_selected(), Transition::Blocked);
    assert_eq!(app.page(), Page::AssetDetails);

    // Submitting without ever reaching the form is a no-op.
    let loads_before = backend.assets.load_count();
    let transition = app
        .submit_asset(&complete_draft("KV Sneaky"), None)
        .await
        .expect("no-op");
    assert_eq!(transition, Transition::Blocked);
    assert_eq!(backend.assets.load_count(), loads_before);
    assert_eq!(backend.assets.row_count(), 1);
}

#[tokio::test]
async fn test_validation_failure_keeps_form_open_and_store_untouched() {
    let backend = editor_backend();
    let mut app = editor_app(&backend).await;
    app.new_asset();

    let mut draft = complete_draft("");
    draft.campaign_type = None;
    let err = app.submit_asset(&draft, None).await.expect_err("must fail");

    assert!(matches!(err, MutationError::Validation(_)));
    assert_eq!(app.page(), Page::AssetForm);
    assert_eq!(backend.assets.row_count(), 0);
}

#[tokio::test]
async fn test_failed_upload_aborts_the_record_write() {
    let backend = editor_backend();
    backend.bucket.set_failing(true);
    let mut app = editor_app(&backend).await;
    app.new_asset();

    let err = app
        .submit_asset(&complete_draft("KV Broken"), Some(attachment()))
        .await
        .expect_err("must fail");

    assert!(matches!(err, MutationError::Remote(_)));
    assert_eq!(app.page(), Page::AssetForm);
    assert_eq!(backend.assets.row_count(), 0);
}

#[tokio::test]
async fn test_denied_write_surfaces_and_changes_nothing() {
    let backend = editor_backend();
    backend.assets.seed(asset("kv-a", "KV Protected", 1));
    backend.assets.set_denying_writes(true);
    let mut app = editor_app(&backend).await;

    let id = app.collection().assets.first().expect("seeded").id.clone();
    app.view_details(&id);
    let err = app.delete_selected().await.expect_err("must fail");

    assert!(matches!(err, RemoteError::Denied(_)));
    assert_eq!(app.page(), Page::AssetDetails);
    assert_eq!(backend.assets.row_count(), 1);
}
