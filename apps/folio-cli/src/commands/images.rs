use serde_json::json;

use folio_core::domain::{ImageId, PostId, RejectedFile};
use folio_core::services::PostAggregate;

use crate::cli::{ImageCommand, OutputFormat};
use crate::confirm::confirm;
use crate::files::{self, Picked};
use crate::output::{self, Table};
use crate::state::AppState;

pub async fn handle(
    action: ImageCommand,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        ImageCommand::Add {
            post_id,
            files: paths,
            names,
        } => {
            let post = state.posts.open(&PostId::new(post_id)).await?;
            let picked = files::load_images(&paths, state.posts.limits().max_bytes).await?;
            let rejected = stage_named(&post, picked, names).await?;
            files::report_rejections(&rejected);

            let images = post.commit_images().await?;
            output::print(&images, format, || output::images_table(&images))
        }
        ImageCommand::Rename {
            post_id,
            image_id,
            name,
        } => {
            let post = state.posts.open(&PostId::new(post_id)).await?;
            let image_id = ImageId::new(image_id);
            post.rename_image(&image_id, name).await?;

            let snapshot = post.snapshot().await;
            let renamed: Vec<_> = snapshot.image(&image_id).into_iter().cloned().collect();
            output::print(&renamed, format, || output::images_table(&renamed))
        }
        ImageCommand::Remove {
            post_id,
            image_id,
            yes,
        } => {
            let image_id = ImageId::new(image_id);
            confirm(&format!("remove image {image_id}"), yes)?;
            let post = state.posts.open(&PostId::new(post_id)).await?;
            post.remove_image(&image_id).await?;

            output::print(&json!({ "id": &image_id, "removed": true }), format, || {
                Table::record(vec![("removed", image_id.to_string())])
            })
        }
    }
}

/// Stage files one by one so the n-th `--name` labels the n-th path, even
/// when earlier paths are rejected.
async fn stage_named(
    post: &PostAggregate,
    picked: Vec<Picked>,
    names: Vec<String>,
) -> anyhow::Result<Vec<RejectedFile>> {
    let mut names = names.into_iter();
    let mut rejected = Vec::new();

    for entry in picked {
        let name = names.next();
        match entry {
            Picked::Skipped(file) => rejected.push(file),
            Picked::Loaded(file) => {
                let outcome = post.stage_images(vec![file]).await;
                rejected.extend(outcome.rejected);
                if let (Some(id), Some(name)) = (outcome.staged.first(), name) {
                    post.rename_staged(*id, name).await?;
                }
            }
        }
    }
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_core::domain::{ImageFile, NewPost, RejectionReason, Role};
    use folio_core::services::PostService;
    use folio_infra::{InMemoryBackend, SessionCredentials};

    use super::*;

    async fn draft() -> PostAggregate {
        let backend = InMemoryBackend::new();
        let user = backend
            .add_user("author", "author@folio.test", "secret", Role::Employee)
            .await;
        let credentials = Arc::new(SessionCredentials::new(Some(
            backend.issue_token(&user.id).await,
        )));
        PostService::new(Arc::new(backend.gateway(credentials)))
            .create(NewPost::new("Gallery"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_names_follow_paths_past_rejected_files() {
        let post = draft().await;
        let picked = vec![
            Picked::Loaded(ImageFile::new("notes.txt", b"hello".to_vec())),
            Picked::Loaded(ImageFile::new("cover.png", vec![1; 16])),
            Picked::Loaded(ImageFile::new("inline.jpg", vec![1; 16])),
        ];
        let names = vec!["Notes label".to_string(), "Cover label".to_string()];

        let rejected = stage_named(&post, picked, names).await.unwrap();

        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].file_name, "notes.txt");
        let staged: Vec<_> = post.staged().await.into_iter().map(|p| p.name).collect();
        assert_eq!(staged, vec!["Cover label", "inline"]);
    }

    #[tokio::test]
    async fn test_skipped_files_keep_their_name_slot() {
        let post = draft().await;
        let picked = vec![
            Picked::Skipped(RejectedFile {
                file_name: "huge.png".to_string(),
                reason: RejectionReason::TooLarge { size: 9, limit: 1 },
            }),
            Picked::Loaded(ImageFile::new("small.gif", vec![1; 4])),
        ];
        let names = vec!["Huge".to_string(), "Small".to_string()];

        let rejected = stage_named(&post, picked, names).await.unwrap();

        assert_eq!(rejected[0].file_name, "huge.png");
        assert_eq!(post.staged().await[0].name, "Small");
    }
}
