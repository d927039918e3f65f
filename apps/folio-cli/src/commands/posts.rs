use serde_json::json;

use folio_core::DomainError;
use folio_core::domain::{NewPost, Post, PostId, PostPatch};
use folio_core::services::PostListing;

use crate::cli::{OutputFormat, PostCommand};
use crate::confirm::confirm;
use crate::files;
use crate::output::{self, Table};
use crate::state::AppState;

pub async fn handle(
    action: PostCommand,
    state: &AppState,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        PostCommand::List {
            page,
            limit,
            status,
            search,
        } => {
            let mut listing = PostListing::new(state.gateway.clone());
            listing.set_page_size(limit.unwrap_or(state.page_size))?;
            listing.set_status(status);
            listing.set_search(search.as_deref());
            listing.set_page(page)?;

            let result = listing.fetch().await?;
            output::print(&result, format, || {
                output::posts_table(&result.items).with_footer(format!(
                    "page {} of {}, {} posts",
                    result.page, result.total_pages, result.total
                ))
            })
        }
        PostCommand::Show { id } => {
            let post = state.posts.get(&PostId::new(id)).await?;
            show(&post, format)
        }
        PostCommand::Create {
            title,
            description,
            content,
            images,
        } => {
            // Stage first so bad files are reported before the post exists.
            let picked = files::load_images(&images, state.posts.limits().max_bytes).await?;
            let (picked, mut rejected) = files::split(picked);
            let mut staged = state.posts.attachments();
            rejected.extend(staged.stage(picked).rejected);
            files::report_rejections(&rejected);

            let draft = NewPost::new(title)
                .with_description(description)
                .with_content(content);
            let post = state.posts.create(draft).await?;

            post.adopt_staged(staged).await;
            if let Err(err) = post.commit_images().await {
                tracing::warn!(post_id = %post.id(), error = %err, "Images not uploaded");
                eprintln!(
                    "Post created, but its images were not uploaded: {err}. \
                     Retry with `folio images add {}`.",
                    post.id()
                );
            }
            show(&post.snapshot().await, format)
        }
        PostCommand::Update {
            id,
            title,
            description,
            content,
            status,
        } => {
            let patch = PostPatch {
                title,
                description,
                content,
                status,
            };
            if patch.is_empty() {
                anyhow::bail!(
                    "Nothing to update: pass --title, --description, --content or --status"
                );
            }
            let post = state.posts.open(&PostId::new(id)).await?;
            let saved = post.update(patch).await?;
            show(&saved, format)
        }
        PostCommand::Publish { id } => {
            let post = state.posts.open(&PostId::new(id)).await?;
            show(&post.publish().await?, format)
        }
        PostCommand::Unpublish { id } => {
            let post = state.posts.open(&PostId::new(id)).await?;
            show(&post.unpublish().await?, format)
        }
        PostCommand::Delete { id, yes } => {
            let id = PostId::new(id);
            confirm(&format!("delete post {id}"), yes)?;
            let actor = state
                .directory
                .current_user()
                .await
                .map_err(DomainError::from)?;
            state.posts.delete(&actor, &id).await?;

            output::print(&json!({ "id": &id, "deleted": true }), format, || {
                Table::record(vec![("deleted", id.to_string())])
            })
        }
        PostCommand::History { id, newest_first } => {
            let timeline = state.posts.history().list(&PostId::new(id)).await?;
            let entries: Vec<_> = if newest_first {
                timeline.newest_first().collect()
            } else {
                timeline.iter().collect()
            };
            output::print(&entries, format, || {
                output::history_table(&timeline, newest_first)
            })
        }
    }
}

fn show(post: &Post, format: OutputFormat) -> anyhow::Result<()> {
    output::print(post, format, || output::post_record(post))
}
