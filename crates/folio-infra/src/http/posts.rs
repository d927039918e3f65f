//! `PostGateway` over `/posts`.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};

use folio_core::domain::{
    ImageId, NewPost, Page, PendingAttachment, Post, PostHistory, PostId, PostImage, PostPatch,
    PostQuery, total_pages,
};
use folio_core::error::GatewayError;
use folio_core::ports::PostGateway;
use folio_shared::dto::{
    CreatePostRequest, ListPostsParams, PostListPayload, RenameImageRequest, UpdatePostRequest,
    UploadedImagesPayload,
};

use super::client::{HttpBackend, transport_error};

fn list_params(query: &PostQuery) -> ListPostsParams {
    ListPostsParams {
        page: query.page,
        limit: query.page_size,
        status: query.status.as_param().map(str::to_string),
        search: query.search.clone(),
    }
}

fn update_body(patch: &PostPatch) -> UpdatePostRequest {
    UpdatePostRequest {
        title: patch.title.clone(),
        description: patch.description.clone(),
        content: patch.content.clone(),
        status: patch.status.map(|s| s.as_str().to_string()),
    }
}

/// One `images` file part per attachment, then its `imageNames` entry, in batch order.
fn upload_form(batch: &[PendingAttachment]) -> Result<Form, GatewayError> {
    let mut form = Form::new();
    for pending in batch {
        let part = Part::bytes(pending.bytes.clone())
            .file_name(pending.file_name.clone())
            .mime_str(pending.media_type.mime())
            .map_err(transport_error)?;
        form = form.part("images", part);
    }
    for pending in batch {
        form = form.text("imageNames", pending.name.clone());
    }
    Ok(form)
}

#[async_trait]
impl PostGateway for HttpBackend {
    async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>, GatewayError> {
        let request = self.request(Method::GET, "posts").query(&list_params(query));
        let payload: PostListPayload<Post> = self.send(request).await?;

        Ok(Page {
            items: payload.posts,
            total: payload.total,
            page: payload.page,
            page_size: payload.limit,
            // Recomputed so an empty collection reports zero pages.
            total_pages: total_pages(payload.total, payload.limit),
        })
    }

    async fn get_post(&self, id: &PostId) -> Result<Post, GatewayError> {
        self.send(self.request(Method::GET, &format!("posts/{id}")))
            .await
    }

    async fn create_post(&self, draft: &NewPost) -> Result<Post, GatewayError> {
        let body = CreatePostRequest {
            title: draft.title.clone(),
            description: draft.description.clone(),
            content: draft.content.clone(),
        };
        self.send(self.request(Method::POST, "posts").json(&body))
            .await
    }

    async fn update_post(&self, id: &PostId, patch: &PostPatch) -> Result<Post, GatewayError> {
        let request = self
            .request(Method::PUT, &format!("posts/{id}"))
            .json(&update_body(patch));
        self.send(request).await
    }

    async fn delete_post(&self, id: &PostId) -> Result<(), GatewayError> {
        self.send_empty(self.request(Method::DELETE, &format!("posts/{id}")))
            .await
    }

    async fn upload_images(
        &self,
        post_id: &PostId,
        batch: &[PendingAttachment],
    ) -> Result<Vec<PostImage>, GatewayError> {
        let request = self
            .request(Method::POST, &format!("posts/{post_id}/images"))
            .multipart(upload_form(batch)?);
        let payload: UploadedImagesPayload<PostImage> = self.send(request).await?;
        Ok(payload.into_new_images(batch.len()))
    }

    async fn rename_image(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
        name: &str,
    ) -> Result<(), GatewayError> {
        let request = self
            .request(Method::PUT, &format!("posts/{post_id}/images/{image_id}"))
            .json(&RenameImageRequest {
                name: name.to_string(),
            });
        self.send_empty(request).await
    }

    async fn delete_image(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
    ) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, &format!("posts/{post_id}/images/{image_id}"));
        self.send_empty(request).await
    }

    async fn post_history(&self, post_id: &PostId) -> Result<Vec<PostHistory>, GatewayError> {
        self.send(self.request(Method::GET, &format!("posts/{post_id}/history")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{PostStatus, StatusFilter};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_params_omit_unfiltered_status() {
        let query = PostQuery {
            page: 2,
            search: Some("rust".to_string()),
            ..Default::default()
        };
        let params = serde_json::to_value(list_params(&query)).unwrap();
        assert_eq!(
            params,
            serde_json::json!({"page": 2, "limit": 10, "search": "rust"})
        );

        let query = PostQuery {
            status: StatusFilter::Only(PostStatus::Published),
            ..Default::default()
        };
        assert_eq!(list_params(&query).status.as_deref(), Some("published"));
    }

    #[test]
    fn test_update_body_sends_only_patched_fields() {
        let patch = PostPatch::default().title("New").status(PostStatus::Draft);
        assert_eq!(
            serde_json::to_value(update_body(&patch)).unwrap(),
            serde_json::json!({"title": "New", "status": "draft"})
        );
    }

    #[test]
    fn test_post_decodes_from_backend_json() {
        let body = r#"{
            "success": true,
            "data": {
                "_id": "p-1",
                "title": "Hello",
                "description": "",
                "content": "<p>Hi</p>",
                "images": [{"_id": "i-1", "name": "cover", "url": "https://cdn/x.png",
                            "publicId": "folio/x", "width": 10, "height": 20}],
                "author": {"_id": "u-1", "username": "ann", "email": "ann@x.io",
                           "role": "admin", "createdAt": "2024-01-01T00:00:00Z",
                           "updatedAt": "2024-01-01T00:00:00Z"},
                "status": "published",
                "createdAt": "2024-01-02T00:00:00Z",
                "updatedAt": "2024-01-03T00:00:00Z"
            }
        }"#;
        let envelope: folio_shared::ApiResponse<Post> = serde_json::from_str(body).unwrap();
        let post = envelope.data.unwrap();
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.images[0].public_id, "folio/x");
        assert_eq!(post.author.display_name(), "ann");
    }
}
