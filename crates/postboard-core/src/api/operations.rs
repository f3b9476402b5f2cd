//! Request builders for every backend endpoint.
//!
//! Each function maps identifiers and payload to a `RequestDescriptor`
//! without side effects. Sending, and applying the outcome, is left to the
//! caller.

use serde_json::json;

use crate::config::Endpoints;
use crate::models::{CommentId, Cursor, ImageFile, PostDraft, PostId, SignupForm};

use super::request::{FilePart, RequestDescriptor};

/// Multipart field name expected by the upload endpoint
const UPLOAD_FIELD: &str = "file";

pub fn login(endpoints: &Endpoints, email: &str, password: &str) -> RequestDescriptor {
    // The backend reads the email from "username"
    RequestDescriptor::post(&endpoints.login)
        .public()
        .json(json!({
            "username": email.trim(),
            "password": password,
        }))
}

pub fn signup(endpoints: &Endpoints, form: &SignupForm, profile_image_id: i64) -> RequestDescriptor {
    RequestDescriptor::post(&endpoints.signup)
        .public()
        .json(json!({
            "email": form.email,
            "password": form.password,
            "nickname": form.nickname,
            "profileImageId": profile_image_id,
        }))
}

pub fn logout(endpoints: &Endpoints) -> RequestDescriptor {
    RequestDescriptor::post(&endpoints.logout)
}

pub fn me(endpoints: &Endpoints) -> RequestDescriptor {
    RequestDescriptor::get(&endpoints.member_me)
}

pub fn upload_image(endpoints: &Endpoints, image: &ImageFile) -> RequestDescriptor {
    RequestDescriptor::post(&endpoints.images)
        .public()
        .multipart(vec![FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            bytes: image.bytes.clone(),
        }])
}

fn page_query(mut descriptor: RequestDescriptor, cursor: Option<&Cursor>, size: u32) -> RequestDescriptor {
    descriptor = descriptor.query("size", size.to_string());
    if let Some(cursor) = cursor {
        descriptor = descriptor.query("cursor", cursor.as_str());
    }
    descriptor
}

pub fn list_posts(endpoints: &Endpoints, cursor: Option<&Cursor>, size: u32) -> RequestDescriptor {
    page_query(RequestDescriptor::get(&endpoints.posts), cursor, size)
}

pub fn get_post(endpoints: &Endpoints, post_id: PostId) -> RequestDescriptor {
    RequestDescriptor::get(endpoints.post(post_id))
}

pub fn create_post(endpoints: &Endpoints, draft: &PostDraft, image_id: Option<i64>) -> RequestDescriptor {
    RequestDescriptor::post(&endpoints.posts).json(json!({
        "title": draft.title,
        "content": draft.content,
        "imageId": image_id,
    }))
}

pub fn update_post(
    endpoints: &Endpoints,
    post_id: PostId,
    draft: &PostDraft,
    image_ids: &[i64],
) -> RequestDescriptor {
    RequestDescriptor::patch(endpoints.post(post_id)).json(json!({
        "title": draft.title,
        "content": draft.content,
        "imageIds": image_ids,
    }))
}

pub fn delete_post(endpoints: &Endpoints, post_id: PostId) -> RequestDescriptor {
    RequestDescriptor::delete(endpoints.post(post_id))
}

pub fn like_post(endpoints: &Endpoints, post_id: PostId) -> RequestDescriptor {
    RequestDescriptor::post(endpoints.likes(post_id))
}

pub fn unlike_post(endpoints: &Endpoints, post_id: PostId) -> RequestDescriptor {
    RequestDescriptor::delete(endpoints.likes(post_id))
}

pub fn list_comments(
    endpoints: &Endpoints,
    post_id: PostId,
    cursor: Option<&Cursor>,
    size: u32,
) -> RequestDescriptor {
    page_query(RequestDescriptor::get(endpoints.comments(post_id)), cursor, size)
}

pub fn create_comment(endpoints: &Endpoints, post_id: PostId, content: &str) -> RequestDescriptor {
    RequestDescriptor::post(endpoints.comments(post_id)).json(json!({
        "content": content.trim(),
    }))
}

pub fn update_comment(
    endpoints: &Endpoints,
    post_id: PostId,
    comment_id: CommentId,
    content: &str,
) -> RequestDescriptor {
    RequestDescriptor::patch(endpoints.comment(post_id, comment_id)).json(json!({
        "content": content.trim(),
    }))
}

pub fn delete_comment(endpoints: &Endpoints, post_id: PostId, comment_id: CommentId) -> RequestDescriptor {
    RequestDescriptor::delete(endpoints.comment(post_id, comment_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::RequestBody;
    use reqwest::Method;

    #[test]
    fn test_login_is_public_and_uses_username_field() {
        let d = login(&Endpoints::default(), " a@b.co ", "pw");
        assert_eq!(d.method, Method::POST);
        assert_eq!(d.path, "/login");
        assert!(!d.authenticated);
        assert_eq!(
            d.body,
            RequestBody::Json(json!({"username": "a@b.co", "password": "pw"}))
        );
    }

    #[test]
    fn test_first_page_omits_cursor() {
        let d = list_posts(&Endpoints::default(), None, 20);
        assert_eq!(d.query, vec![("size".to_string(), "20".to_string())]);

        let cursor = Cursor::new("c1");
        let d = list_posts(&Endpoints::default(), Some(&cursor), 20);
        assert_eq!(
            d.query,
            vec![
                ("size".to_string(), "20".to_string()),
                ("cursor".to_string(), "c1".to_string())
            ]
        );
    }

    #[test]
    fn test_like_pair_targets_same_resource() {
        let endpoints = Endpoints::default();
        let like = like_post(&endpoints, 4);
        let unlike = unlike_post(&endpoints, 4);
        assert_eq!(like.path, unlike.path);
        assert_eq!(like.method, Method::POST);
        assert_eq!(unlike.method, Method::DELETE);
        assert!(like.authenticated && unlike.authenticated);
    }

    #[test]
    fn test_update_post_sends_image_ids() {
        let d = update_post(&Endpoints::default(), 3, &PostDraft::new("t", "c"), &[7, 8]);
        assert_eq!(d.method, Method::PATCH);
        assert_eq!(d.path, "/api/v1/posts/3");
        assert_eq!(
            d.body,
            RequestBody::Json(json!({"title": "t", "content": "c", "imageIds": [7, 8]}))
        );
    }

    #[test]
    fn test_create_post_without_image_sends_null() {
        let d = create_post(&Endpoints::default(), &PostDraft::new("t", "c"), None);
        assert_eq!(
            d.body,
            RequestBody::Json(json!({"title": "t", "content": "c", "imageId": null}))
        );
    }

    #[test]
    fn test_comment_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(update_comment(&endpoints, 1, 2, "x").path, "/api/v1/posts/1/comments/2");
        assert_eq!(delete_comment(&endpoints, 1, 2).method, Method::DELETE);
        assert_eq!(list_comments(&endpoints, 1, None, 10).path, "/api/v1/posts/1/comments");
    }

    #[test]
    fn test_upload_is_multipart_file_field() {
        let image = ImageFile::new("a.png", "image/png", vec![1, 2]);
        let d = upload_image(&Endpoints::default(), &image);
        match d.body {
            RequestBody::Multipart(parts) => {
                assert_eq!(parts.len(), 1);
                assert_eq!(parts[0].field, "file");
                assert_eq!(parts[0].mime, "image/png");
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }
}
