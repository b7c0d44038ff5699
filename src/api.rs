//! HTTP glue for the stocktalk REST backend.

pub(crate) async fn hit_api_server(
    path: &str,
    request: impl serde::Serialize,
    access_token: Option<&String>,
) -> Result<fetch_happen::Response, fetch_happen::Error> {
    let client = fetch_happen::Client;
    let url = if cfg!(feature = "local-backend") {
        "http://localhost:3000"
    } else {
        "https://api.stocktalk.app"
    };
    // Always include an Authorization header - use "anonymous" as dummy token when not logged in
    let token = access_token.map(|t| t.as_str()).unwrap_or("anonymous");
    let response = client
        .post(format!("{url}{path}"))
        .json(&request)?
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await?;
    Ok(response)
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("transport error: {0:?}")]
    Transport(#[source] fetch_happen::Error),

    #[error("server returned {0}")]
    Status(String),
}

/// All interaction confirmations are bare POSTs; the entity id lives in the
/// path and the bearer token identifies the viewer.
async fn post_interaction(path: String, access_token: &String) -> Result<(), ApiError> {
    let response = hit_api_server(&path, serde_json::json!({}), Some(access_token))
        .await
        .map_err(ApiError::Transport)?;

    if !response.ok() {
        return Err(ApiError::Status(response.status().to_string()));
    }

    Ok(())
}

/// Server-side toggle: the same endpoint likes or unlikes depending on the
/// viewer's current edge.
pub(crate) async fn like_post(post_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/posts/{post_id}/like"), access_token).await
}

pub(crate) async fn bookmark_post(post_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/posts/{post_id}/bookmark"), access_token).await
}

pub(crate) async fn reshare_post(post_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/posts/{post_id}/reshare"), access_token).await
}

pub(crate) async fn follow_user(user_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/users/{user_id}/follow"), access_token).await
}

pub(crate) async fn unfollow_user(user_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/users/{user_id}/unfollow"), access_token).await
}

pub(crate) async fn block_user(user_id: &str, access_token: &String) -> Result<(), ApiError> {
    post_interaction(format!("/users/{user_id}/block"), access_token).await
}
