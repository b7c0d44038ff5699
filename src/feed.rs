use crate::api::hit_api_server;
use crate::interactions::{PostInteractionState, UserInteractionState};
use wasm_bindgen::prelude::*;

/// A feed post as hydrated from the server. `interactions` carries the
/// viewer's own state, which views pass into `Interactions::init_post`.
#[derive(Clone, Debug, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub author_handle: String,
    pub body: String,
    /// Ticker symbols tagged in the post, e.g. `["AAPL", "TSLA"]`.
    pub symbols: Vec<String>,
    pub created_at: String,
    pub reply_count: u32,
    pub interactions: PostInteractionState,
}

#[derive(Clone, Debug, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub next_cursor: Option<String>,
}

/// A user profile as hydrated from the server. `interactions` feeds
/// `Interactions::init_user`.
#[derive(Clone, Debug, tsify::Tsify, serde::Serialize, serde::Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub follower_count: u32,
    pub following_count: u32,
    pub interactions: UserInteractionState,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedRequest {
    cursor: Option<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ByIdRequest<'a> {
    id: &'a str,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub async fn get_feed(
    cursor: Option<String>,
    access_token: Option<String>,
) -> Result<JsValue, JsValue> {
    let request = FeedRequest { cursor };

    let response = hit_api_server("/feed", &request, access_token.as_ref())
        .await
        .map_err(|e| JsValue::from_str(&format!("Request error: {e:?}")))?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let page: FeedPage = response
        .json()
        .await
        .map_err(|e| JsValue::from_str(&format!("Response parsing error: {e:?}")))?;

    serde_wasm_bindgen::to_value(&page)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub async fn get_post_detail(
    post_id: String,
    access_token: Option<String>,
) -> Result<JsValue, JsValue> {
    let request = ByIdRequest { id: &post_id };

    let response = hit_api_server("/post", &request, access_token.as_ref())
        .await
        .map_err(|e| JsValue::from_str(&format!("Request error: {e:?}")))?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let post: Post = response
        .json()
        .await
        .map_err(|e| JsValue::from_str(&format!("Response parsing error: {e:?}")))?;

    serde_wasm_bindgen::to_value(&post)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub async fn get_profile(
    user_id: String,
    access_token: Option<String>,
) -> Result<JsValue, JsValue> {
    let request = ByIdRequest { id: &user_id };

    let response = hit_api_server("/profile", &request, access_token.as_ref())
        .await
        .map_err(|e| JsValue::from_str(&format!("Request error: {e:?}")))?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let profile: Profile = response
        .json()
        .await
        .map_err(|e| JsValue::from_str(&format!("Response parsing error: {e:?}")))?;

    serde_wasm_bindgen::to_value(&profile)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}
