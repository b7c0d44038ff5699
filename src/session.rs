//! Credential access. The auth flow (host app) writes the bearer token to
//! local storage; this layer only ever reads it.

/// Local-storage key the auth flow writes the viewer's bearer token under.
pub(crate) const ACCESS_TOKEN_KEY: &str = "stocktalk.access_token";

/// Read the viewer's bearer token at call time. Deliberately not cached: a
/// login or logout mid-session takes effect on the very next request.
#[cfg(target_arch = "wasm32")]
pub(crate) fn access_token() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage
        .get_item(ACCESS_TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|token| !token.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn access_token() -> Option<String> {
    let _ = ACCESS_TOKEN_KEY;
    None
}
