#![deny(clippy::string_slice)]

mod api;
pub mod feed;
mod interactions;
pub mod screener;
mod session;
mod utils;

pub use interactions::{EntityKind, PostInteractionState, UserInteractionState};

use std::cell::RefCell;
use std::sync::LazyLock;

use wasm_bindgen::prelude::*;

use crate::interactions::InteractionStore;

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
static LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

/// Handle to the per-session interaction state shared by every view.
///
/// The host app constructs exactly one of these and hands it to whichever
/// views render posts or profiles; tests construct isolated instances. All
/// subscribers of an entity id observe the same entry - views hold no
/// private copies.
///
/// Toggles are fire-and-forget: they apply to local state synchronously,
/// then confirm against the server, and they never throw. A failed
/// confirmation surfaces only as the visible state reverting.
#[wasm_bindgen]
pub struct Interactions {
    // btw, we should never hold a borrow across an .await. by avoiding this, we guarantee the absence of "borrow while locked" panics
    store: RefCell<InteractionStore>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Interactions {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new() -> Self {
        // used to only initialize the logger once
        *LOGGER;

        Self {
            store: RefCell::new(InteractionStore::default()),
        }
    }

    /// Seed a post's state from a server-rendered payload. No-op if the
    /// entry already exists, so stale hydration never overwrites live state.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn init_post(&self, post_id: String, initial: PostInteractionState) {
        let _flusher = FlushLater::new(self); // The addition of a new entry can trigger listeners, so we want to make sure to flush them after.
        self.store.borrow_mut().init_post(&post_id, initial);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn init_user(&self, user_id: String, initial: UserInteractionState) {
        let _flusher = FlushLater::new(self);
        self.store.borrow_mut().init_user(&user_id, initial);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_post(&self, post_id: String) -> Option<PostInteractionState> {
        self.store.borrow().post(&post_id)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_user(&self, user_id: String) -> Option<UserInteractionState> {
        self.store.borrow().user(&user_id)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn subscribe_to_post(&self, post_id: String, callback: js_sys::Function) -> u32 {
        self.store.borrow_mut().register_listener(move |kind, id| {
            if kind == EntityKind::Post && id == post_id {
                let this = JsValue::null();
                let _ = callback.call0(&this);
            }
        })
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn subscribe_to_user(&self, user_id: String, callback: js_sys::Function) -> u32 {
        self.store.borrow_mut().register_listener(move |kind, id| {
            if kind == EntityKind::User && id == user_id {
                let this = JsValue::null();
                let _ = callback.call0(&this);
            }
        })
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn unsubscribe(&self, key: u32) {
        self.store.borrow_mut().unregister_listener(key)
    }

    /// Flip the like state of a post. Applies locally before the network
    /// call starts; a failed confirmation reverts to the pre-toggle values
    /// the caller passed in.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle_like(
        &self,
        post_id: String,
        current_is_liked: bool,
        current_like_count: u32,
    ) {
        let access_token = session::access_token();

        let guard = self
            .store
            .borrow_mut()
            .apply_like(&post_id, current_is_liked, current_like_count);
        // Subscribers see the optimistic flip before the network call starts.
        self.flush_notifications();

        // An unauthenticated toggle keeps its optimistic state; gating the
        // control behind login is the caller's job, not this layer's.
        let Some(access_token) = access_token else {
            return;
        };

        if let Err(e) = api::like_post(&post_id, &access_token).await {
            log::warn!("Like request for {post_id} failed: {e}");
            if self.store.borrow_mut().revert_like(&post_id, guard) {
                self.flush_notifications();
            } else {
                log::debug!("Like revert for {post_id} superseded by a newer toggle");
            }
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle_bookmark(&self, post_id: String, current_is_bookmarked: bool) {
        let access_token = session::access_token();

        let guard = self
            .store
            .borrow_mut()
            .apply_bookmark(&post_id, current_is_bookmarked);
        self.flush_notifications();

        let Some(access_token) = access_token else {
            return;
        };

        if let Err(e) = api::bookmark_post(&post_id, &access_token).await {
            log::warn!("Bookmark request for {post_id} failed: {e}");
            if self.store.borrow_mut().revert_bookmark(&post_id, guard) {
                self.flush_notifications();
            } else {
                log::debug!("Bookmark revert for {post_id} superseded by a newer toggle");
            }
        }
    }

    /// Reshares only count up - there is no un-reshare. A failed
    /// confirmation restores the pre-toggle count.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle_reshare(&self, post_id: String, current_reshare_count: u32) {
        let access_token = session::access_token();

        let guard = self
            .store
            .borrow_mut()
            .apply_reshare(&post_id, current_reshare_count);
        self.flush_notifications();

        let Some(access_token) = access_token else {
            return;
        };

        if let Err(e) = api::reshare_post(&post_id, &access_token).await {
            log::warn!("Reshare request for {post_id} failed: {e}");
            if self.store.borrow_mut().revert_reshare(&post_id, guard) {
                self.flush_notifications();
            } else {
                log::debug!("Reshare revert for {post_id} superseded by a newer toggle");
            }
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle_follow(&self, user_id: String, current_is_following: bool) {
        let access_token = session::access_token();
        let next_is_following = !current_is_following;

        let guard = self
            .store
            .borrow_mut()
            .apply_follow(&user_id, current_is_following);
        self.flush_notifications();

        let Some(access_token) = access_token else {
            return;
        };

        // The endpoint is chosen from the state we just moved to.
        let result = if next_is_following {
            api::follow_user(&user_id, &access_token).await
        } else {
            api::unfollow_user(&user_id, &access_token).await
        };

        if let Err(e) = result {
            log::warn!("Follow request for {user_id} failed: {e}");
            if self.store.borrow_mut().revert_follow(&user_id, guard) {
                self.flush_notifications();
            } else {
                log::debug!("Follow revert for {user_id} superseded by a newer toggle");
            }
        }
    }

    /// Block a user. One-way: the optimistic block stands even if the server
    /// call fails, because views hide the blocked user's content as soon as
    /// the block is initiated.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub async fn toggle_block(&self, user_id: String) {
        let access_token = session::access_token();

        self.store.borrow_mut().apply_block(&user_id);
        self.flush_notifications();

        let Some(access_token) = access_token else {
            return;
        };

        if let Err(e) = api::block_user(&user_id, &access_token).await {
            log::warn!("Block request for {user_id} failed (block kept): {e}");
        }
    }

    /// Flush pending store notifications safely, avoiding RefCell re-borrows during callbacks.
    fn flush_notifications(&self) {
        // do it like this to avoid holding the borrow while we call the callbacks
        let notifications = self.store.borrow_mut().drain_due_notifications();
        // that's important because many of these callbacks will call back into rust functions that themselves do borrow_mut()
        for notification in notifications {
            notification();
        }
    }
}

impl Default for Interactions {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple struct that flushes store listeners when dropped. This is useful if you want to ensure you don't forget to flush listeners, regardless of the code path a function takes.
struct FlushLater<'a> {
    interactions: &'a Interactions,
}

impl<'a> FlushLater<'a> {
    fn new(interactions: &'a Interactions) -> Self {
        Self { interactions }
    }
}

impl<'a> Drop for FlushLater<'a> {
    fn drop(&mut self) {
        self.interactions.flush_notifications();
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
