use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Interaction state for a single post, as seen by the current viewer.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, tsify::Tsify, serde::Serialize, serde::Deserialize,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct PostInteractionState {
    pub is_liked: bool,
    pub like_count: u32,
    pub is_bookmarked: bool,
    pub reshare_count: u32,
}

/// Interaction state for a single user, as seen by the current viewer.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, tsify::Tsify, serde::Serialize, serde::Deserialize,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct UserInteractionState {
    pub is_following: bool,
    pub is_blocked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Post,
    User,
}

#[derive(Default)]
struct PostEntry {
    state: PostInteractionState,
    like_seq: u64,
    bookmark_seq: u64,
    reshare_seq: u64,
}

#[derive(Default)]
struct UserEntry {
    state: UserInteractionState,
    follow_seq: u64,
}

/// Snapshot of a post's like state, taken when the toggle was applied. Feed
/// it back to [`InteractionStore::revert_like`] if the confirmation fails.
#[must_use]
pub struct LikeGuard {
    seq: u64,
    was_liked: bool,
    prior_like_count: u32,
}

#[must_use]
pub struct BookmarkGuard {
    seq: u64,
    was_bookmarked: bool,
}

#[must_use]
pub struct ReshareGuard {
    seq: u64,
    prior_count: u32,
}

#[must_use]
pub struct FollowGuard {
    seq: u64,
    was_following: bool,
}

/// In-memory cache of per-entity interaction state, mutated optimistically
/// before server confirmation.
///
/// Every `apply_*` stamps the touched field with a fresh sequence number and
/// returns a guard holding the pre-toggle snapshot. The matching `revert_*`
/// restores that snapshot only if no newer toggle superseded the guard, so a
/// slow failing request can't stomp a later toggle's already-applied state.
/// Sequence numbers are per field (like/bookmark/reshare on posts, follow on
/// users): a concurrent bookmark toggle never suppresses a like revert.
///
/// Entries are created lazily on first reference and live for the whole
/// session.
#[derive(Default)]
pub struct InteractionStore {
    posts: FxHashMap<String, PostEntry>,
    users: FxHashMap<String, UserEntry>,
    listeners: FxHashMap<u32, Rc<dyn Fn(EntityKind, &str)>>,
    next_listener_key: u32,
    pending_notifications: Vec<(EntityKind, String)>,
}

impl InteractionStore {
    /// Insert hydration state for a post. First write wins: hydration data
    /// may arrive after the viewer already toggled something, and must not
    /// clobber live state.
    pub fn init_post(&mut self, post_id: &str, initial: PostInteractionState) {
        if !self.posts.contains_key(post_id) {
            self.posts.insert(
                post_id.to_string(),
                PostEntry {
                    state: initial,
                    ..Default::default()
                },
            );
            self.mark_touched(EntityKind::Post, post_id);
        }
    }

    pub fn init_user(&mut self, user_id: &str, initial: UserInteractionState) {
        if !self.users.contains_key(user_id) {
            self.users.insert(
                user_id.to_string(),
                UserEntry {
                    state: initial,
                    ..Default::default()
                },
            );
            self.mark_touched(EntityKind::User, user_id);
        }
    }

    pub fn post(&self, post_id: &str) -> Option<PostInteractionState> {
        self.posts.get(post_id).map(|entry| entry.state.clone())
    }

    pub fn user(&self, user_id: &str) -> Option<UserInteractionState> {
        self.users.get(user_id).map(|entry| entry.state.clone())
    }

    pub fn apply_like(
        &mut self,
        post_id: &str,
        current_is_liked: bool,
        current_like_count: u32,
    ) -> LikeGuard {
        let entry = self.posts.entry(post_id.to_string()).or_default();
        // The next count comes from the caller's pre-toggle value, never from
        // is_liked, so rapid toggles can't double count.
        entry.state.is_liked = !current_is_liked;
        entry.state.like_count = if current_is_liked {
            current_like_count.saturating_sub(1)
        } else {
            current_like_count + 1
        };
        entry.like_seq += 1;
        let seq = entry.like_seq;
        self.mark_touched(EntityKind::Post, post_id);
        LikeGuard {
            seq,
            was_liked: current_is_liked,
            prior_like_count: current_like_count,
        }
    }

    /// Restore the pre-toggle like state. Returns false if a newer like
    /// toggle superseded the guard (that toggle's own confirmation settles
    /// the state) or the entry is gone.
    pub fn revert_like(&mut self, post_id: &str, guard: LikeGuard) -> bool {
        let Some(entry) = self.posts.get_mut(post_id) else {
            return false;
        };
        if entry.like_seq != guard.seq {
            return false;
        }
        entry.state.is_liked = guard.was_liked;
        entry.state.like_count = guard.prior_like_count;
        self.mark_touched(EntityKind::Post, post_id);
        true
    }

    pub fn apply_bookmark(&mut self, post_id: &str, current_is_bookmarked: bool) -> BookmarkGuard {
        let entry = self.posts.entry(post_id.to_string()).or_default();
        entry.state.is_bookmarked = !current_is_bookmarked;
        entry.bookmark_seq += 1;
        let seq = entry.bookmark_seq;
        self.mark_touched(EntityKind::Post, post_id);
        BookmarkGuard {
            seq,
            was_bookmarked: current_is_bookmarked,
        }
    }

    pub fn revert_bookmark(&mut self, post_id: &str, guard: BookmarkGuard) -> bool {
        let Some(entry) = self.posts.get_mut(post_id) else {
            return false;
        };
        if entry.bookmark_seq != guard.seq {
            return false;
        }
        entry.state.is_bookmarked = guard.was_bookmarked;
        self.mark_touched(EntityKind::Post, post_id);
        true
    }

    /// Reshares only ever count up; there is no un-reshare.
    pub fn apply_reshare(&mut self, post_id: &str, current_count: u32) -> ReshareGuard {
        let entry = self.posts.entry(post_id.to_string()).or_default();
        entry.state.reshare_count = current_count + 1;
        entry.reshare_seq += 1;
        let seq = entry.reshare_seq;
        self.mark_touched(EntityKind::Post, post_id);
        ReshareGuard {
            seq,
            prior_count: current_count,
        }
    }

    pub fn revert_reshare(&mut self, post_id: &str, guard: ReshareGuard) -> bool {
        let Some(entry) = self.posts.get_mut(post_id) else {
            return false;
        };
        if entry.reshare_seq != guard.seq {
            return false;
        }
        entry.state.reshare_count = guard.prior_count;
        self.mark_touched(EntityKind::Post, post_id);
        true
    }

    pub fn apply_follow(&mut self, user_id: &str, current_is_following: bool) -> FollowGuard {
        let entry = self.users.entry(user_id.to_string()).or_default();
        entry.state.is_following = !current_is_following;
        entry.follow_seq += 1;
        let seq = entry.follow_seq;
        self.mark_touched(EntityKind::User, user_id);
        FollowGuard {
            seq,
            was_following: current_is_following,
        }
    }

    pub fn revert_follow(&mut self, user_id: &str, guard: FollowGuard) -> bool {
        let Some(entry) = self.users.get_mut(user_id) else {
            return false;
        };
        if entry.follow_seq != guard.seq {
            return false;
        }
        entry.state.is_following = guard.was_following;
        self.mark_touched(EntityKind::User, user_id);
        true
    }

    /// One-way: blocking hides the user's content immediately and is never
    /// unwound here, even if the server call later fails. There is no revert
    /// counterpart on purpose.
    pub fn apply_block(&mut self, user_id: &str) {
        let entry = self.users.entry(user_id.to_string()).or_default();
        entry.state.is_blocked = true;
        self.mark_touched(EntityKind::User, user_id);
    }

    pub fn register_listener(&mut self, listener: impl Fn(EntityKind, &str) + 'static) -> u32 {
        let key = self.next_listener_key;
        self.next_listener_key += 1;
        self.listeners.insert(key, Rc::new(listener));
        key
    }

    pub fn unregister_listener(&mut self, key: u32) {
        self.listeners.remove(&key);
    }

    fn mark_touched(&mut self, kind: EntityKind, id: &str) {
        let already_pending = self
            .pending_notifications
            .iter()
            .any(|(pending_kind, pending_id)| *pending_kind == kind && pending_id == id);
        if !already_pending {
            self.pending_notifications.push((kind, id.to_string()));
        }
    }

    /// Take the pending listener callbacks so the caller can run them with no
    /// borrow of the store held.
    pub fn drain_due_notifications(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let pending = std::mem::take(&mut self.pending_notifications);
        let mut due: Vec<Box<dyn FnOnce()>> = Vec::new();
        for (kind, id) in pending {
            for listener in self.listeners.values() {
                let listener = Rc::clone(listener);
                let id = id.clone();
                due.push(Box::new(move || listener(kind, &id)));
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn post_state(is_liked: bool, like_count: u32) -> PostInteractionState {
        PostInteractionState {
            is_liked,
            like_count,
            is_bookmarked: false,
            reshare_count: 0,
        }
    }

    #[test]
    fn even_number_of_like_toggles_round_trips() {
        let mut store = InteractionStore::default();
        store.init_post("post-1", post_state(false, 7));

        for _ in 0..2 {
            let state = store.post("post-1").unwrap();
            let _guard = store.apply_like("post-1", state.is_liked, state.like_count);
            let state = store.post("post-1").unwrap();
            let _guard = store.apply_like("post-1", state.is_liked, state.like_count);

            let state = store.post("post-1").unwrap();
            assert!(!state.is_liked);
            assert_eq!(state.like_count, 7);
        }
    }

    #[test]
    fn failed_like_reverts_to_pre_toggle_values() {
        let mut store = InteractionStore::default();
        store.init_post("post-42", post_state(false, 10));

        let guard = store.apply_like("post-42", false, 10);

        // Optimistic state is visible before any confirmation.
        let state = store.post("post-42").unwrap();
        assert!(state.is_liked);
        assert_eq!(state.like_count, 11);

        assert!(store.revert_like("post-42", guard));

        let state = store.post("post-42").unwrap();
        assert!(!state.is_liked);
        assert_eq!(state.like_count, 10);
    }

    #[test]
    fn init_post_is_a_noop_when_entry_exists() {
        let mut store = InteractionStore::default();
        store.init_post("post-1", post_state(true, 5));
        store.init_post("post-1", post_state(false, 0));

        let state = store.post("post-1").unwrap();
        assert!(state.is_liked);
        assert_eq!(state.like_count, 5);
    }

    #[test]
    fn init_user_is_a_noop_when_entry_exists() {
        let mut store = InteractionStore::default();
        store.init_user(
            "user-1",
            UserInteractionState {
                is_following: true,
                is_blocked: false,
            },
        );
        store.init_user("user-1", UserInteractionState::default());

        assert!(store.user("user-1").unwrap().is_following);
    }

    #[test]
    fn apply_on_unseen_post_creates_the_entry_lazily() {
        let mut store = InteractionStore::default();
        assert!(store.post("post-9").is_none());

        let _guard = store.apply_like("post-9", false, 3);

        let state = store.post("post-9").unwrap();
        assert!(state.is_liked);
        assert_eq!(state.like_count, 4);
    }

    #[test]
    fn unlike_at_zero_saturates() {
        let mut store = InteractionStore::default();
        let _guard = store.apply_like("post-1", true, 0);
        assert_eq!(store.post("post-1").unwrap().like_count, 0);
    }

    #[test]
    fn follow_flips_and_reverts() {
        let mut store = InteractionStore::default();
        store.init_user("user-7", UserInteractionState::default());

        let guard = store.apply_follow("user-7", false);
        assert!(store.user("user-7").unwrap().is_following);

        assert!(store.revert_follow("user-7", guard));
        assert!(!store.user("user-7").unwrap().is_following);
    }

    #[test]
    fn block_is_monotonic() {
        let mut store = InteractionStore::default();
        store.apply_block("user-3");
        assert!(store.user("user-3").unwrap().is_blocked);

        // A second block changes nothing, and no revert exists at all.
        store.apply_block("user-3");
        assert!(store.user("user-3").unwrap().is_blocked);
    }

    #[test]
    fn reshare_increments_and_reverts_on_failure() {
        let mut store = InteractionStore::default();
        let guard = store.apply_reshare("post-1", 3);
        assert_eq!(store.post("post-1").unwrap().reshare_count, 4);

        assert!(store.revert_reshare("post-1", guard));
        assert_eq!(store.post("post-1").unwrap().reshare_count, 3);
    }

    #[test]
    fn reshare_without_confirmation_keeps_optimistic_count() {
        // The no-credential path never issues a request, so no revert ever
        // arrives and the optimistic count stands.
        let mut store = InteractionStore::default();
        let _guard = store.apply_reshare("post-1", 3);
        assert_eq!(store.post("post-1").unwrap().reshare_count, 4);
    }

    #[test]
    fn superseded_like_revert_is_dropped() {
        let mut store = InteractionStore::default();
        store.init_post("post-1", post_state(false, 10));

        let first = store.apply_like("post-1", false, 10);
        let second = store.apply_like("post-1", true, 11);
        assert_eq!(store.post("post-1").unwrap(), post_state(false, 10));

        // The first toggle's failure arrives late; the second toggle already
        // superseded it, so nothing moves.
        assert!(!store.revert_like("post-1", first));
        assert_eq!(store.post("post-1").unwrap(), post_state(false, 10));

        // The second toggle's own revert still works.
        assert!(store.revert_like("post-1", second));
        assert_eq!(store.post("post-1").unwrap(), post_state(true, 11));
    }

    #[test]
    fn bookmark_toggle_does_not_suppress_like_revert() {
        let mut store = InteractionStore::default();
        store.init_post("post-1", post_state(false, 10));

        let like = store.apply_like("post-1", false, 10);
        let _bookmark = store.apply_bookmark("post-1", false);

        assert!(store.revert_like("post-1", like));
        let state = store.post("post-1").unwrap();
        assert!(!state.is_liked);
        assert_eq!(state.like_count, 10);
        // The bookmark flip is untouched by the like revert.
        assert!(state.is_bookmarked);
    }

    #[test]
    fn listeners_observe_already_applied_state() {
        let store = Rc::new(RefCell::new(InteractionStore::default()));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_in_listener = Rc::clone(&seen);
        let store_in_listener = Rc::clone(&store);
        store.borrow_mut().register_listener(move |kind, id| {
            assert_eq!(kind, EntityKind::Post);
            let state = store_in_listener.borrow().post(id).unwrap();
            seen_in_listener.borrow_mut().push(state);
        });

        let _guard = store.borrow_mut().apply_like("post-1", false, 10);
        let due = store.borrow_mut().drain_due_notifications();
        for notification in due {
            notification();
        }

        assert_eq!(*seen.borrow(), vec![post_state(true, 11)]);
    }

    #[test]
    fn unregistered_listeners_stop_firing() {
        let mut store = InteractionStore::default();
        let calls = Rc::new(Cell::new(0));

        let calls_in_listener = Rc::clone(&calls);
        let key = store.register_listener(move |_, _| {
            calls_in_listener.set(calls_in_listener.get() + 1);
        });

        let _guard = store.apply_like("post-1", false, 0);
        for notification in store.drain_due_notifications() {
            notification();
        }
        assert_eq!(calls.get(), 1);

        store.unregister_listener(key);
        let _guard = store.apply_like("post-1", true, 1);
        for notification in store.drain_due_notifications() {
            notification();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn notifications_dedup_per_entity_per_flush() {
        let mut store = InteractionStore::default();
        let calls = Rc::new(Cell::new(0));

        let calls_in_listener = Rc::clone(&calls);
        store.register_listener(move |_, _| {
            calls_in_listener.set(calls_in_listener.get() + 1);
        });

        let _guard = store.apply_like("post-1", false, 0);
        let _guard = store.apply_bookmark("post-1", false);
        let _guard = store.apply_follow("user-1", false);

        for notification in store.drain_due_notifications() {
            notification();
        }
        // One callback for post-1 despite two mutations, one for user-1.
        assert_eq!(calls.get(), 2);

        // Drained means drained.
        assert!(store.drain_due_notifications().is_empty());
    }
}
