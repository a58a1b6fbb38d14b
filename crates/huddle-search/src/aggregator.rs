//! Concurrent fan-out over the five search categories.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use huddle_channels::{filter_valid_channels, remove_duplicate_channels};
use huddle_presence::PresenceCache;
use huddle_shared::{ChannelRecord, Message, UserId};
use huddle_store::DocumentStore;
use tracing::{debug, warn};

use crate::error::SearchError;
use crate::results::{CategorizedSearchResults, ChannelHit, MessageHit, UserHit};
use crate::scope::{contains, parse_term, SearchScope};
use crate::users::UserDirectory;

pub struct SearchAggregator {
    store: Arc<dyn DocumentStore>,
    directory: Arc<UserDirectory>,
    presence: Arc<PresenceCache>,
    current_user: UserId,
    /// Bumped by every [`SearchAggregator::search_latest`] call.
    generation: AtomicU64,
}

impl SearchAggregator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        directory: Arc<UserDirectory>,
        presence: Arc<PresenceCache>,
        current_user: UserId,
    ) -> Self {
        Self {
            store,
            directory,
            presence,
            current_user,
            generation: AtomicU64::new(0),
        }
    }

    pub fn current_user(&self) -> &UserId {
        &self.current_user
    }

    /// Run `term` against the categories its sigil selects.
    pub async fn search(&self, term: &str) -> CategorizedSearchResults {
        let Some((scope, needle)) = parse_term(term) else {
            return CategorizedSearchResults::default();
        };
        let needle = needle.to_lowercase();
        debug!(?scope, needle = %needle, "Search");

        match scope {
            SearchScope::Channels => CategorizedSearchResults {
                channels: isolated("channels", self.search_channels(&needle)).await,
                ..Default::default()
            },
            SearchScope::Users => CategorizedSearchResults {
                users: isolated("users", self.search_users(&needle)).await,
                ..Default::default()
            },
            SearchScope::All => {
                let (messages, direct_messages, channels, threads, users) = futures::join!(
                    isolated("messages", self.search_messages(&needle)),
                    isolated("direct_messages", self.search_direct_messages(&needle)),
                    isolated("channels", self.search_channels(&needle)),
                    isolated("threads", self.search_threads(&needle)),
                    isolated("users", self.search_users(&needle)),
                );

                CategorizedSearchResults {
                    users,
                    channels,
                    messages,
                    direct_messages,
                    threads,
                }
            }
        }
    }

    /// Like [`Self::search`], but returns `None` when another call to this
    /// method started before this one finished.
    pub async fn search_latest(&self, term: &str) -> Option<CategorizedSearchResults> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let results = self.search(term).await;

        if self.generation.load(Ordering::SeqCst) == generation {
            Some(results)
        } else {
            debug!(term, "Search superseded");
            None
        }
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Non-guest users whose name or email contains `needle`.
    pub async fn search_users(&self, needle: &str) -> Result<Vec<UserHit>, SearchError> {
        let mut hits = Vec::new();
        for user in self.store.list_users().await? {
            if user.is_guest() {
                continue;
            }
            if contains(&user.user_name, needle) || contains(&user.email, needle) {
                let status = self.presence.status_of(&user.uid).await;
                hits.push(UserHit::new(&user, status));
            }
        }
        Ok(hits)
    }

    /// Group channels whose name or description contains `needle`.
    pub async fn search_channels(&self, needle: &str) -> Result<Vec<ChannelHit>, SearchError> {
        Ok(self
            .store
            .list_channels()
            .await?
            .iter()
            .filter(|c| !c.is_direct_message())
            .filter(|c| contains(&c.channel_name, needle) || contains(&c.channel_description, needle))
            .map(ChannelHit::from)
            .collect())
    }

    /// Messages in the user's group channels.
    pub async fn search_messages(&self, needle: &str) -> Result<Vec<MessageHit>, SearchError> {
        let mut hits = Vec::new();
        for channel in self.member_channels().await? {
            if channel.is_direct_message() {
                continue;
            }
            for message in self.store.list_messages(&channel.channel_id).await? {
                if contains(&message.message_content, needle) {
                    hits.push(self.message_hit(&channel, message).await);
                }
            }
        }
        Ok(hits)
    }

    /// Messages in the user's direct messages.  A DM without another
    /// participant (the self-channel) contributes nothing.
    pub async fn search_direct_messages(&self, needle: &str) -> Result<Vec<MessageHit>, SearchError> {
        let mut hits = Vec::new();
        for channel in self.member_channels().await? {
            if !channel.is_direct_message() {
                continue;
            }
            let Some(other) = channel.other_member(&self.current_user).cloned() else {
                continue;
            };
            let other_name = self.directory.name_of(&other).await;

            for message in self.store.list_messages(&channel.channel_id).await? {
                if contains(&message.message_content, needle) {
                    let mut hit = self.message_hit(&channel, message).await;
                    hit.direct_message_user_id = Some(other.clone());
                    hit.direct_message_user_name = other_name.clone();
                    hits.push(hit);
                }
            }
        }
        Ok(hits)
    }

    /// Thread replies under threaded messages in the user's channels.
    pub async fn search_threads(&self, needle: &str) -> Result<Vec<MessageHit>, SearchError> {
        let mut hits = Vec::new();
        for channel in self.member_channels().await? {
            for parent in self.store.list_messages(&channel.channel_id).await? {
                if !parent.has_thread {
                    continue;
                }

                let replies = self
                    .store
                    .list_thread_replies(&channel.channel_id, &parent.message_id)
                    .await?;
                for reply in replies {
                    if !contains(&reply.message_content, needle) {
                        continue;
                    }
                    let replier_name = self.directory.name_of(&reply.message_author_id).await;
                    let reply = Message {
                        message_id: reply.message_id,
                        message_author_id: reply.message_author_id,
                        message_content: reply.message_content,
                        time: reply.time,
                        has_thread: false,
                    };

                    let mut hit = self.message_hit(&channel, reply).await;
                    hit.replied_message_id = Some(parent.message_id.clone());
                    hit.replier_name = replier_name;
                    hits.push(hit);
                }
            }
        }
        Ok(hits)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// The user's channels, with malformed and duplicate direct messages
    /// dropped.
    async fn member_channels(&self) -> Result<Vec<ChannelRecord>, SearchError> {
        let raw = self.store.channels_for_member(&self.current_user).await?;
        let valid = filter_valid_channels(&raw, &self.current_user);
        Ok(remove_duplicate_channels(&valid))
    }

    async fn message_hit(&self, channel: &ChannelRecord, message: Message) -> MessageHit {
        let status = self.presence.status_of(&message.message_author_id).await;
        MessageHit {
            message_id: message.message_id,
            message_author_id: message.message_author_id,
            message_content: message.message_content,
            time: message.time,
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            status,
            direct_message_user_id: None,
            direct_message_user_name: None,
            replied_message_id: None,
            replier_name: None,
        }
    }
}

/// Await one category; on error log it and report no hits.
async fn isolated<T, F>(category: &'static str, search: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, SearchError>>,
{
    match search.await {
        Ok(hits) => hits,
        Err(e) => {
            warn!(category, error = %e, "Sub-search failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use huddle_presence::PresenceTable;
    use huddle_shared::{ChannelId, MessageId, PresenceRecord, PresenceStatus, Role, ThreadReply, UserIdentity};
    use huddle_store::{Collection, MemoryDocumentStore};
    use tokio::sync::Notify;

    use super::*;

    struct Fixture {
        store: Arc<MemoryDocumentStore>,
        directory: Arc<UserDirectory>,
        search: SearchAggregator,
        general: ChannelId,
        dm: ChannelId,
    }

    fn message(id: &str, author: &str, text: &str, offset_secs: i64) -> Message {
        Message {
            message_id: MessageId::from(id),
            message_author_id: UserId::from(author),
            message_content: text.into(),
            time: Utc::now() + Duration::seconds(offset_secs),
            has_thread: false,
        }
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());

        store.upsert_user(UserIdentity::new("u1", "alice", "alice@example.com")).await;
        store.upsert_user(UserIdentity::new("u2", "bob", "bob@example.com")).await;
        let mut guest = UserIdentity::new("g1", "Alistair", "");
        guest.role = Some(Role::Guest);
        store.upsert_user(guest).await;

        let mut general = ChannelRecord::group(
            "general",
            "hello everyone",
            UserId::from("u1"),
            vec![UserId::from("u1"), UserId::from("u2")],
        );
        general.channel_id = ChannelId::from("c-general");
        let mut secret = ChannelRecord::group("secret", "", UserId::from("u2"), vec![UserId::from("u2")]);
        secret.channel_id = ChannelId::from("c-secret");
        let mut dm = ChannelRecord::direct_message(UserId::from("u1"), UserId::from("u2"));
        dm.channel_id = ChannelId::from("c-dm");
        let mut notes = ChannelRecord::self_channel(UserId::from("u1"));
        notes.channel_id = ChannelId::from("c-notes");

        for channel in [&general, &secret, &dm, &notes] {
            store.upsert_channel(channel.clone()).await;
        }

        store
            .insert_message(&general.channel_id, message("m1", "u2", "Hello world", 0))
            .await;
        store
            .insert_message(&general.channel_id, message("m2", "u1", "lunch?", 1))
            .await;
        store
            .insert_message(&secret.channel_id, message("m3", "u2", "hello from secret", 2))
            .await;
        store
            .insert_message(&dm.channel_id, message("m4", "u2", "hello alice", 3))
            .await;
        store
            .insert_message(&notes.channel_id, message("m5", "u1", "hello me", 4))
            .await;
        store
            .insert_thread_reply(
                &general.channel_id,
                &MessageId::from("m2"),
                ThreadReply {
                    message_id: MessageId::from("r1"),
                    message_author_id: UserId::from("u2"),
                    message_content: "hello, lunch sounds good".into(),
                    time: Utc::now() + Duration::seconds(5),
                },
            )
            .await;

        let presence = Arc::new(PresenceCache::new());
        let mut table = PresenceTable::new();
        table.insert(
            UserId::from("u2"),
            PresenceRecord::stamped(PresenceStatus::Online, Utc::now()),
        );
        presence.apply_snapshot(table).await;

        let directory = Arc::new(UserDirectory::new(store.clone()));
        let search = SearchAggregator::new(store.clone(), directory.clone(), presence, UserId::from("u1"));

        Fixture {
            store,
            directory,
            search,
            general: general.channel_id,
            dm: dm.channel_id,
        }
    }

    #[tokio::test]
    async fn plain_term_fans_out() {
        let f = fixture().await;
        let results = f.search.search("hello").await;

        assert_eq!(results.channels.len(), 1);
        assert_eq!(results.channels[0].channel_id, f.general);

        // secret is not ours; the self-channel has no other participant
        assert_eq!(results.messages.len(), 1);
        assert_eq!(results.messages[0].message_id, MessageId::from("m1"));
        assert_eq!(results.messages[0].status, Some(PresenceStatus::Online));
        assert_eq!(results.messages[0].channel_name, "general");

        assert_eq!(results.direct_messages.len(), 1);
        assert_eq!(results.direct_messages[0].channel_id, f.dm);
        assert_eq!(results.direct_messages[0].direct_message_user_id, Some(UserId::from("u2")));
        assert_eq!(results.direct_messages[0].direct_message_user_name.as_deref(), Some("bob"));

        assert_eq!(results.threads.len(), 1);
        assert_eq!(results.threads[0].replied_message_id, Some(MessageId::from("m2")));
        assert_eq!(results.threads[0].replier_name.as_deref(), Some("bob"));

        assert!(results.users.is_empty());
    }

    #[tokio::test]
    async fn hash_sigil_searches_channels_only() {
        let f = fixture().await;
        let results = f.search.search("#general").await;

        assert_eq!(results.channels.len(), 1);
        assert_eq!(results.total(), 1);

        let all = f.search.search("#").await;
        assert_eq!(all.channels.len(), 2);
        assert_eq!(all.total(), 2);
    }

    #[tokio::test]
    async fn at_sigil_searches_users_only() {
        let f = fixture().await;
        let results = f.search.search("@ali").await;

        // the guest "Alistair" is never listed
        assert_eq!(results.users.len(), 1);
        assert_eq!(results.users[0].uid, UserId::from("u1"));
        assert_eq!(results.users[0].status, None);
        assert_eq!(results.total(), 1);

        let by_email = f.search.search("@BOB@EXAMPLE").await;
        assert_eq!(by_email.users[0].status, Some(PresenceStatus::Online));
    }

    #[tokio::test]
    async fn blank_term_clears_results() {
        let f = fixture().await;
        assert!(f.search.search("   ").await.is_empty());
    }

    #[tokio::test]
    async fn failing_category_does_not_hide_the_others() {
        let f = fixture().await;
        f.store.fail_on(Collection::Messages).await;

        let results = f.search.search("e").await;
        assert!(results.messages.is_empty());
        assert!(results.direct_messages.is_empty());
        assert!(results.threads.is_empty());
        assert!(!results.channels.is_empty());
        assert!(!results.users.is_empty());
    }

    #[tokio::test]
    async fn unresolved_dm_partner_keeps_id() {
        let f = fixture().await;
        let mut dm = ChannelRecord::direct_message(UserId::from("u1"), UserId::from("ghost"));
        dm.channel_id = ChannelId::from("c-ghost");
        f.store.upsert_channel(dm).await;
        f.store
            .insert_message(&ChannelId::from("c-ghost"), message("m9", "ghost", "boo", 9))
            .await;

        let results = f.search.search("boo").await;
        assert_eq!(results.direct_messages.len(), 1);
        assert_eq!(results.direct_messages[0].direct_message_user_id, Some(UserId::from("ghost")));
        assert_eq!(results.direct_messages[0].direct_message_user_name, None);
        assert!(f.directory.get(&UserId::from("ghost")).await.is_none());
    }

    #[tokio::test]
    async fn sequential_latest_searches_are_kept() {
        let f = fixture().await;
        assert!(f.search.search_latest("hello").await.is_some());
        assert!(f.search.search_latest("lunch").await.is_some());
    }

    #[tokio::test]
    async fn malformed_direct_message_is_not_searched() {
        let f = fixture().await;
        let mut crowd = ChannelRecord::direct_message(UserId::from("u1"), UserId::from("u2"));
        crowd.channel_id = ChannelId::from("c-crowd");
        crowd.channel_members.push(UserId::from("u3"));
        f.store.upsert_channel(crowd).await;
        f.store
            .insert_message(&ChannelId::from("c-crowd"), message("m7", "u3", "secret hello", 7))
            .await;

        let results = f.search.search("secret").await;
        assert!(results.direct_messages.is_empty());
        assert!(results.messages.is_empty());
    }

    #[tokio::test]
    async fn duplicate_direct_message_is_searched_once() {
        let f = fixture().await;
        let mut twin = ChannelRecord::direct_message(UserId::from("u2"), UserId::from("u1"));
        twin.channel_id = ChannelId::from("c-dm-twin");
        f.store.upsert_channel(twin).await;
        f.store
            .insert_message(&ChannelId::from("c-dm-twin"), message("m8", "u2", "hello twin", 8))
            .await;

        let results = f.search.search("hello").await;
        let channels: Vec<_> = results.direct_messages.iter().map(|h| &h.channel_id).collect();
        assert_eq!(channels, vec![&f.dm]);
    }

    /// Store whose next `list_users` call blocks until released.
    struct GatedStore {
        inner: MemoryDocumentStore,
        hold_next: AtomicBool,
        release: Notify,
    }

    #[async_trait]
    impl DocumentStore for GatedStore {
        async fn list_channels(&self) -> huddle_store::Result<Vec<ChannelRecord>> {
            self.inner.list_channels().await
        }

        async fn channels_for_member(&self, uid: &UserId) -> huddle_store::Result<Vec<ChannelRecord>> {
            self.inner.channels_for_member(uid).await
        }

        async fn list_messages(&self, channel_id: &ChannelId) -> huddle_store::Result<Vec<Message>> {
            self.inner.list_messages(channel_id).await
        }

        async fn list_thread_replies(
            &self,
            channel_id: &ChannelId,
            message_id: &MessageId,
        ) -> huddle_store::Result<Vec<ThreadReply>> {
            self.inner.list_thread_replies(channel_id, message_id).await
        }

        async fn list_users(&self) -> huddle_store::Result<Vec<UserIdentity>> {
            if self.hold_next.swap(false, Ordering::SeqCst) {
                self.release.notified().await;
            }
            self.inner.list_users().await
        }

        async fn get_user(&self, uid: &UserId) -> huddle_store::Result<Option<UserIdentity>> {
            self.inner.get_user(uid).await
        }
    }

    #[tokio::test]
    async fn overtaken_search_is_discarded() {
        let inner = MemoryDocumentStore::new();
        inner.upsert_user(UserIdentity::new("u1", "alice", "")).await;
        inner.upsert_user(UserIdentity::new("u2", "bob", "")).await;
        let store = Arc::new(GatedStore {
            inner,
            hold_next: AtomicBool::new(true),
            release: Notify::new(),
        });

        let directory = Arc::new(UserDirectory::new(store.clone()));
        let search = SearchAggregator::new(
            store.clone(),
            directory,
            Arc::new(PresenceCache::new()),
            UserId::from("u1"),
        );

        let newer = async {
            let results = search.search_latest("@bob").await;
            store.release.notify_one();
            results
        };
        let (older, newer) = futures::join!(search.search_latest("@ali"), newer);

        assert_eq!(older, None);
        let newer = newer.unwrap();
        assert_eq!(newer.users.len(), 1);
        assert_eq!(newer.users[0].uid, UserId::from("u2"));
    }
}
