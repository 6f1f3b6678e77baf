//! Chat synchronization engine.
//!
//! Turns a room's append-only comment feed into a chat session. Two drivers
//! run the same poll operation: a timer task and a one-shot refresh fired
//! after every local publish. They coordinate only through the
//! [`SeenTracker`] lock and the transcript's own lock; no lock is held across
//! a network call.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::classify::{classify, ChatEvent, JOIN_SENTINEL, PART_SENTINEL};
use super::command::{format_help, format_usage, parse_input, ChatCommand, ChatInput};
use super::presence::PresenceTracker;
use super::seen::SeenTracker;
use super::transcript::Transcript;
use crate::banner::{BannerRenderer, FigletBanner};
use crate::config::{ChatConfig, CursorSetting};
use crate::store::{CommentStore, CursorStrategy, PageCursor, PageEntry};
use crate::{ChatError, Result};

/// Shortest accepted delay between timer-driven polls.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Delay between timer-driven polls.
    pub poll_interval: Duration,
    /// Messages requested per page.
    pub page_size: u32,
    /// Upper bound on pages fetched in one poll.
    pub max_pages_per_poll: u32,
    /// Cursor selection.
    pub cursor: CursorSetting,
    /// Directory holding named banner fonts.
    pub fonts_dir: PathBuf,
    /// Maximum banner width in columns.
    pub banner_width: usize,
    /// Command quoted in invitations.
    pub invite_command: String,
}

impl SessionOptions {
    /// Build options from the `[chat]` configuration section.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs).max(MIN_POLL_INTERVAL),
            page_size: config.page_size.max(1),
            max_pages_per_poll: config.max_pages_per_poll.max(1),
            cursor: config.cursor,
            fonts_dir: PathBuf::from(&config.fonts_dir),
            banner_width: config.banner_width,
            invite_command: config.invite_command.clone(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Join announcement not yet attempted.
    Joining,
    /// Polling and accepting input.
    Active,
    /// Part announcement in flight.
    Leaving,
    /// Terminal; nothing more is fetched or published.
    Closed,
}

/// What the front-end should do after an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Keep reading input.
    Continue,
    /// The session is over.
    Quit,
}

/// Result of handling one input line.
#[derive(Debug)]
pub struct InputOutcome {
    /// What the front-end should do next.
    pub action: SessionAction,
    /// Follow-up poll started after a publish, if any.
    pub refresh: Option<JoinHandle<()>>,
}

impl InputOutcome {
    fn local() -> Self {
        Self {
            action: SessionAction::Continue,
            refresh: None,
        }
    }

    fn quit() -> Self {
        Self {
            action: SessionAction::Quit,
            refresh: None,
        }
    }
}

/// One participant's chat session in a room.
pub struct SyncEngine {
    room_id: String,
    username: String,
    store: Arc<dyn CommentStore>,
    transcript: Arc<dyn Transcript>,
    banner: Arc<dyn BannerRenderer>,
    seen: SeenTracker,
    presence: Mutex<PresenceTracker>,
    state: Mutex<SessionState>,
    /// Furthest feed position covered by a fetched page (page cursor only).
    position: Mutex<usize>,
    cancel: CancellationToken,
    strategy: CursorStrategy,
    options: SessionOptions,
}

impl SyncEngine {
    /// Create a session for `username` in `room_id`.
    pub fn new(
        room_id: impl Into<String>,
        username: impl Into<String>,
        store: Arc<dyn CommentStore>,
        transcript: Arc<dyn Transcript>,
        options: SessionOptions,
    ) -> Self {
        let preferred = store.cursor_strategy();
        let mut strategy = options.cursor.resolve(preferred);
        if !store.supports(strategy) {
            warn!(
                "Store cannot serve {:?} cursors, using {:?} instead",
                strategy, preferred
            );
            strategy = preferred;
        }
        Self {
            room_id: room_id.into(),
            username: username.into(),
            banner: Arc::new(FigletBanner::new(options.fonts_dir.clone())),
            store,
            transcript,
            seen: SeenTracker::new(),
            presence: Mutex::new(PresenceTracker::new()),
            state: Mutex::new(SessionState::Joining),
            position: Mutex::new(0),
            cancel: CancellationToken::new(),
            strategy,
            options,
        }
    }

    /// Replace the banner renderer.
    pub fn with_banner(mut self, banner: Arc<dyn BannerRenderer>) -> Self {
        self.banner = banner;
        self
    }

    /// Room identifier.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Local username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Delivered-message ledger.
    pub fn seen(&self) -> &SeenTracker {
        &self.seen
    }

    /// Cursor strategy in effect.
    pub fn cursor_strategy(&self) -> CursorStrategy {
        self.strategy
    }

    /// Present users, sorted.
    pub fn present_users(&self) -> Vec<String> {
        self.presence_lock().snapshot()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn is_closed(&self) -> bool {
        self.state() == SessionState::Closed
    }

    fn presence_lock(&self) -> MutexGuard<'_, PresenceTracker> {
        self.presence.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Announce the join and enter the active state.
    ///
    /// A failed announcement is reported but the session still becomes
    /// active.
    pub async fn join(&self) {
        if self.state() != SessionState::Joining {
            return;
        }
        if let Err(e) = self.store.publish(JOIN_SENTINEL).await {
            warn!("Failed to announce join in room {}: {}", self.room_id, e);
            self.transcript.append_error(&e);
        }
        self.set_state(SessionState::Active);
        info!("Joined room {} as {}", self.room_id, self.username);
    }

    /// Announce the part, stop the timer driver and close the session.
    pub async fn leave(&self) {
        if matches!(self.state(), SessionState::Leaving | SessionState::Closed) {
            return;
        }
        self.set_state(SessionState::Leaving);
        if let Err(e) = self.store.publish(PART_SENTINEL).await {
            warn!("Failed to announce part in room {}: {}", self.room_id, e);
        }
        self.cancel.cancel();
        self.set_state(SessionState::Closed);
        info!("Left room {}", self.room_id);
    }

    fn next_cursor(&self) -> PageCursor {
        match self.strategy {
            CursorStrategy::AfterId => PageCursor::AfterId(self.seen.last_id()),
            CursorStrategy::PageCount => {
                let consumed = *self.position.lock().unwrap_or_else(PoisonError::into_inner);
                let page = consumed / self.options.page_size as usize + 1;
                PageCursor::Page(u32::try_from(page).unwrap_or(u32::MAX))
            }
        }
    }

    /// Move the page position past a fetched page.
    ///
    /// Every returned entry counts, including ones without an id. Returns
    /// true if the position moved.
    fn advance_position(&self, cursor: PageCursor, fetched: usize) -> bool {
        let PageCursor::Page(page) = cursor else {
            return false;
        };
        let end = page.saturating_sub(1) as usize * self.options.page_size as usize + fetched;
        let mut position = self.position.lock().unwrap_or_else(PoisonError::into_inner);
        if end > *position {
            *position = end;
            true
        } else {
            false
        }
    }

    /// Run one poll cycle.
    ///
    /// Fetches pages until one comes back short or moves nothing forward, up
    /// to the configured page budget. Returns how many entries were newly
    /// recorded. A closed session polls nothing.
    pub async fn poll(&self) -> Result<usize> {
        let mut recorded = 0;
        for _ in 0..self.options.max_pages_per_poll {
            if self.is_closed() {
                break;
            }
            let cursor = self.next_cursor();
            let page = self
                .store
                .fetch_page(cursor, self.options.page_size)
                .await?;
            let fetched = page.len();
            let full = fetched >= self.options.page_size as usize;
            let fresh = self.apply_page(page);
            let advanced = self.advance_position(cursor, fetched);
            recorded += fresh;
            if !full || (fresh == 0 && !advanced) {
                break;
            }
        }
        if recorded > 0 {
            debug!("Poll recorded {} new entr(ies) in room {}", recorded, self.room_id);
        }
        Ok(recorded)
    }

    /// Run one poll cycle, reporting any failure in the transcript.
    pub async fn poll_and_report(&self) -> usize {
        match self.poll().await {
            Ok(recorded) => recorded,
            Err(e) => {
                warn!("Poll failed in room {}: {}", self.room_id, e);
                self.transcript.append_error(&e);
                0
            }
        }
    }

    /// Deliver the unseen entries of a fetched page, in page order.
    ///
    /// Returns how many entries were newly recorded.
    pub fn apply_page(&self, entries: Vec<PageEntry>) -> usize {
        let mut recorded = 0;
        let mut presence_changed = false;

        for entry in entries {
            match entry {
                PageEntry::Message(message) => {
                    if !self.seen.mark_seen(message.id) {
                        continue;
                    }
                    recorded += 1;

                    let event = classify(&message);
                    match &event {
                        ChatEvent::Join { user } => {
                            presence_changed |= self.presence_lock().on_join(user);
                        }
                        ChatEvent::Part { user } => {
                            presence_changed |= self.presence_lock().on_part(user);
                        }
                        ChatEvent::System { .. } | ChatEvent::Chat { .. } => {}
                    }
                    self.transcript.append_line(&event.display());
                }
                PageEntry::Malformed { id: Some(id), reason } => {
                    if !self.seen.mark_seen(id) {
                        continue;
                    }
                    recorded += 1;
                    let err = ChatError::MalformedResponse(format!("comment {id}: {reason}"));
                    warn!("Skipping comment in room {}: {}", self.room_id, err);
                    self.transcript.append_error(&err);
                }
                PageEntry::Malformed { id: None, reason } => {
                    debug!("Skipping comment without id in room {}: {}", self.room_id, reason);
                }
            }
        }

        if presence_changed {
            // Publish under the lock so a stale snapshot never lands last.
            let presence = self.presence_lock();
            self.transcript.set_presence_list(&presence.snapshot());
        }
        recorded
    }

    /// Start an out-of-cycle poll in the background.
    pub fn trigger_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.poll_and_report().await;
        })
    }

    /// Start the timer driver.
    ///
    /// Polls immediately, then every poll interval, until the session is
    /// cancelled by [`SyncEngine::leave`].
    pub fn start_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let period = engine.options.poll_interval.max(MIN_POLL_INTERVAL);
            info!(
                "Poll timer started for room {} (interval: {:?})",
                engine.room_id, period
            );
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = engine.cancel.cancelled() => break,
                    _ = timer.tick() => {}
                }
                if engine.is_closed() {
                    break;
                }
                engine.poll_and_report().await;
            }
            debug!("Poll timer stopped for room {}", engine.room_id);
        })
    }

    /// Handle one line of local input.
    pub async fn handle_input(self: &Arc<Self>, input: &str) -> InputOutcome {
        if self.is_closed() {
            return InputOutcome::quit();
        }

        match parse_input(input) {
            ChatInput::Empty => InputOutcome::local(),
            ChatInput::Message(text) => self.publish_and_refresh(&text).await,
            ChatInput::Command(command) => self.handle_command(command).await,
        }
    }

    async fn handle_command(self: &Arc<Self>, command: ChatCommand) -> InputOutcome {
        match command {
            ChatCommand::Help => {
                for line in format_help() {
                    self.transcript.append_line(&line);
                }
                InputOutcome::local()
            }
            ChatCommand::Quit(reason) => {
                let notice = match reason {
                    Some(reason) => format!("~ {} quit ({})", self.username, reason),
                    None => format!("~ {} quit", self.username),
                };
                if let Err(e) = self.store.publish(&notice).await {
                    self.transcript.append_error(&e);
                }
                self.leave().await;
                InputOutcome::quit()
            }
            ChatCommand::Invite(user) => {
                let invitation = format!(
                    "~ hey @{} come chat ^_^ `{} {}`",
                    user, self.options.invite_command, self.room_id
                );
                self.publish_and_refresh(&invitation).await
            }
            ChatCommand::Banner(text) => self.publish_banner(None, &text).await,
            ChatCommand::BannerFont { font, text } => self.publish_banner(Some(&font), &text).await,
            ChatCommand::Me(action) => {
                let line = format!("~ {} {}", self.username, action);
                self.publish_and_refresh(&line).await
            }
            ChatCommand::Incomplete(name) => {
                self.transcript.append_line(&format_usage(name));
                InputOutcome::local()
            }
            ChatCommand::Unknown(name) => {
                debug!("Ignoring unknown command /{}", name);
                InputOutcome::local()
            }
        }
    }

    async fn publish_banner(self: &Arc<Self>, font: Option<&str>, text: &str) -> InputOutcome {
        match self.banner.render(font, text, self.options.banner_width) {
            Ok(art) => {
                let body = format!("~ {}:\n{}", self.username, art);
                self.publish_and_refresh(&body).await
            }
            Err(e) => {
                self.transcript.append_error(&e);
                InputOutcome::local()
            }
        }
    }

    async fn publish_and_refresh(self: &Arc<Self>, body: &str) -> InputOutcome {
        if let Err(e) = self.store.publish(body).await {
            warn!("Failed to publish in room {}: {}", self.room_id, e);
            self.transcript.append_error(&e);
        }
        InputOutcome {
            action: SessionAction::Continue,
            refresh: Some(self.trigger_refresh()),
        }
    }
}
