//! GitHub gist backing store.
//!
//! A room is a secret gist; messages are its comments. GitHub pages gist
//! comments by page number only, so this store declares the
//! [`CursorStrategy::PageCount`] cursor.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CommentStore, CursorStrategy, Message, PageCursor, PageEntry};
use crate::config::GithubConfig;
use crate::{ChatError, Result};

/// Media type requested from the REST API.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Content of the single file every room gist carries.
const ROOM_FILE_CONTENT: &str = "this gist is a gistchat room. comments are the chat log.";

#[derive(Debug, Deserialize)]
struct GistUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GistComment {
    id: u64,
    body: String,
    user: GistUser,
}

#[derive(Debug, Serialize)]
struct GistFile<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct NewGist<'a> {
    files: HashMap<String, GistFile<'a>>,
    public: bool,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct Created<T> {
    id: T,
}

/// GitHub REST client for room-level operations.
#[derive(Debug, Clone)]
pub struct GistClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
}

impl GistClient {
    /// Create a client from configuration, reading the token from the environment.
    pub fn new(config: &GithubConfig) -> Result<Self> {
        Self::from_parts(&config.api_url, config.token(), &config.user_agent)
    }

    /// Create a client against an explicit API base URL.
    pub fn from_parts(api_url: &str, token: Option<String>, user_agent: &str) -> Result<Self> {
        let mut api_url = Url::parse(api_url)
            .map_err(|e| ChatError::Config(format!("invalid API URL {api_url}: {e}")))?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ChatError::Remote(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| ChatError::Remote(format!("invalid endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(ChatError::Remote(format!(
                "HTTP error: {}",
                response.status()
            )));
        }
        Ok(response)
    }

    /// Resolve the login of the authenticated user.
    pub async fn resolve_local_identity(&self) -> Result<String> {
        if self.token.is_none() {
            return Err(ChatError::IdentityResolution(
                "no API token found; set GITHUB_TOKEN or GH_TOKEN".to_string(),
            ));
        }

        let url = self
            .endpoint("user")
            .map_err(|e| ChatError::IdentityResolution(e.to_string()))?;
        let response = self
            .send(self.request(Method::GET, url))
            .await
            .map_err(|e| ChatError::IdentityResolution(e.to_string()))?;
        let user: GistUser = response
            .json()
            .await
            .map_err(|e| ChatError::IdentityResolution(format!("unexpected /user response: {e}")))?;

        Ok(user.login)
    }

    /// Create a new room gist owned by `username`, returning its id.
    pub async fn create_room(&self, username: &str) -> Result<String> {
        let mut files = HashMap::new();
        files.insert(
            format!("{username}'s chat room"),
            GistFile {
                content: ROOM_FILE_CONTENT,
            },
        );
        let gist = NewGist {
            files,
            public: false,
        };

        let url = self.endpoint("gists")?;
        let response = self
            .send(self.request(Method::POST, url).json(&gist))
            .await
            .map_err(|e| ChatError::Remote(format!("failed to create gist: {e}")))?;
        let created: Created<String> = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(format!("gist creation response: {e}")))?;

        debug!("Created room gist {}", created.id);
        Ok(created.id)
    }

    /// Delete a room gist.
    pub async fn delete_room(&self, room_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("gists/{room_id}"))?;
        self.send(self.request(Method::DELETE, url))
            .await
            .map_err(|e| ChatError::Remote(format!("failed to delete gist {room_id}: {e}")))?;
        Ok(())
    }

    /// Get the comment feed of a room.
    pub fn comments(&self, room_id: impl Into<String>) -> GistComments {
        GistComments {
            client: self.clone(),
            room_id: room_id.into(),
        }
    }
}

/// Comment feed of one room gist.
#[derive(Debug, Clone)]
pub struct GistComments {
    client: GistClient,
    room_id: String,
}

impl GistComments {
    /// The gist id of the room.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }
}

/// Decode one comment, keeping the id when the rest is unusable.
fn decode_entry(value: serde_json::Value) -> PageEntry {
    let id = value.get("id").and_then(serde_json::Value::as_u64);
    match serde_json::from_value::<GistComment>(value) {
        Ok(comment) => PageEntry::Message(Message::new(
            comment.id,
            comment.user.login,
            comment.body,
        )),
        Err(e) => PageEntry::Malformed {
            id,
            reason: e.to_string(),
        },
    }
}

#[async_trait]
impl CommentStore for GistComments {
    async fn publish(&self, body: &str) -> Result<u64> {
        let url = self
            .client
            .endpoint(&format!("gists/{}/comments", self.room_id))?;
        let response = self
            .client
            .send(
                self.client
                    .request(Method::POST, url)
                    .json(&NewComment { body }),
            )
            .await?;
        let created: Created<u64> = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(format!("comment creation response: {e}")))?;
        Ok(created.id)
    }

    async fn fetch_page(&self, cursor: PageCursor, page_size: u32) -> Result<Vec<PageEntry>> {
        let page = match cursor {
            PageCursor::Page(page) => page,
            PageCursor::AfterId(_) => {
                return Err(ChatError::Remote(
                    "unsupported cursor: gist comments are paged by number".to_string(),
                ))
            }
        };

        let mut url = self
            .client
            .endpoint(&format!("gists/{}/comments", self.room_id))?;
        url.query_pairs_mut()
            .append_pair("per_page", &page_size.to_string())
            .append_pair("page", &page.to_string());

        let response = self
            .client
            .send(self.client.request(Method::GET, url))
            .await
            .map_err(|e| ChatError::Remote(format!("failed to get comments: {e}")))?;
        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(format!("comment page: {e}")))?;

        Ok(values.into_iter().map(decode_entry).collect())
    }

    fn cursor_strategy(&self) -> CursorStrategy {
        CursorStrategy::PageCount
    }
}
