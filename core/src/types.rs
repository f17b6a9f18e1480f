//! Domain DTOs for the contacts API.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase on the wire) but
//! are defined independently from the mock-server crate; integration tests
//! catch schema drift between the two.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::media::{self, MediaRef};

pub type ContactId = i64;

/// Lifecycle of a service request. The backend owns transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Open,
    Pending,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Open, Status::Pending, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Pending => "PENDING",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Status::Open),
            "PENDING" => Ok(Status::Pending),
            "DONE" => Ok(Status::Done),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// A submitted service request as returned by the API.
///
/// `image`/`video` are raw storage keys (older payloads); `imageUrl` and
/// `videoUrl` are already-resolved URLs. Use [`Contact::media`] rather than
/// reading them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl Contact {
    /// The record's media, resolved against `base_url`.
    ///
    /// Precedence: `imageUrl`, `image`, `videoUrl`, `video`. The first
    /// non-empty reference wins.
    pub fn media(&self, base_url: &str) -> Option<MediaRef> {
        let resolve = |resolved: &Option<String>, raw: &Option<String>| {
            resolved
                .as_deref()
                .and_then(|r| media::resolve_media(base_url, r))
                .or_else(|| raw.as_deref().and_then(|r| media::resolve_media(base_url, r)))
        };
        resolve(&self.image_url, &self.image)
            .map(MediaRef::Image)
            .or_else(|| resolve(&self.video_url, &self.video).map(MediaRef::Video))
    }
}

/// JSON payload for creating a request. Status is left to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
}

/// Sort direction accepted by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        })
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination and ordering for the paged list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: Direction,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: "createdAt".to_string(),
            direction: Direction::Desc,
        }
    }
}

impl PageRequest {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }
}

/// One page of a paged listing (Spring `Page` shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            number: 0,
            total_elements: None,
            size: None,
        }
    }
}

impl<T> Page<T> {
    /// Wrap a flat list as the only page of a one-page result.
    pub fn single(content: Vec<T>) -> Self {
        let total = content.len() as u64;
        Self {
            content,
            total_pages: 1,
            number: 0,
            total_elements: Some(total),
            size: None,
        }
    }
}

/// A list response in either of the shapes the backend produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Paged(Page<Contact>),
    Flat(Vec<Contact>),
}

impl Listing {
    /// Normalize into the single page shape consumed by rendering.
    pub fn into_page(self) -> Page<Contact> {
        match self {
            Listing::Paged(page) => page,
            Listing::Flat(list) => Page::single(list),
        }
    }
}
