//! Client core for the Trash Clean service-request API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the request layer
//! sit the pieces of the lead form and the admin panel that carry actual
//! logic: form validation and encoding, the filtered/paginated listing, media
//! resolution for the detail view, mutations, and the admin session gate.
//!
//! # Design
//! - `ContactsClient` is stateless; it holds only `base_url`.
//! - Each backend operation is split into `build_*` and `parse_*`, so the
//!   I/O boundary is explicit.
//! - Stateful pieces (`ContactForm`, `ListingState`, `AdminState`) return
//!   requests or fetch plans and accept outcomes; they never wait on I/O.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod admin;
pub mod client;
pub mod error;
pub mod http;
pub mod listing;
pub mod media;
pub mod query;
pub mod session;
pub mod submission;
pub mod types;

pub use admin::AdminState;
pub use client::ContactsClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Part, RequestBody};
pub use listing::{Applied, FetchPlan, ListingState, Mode, Pagination, Shape, Ticket, Work};
pub use media::{resolve_media, MediaRef};
pub use query::{query_string, Query};
pub use session::{AdminSession, MemorySessionStore, SessionStore};
pub use submission::{Attachment, ContactForm, Flash, FlashKind};
pub use types::{Contact, ContactId, Direction, Listing, NewContact, Page, PageRequest, Status};
