//! Stateless HTTP request builder and response parser for the contacts API.
//!
//! # Design
//! `ContactsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each backend operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The host executes the actual HTTP round-trip, keeping the
//! core deterministic and free of I/O dependencies.
//!
//! Routes:
//! - `POST   /api/contacts`               create (JSON)
//! - `POST   /api/contacts/with-media`    create (multipart: `data` + `image`|`video`)
//! - `POST   /api/contacts/{id}/image`    attach image to an existing record
//! - `POST   /api/contacts/{id}/video`    attach video to an existing record
//! - `GET    /api/contacts?page&size&sortBy&direction`
//! - `GET    /api/contacts/status/{status}?...`
//! - `GET    /api/contacts/status/not-done?...`
//! - `GET    /api/contacts/phone/{phone}` flat list
//! - `GET    /api/contacts/{id}`
//! - `PUT    /api/contacts/{id}/status`   server advances the status
//! - `DELETE /api/contacts/{id}`

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Part};
use crate::query::Query;
use crate::submission::Attachment;
use crate::types::{Contact, ContactId, NewContact, Page, PageRequest, Status};

/// Synchronous, stateless client for the contacts API.
#[derive(Debug, Clone)]
pub struct ContactsClient {
    base_url: String,
}

impl ContactsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn contacts_url(&self) -> String {
        format!("{}/api/contacts", self.base_url)
    }

    fn paged_url(&self, path: &str, page: &PageRequest) -> String {
        let query = Query::new()
            .push("page", page.page)
            .push("size", page.size)
            .push("sortBy", &page.sort_by)
            .push("direction", page.direction)
            .finish();
        if query.is_empty() {
            format!("{}{path}", self.contacts_url())
        } else {
            format!("{}{path}?{query}", self.contacts_url())
        }
    }

    /// Join percent-encoded path segments onto the base URL.
    fn segments_url(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    // --- create -------------------------------------------------------------

    pub fn build_create_contact(&self, input: &NewContact) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::json(HttpMethod::Post, self.contacts_url(), body))
    }

    /// Multipart creation: the contact as a JSON `data` part plus one media part.
    pub fn build_create_contact_with_media(
        &self,
        input: &NewContact,
        media: &Attachment,
    ) -> Result<HttpRequest, ApiError> {
        let data = Part {
            name: "data".to_string(),
            file_name: None,
            content_type: "application/json".to_string(),
            data: to_json(input)?.into_bytes(),
        };
        Ok(HttpRequest::multipart(
            format!("{}/with-media", self.contacts_url()),
            vec![data, media_part(media)],
        ))
    }

    /// Attach an image or video to an existing record; route follows the MIME category.
    pub fn build_upload_media(&self, id: ContactId, media: &Attachment) -> HttpRequest {
        let route = media_part_name(media);
        HttpRequest::multipart(
            format!("{}/{id}/{route}", self.contacts_url()),
            vec![media_part(media)],
        )
    }

    // --- lists --------------------------------------------------------------

    pub fn build_list_contacts(&self, page: &PageRequest) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.paged_url("", page))
    }

    pub fn build_list_by_status(&self, status: Status, page: &PageRequest) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Get,
            self.paged_url(&format!("/status/{status}"), page),
        )
    }

    pub fn build_list_not_done(&self, page: &PageRequest) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.paged_url("/status/not-done", page))
    }

    pub fn build_find_by_phone(&self, phone: &str) -> Result<HttpRequest, ApiError> {
        let url = self.segments_url(&["api", "contacts", "phone", phone])?;
        Ok(HttpRequest::new(HttpMethod::Get, url))
    }

    // --- detail / actions ---------------------------------------------------

    pub fn build_get_contact(&self, id: ContactId) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("{}/{id}", self.contacts_url()))
    }

    pub fn build_toggle_status(&self, id: ContactId) -> HttpRequest {
        HttpRequest::new(HttpMethod::Put, format!("{}/{id}/status", self.contacts_url()))
    }

    pub fn build_delete_contact(&self, id: ContactId) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("{}/{id}", self.contacts_url()))
    }

    // --- parsing ------------------------------------------------------------

    pub fn parse_create_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        parse_json(response)
    }

    pub fn parse_upload_media(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        parse_json(response)
    }

    pub fn parse_page(&self, response: HttpResponse) -> Result<Page<Contact>, ApiError> {
        parse_json(response)
    }

    pub fn parse_contact_list(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        parse_json(response)
    }

    pub fn parse_toggle_status(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_contact(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn media_part_name(media: &Attachment) -> &'static str {
    if media.is_video() {
        "video"
    } else {
        "image"
    }
}

fn media_part(media: &Attachment) -> Part {
    Part {
        name: media_part_name(media).to_string(),
        file_name: Some(media.file_name.clone()),
        content_type: media.content_type.clone(),
        data: media.data.clone(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        reason: response.reason.clone(),
        body: response.body.clone(),
    })
}
