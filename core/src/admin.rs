//! Admin panel state: listing, open detail, flash banner, and mutations.
//!
//! Mutations (status toggle, delete) refetch the current page on success.
//! Only filter changes move the cursor back to page 0.

use crate::client::ContactsClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::listing::{Applied, FetchPlan, ListingState, Ticket};
use crate::media::MediaRef;
use crate::submission::{Attachment, Flash};
use crate::types::{Contact, ContactId, Listing};

#[derive(Debug, Clone)]
pub struct AdminState {
    listing: ListingState,
    detail: Option<Contact>,
    flash: Option<Flash>,
    acting: bool,
}

impl AdminState {
    pub fn new(client: ContactsClient, page_size: u32) -> Self {
        Self {
            listing: ListingState::with_page_size(client, page_size),
            detail: None,
            flash: None,
            acting: false,
        }
    }

    pub fn client(&self) -> &ContactsClient {
        self.listing.client()
    }

    pub fn listing(&self) -> &ListingState {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut ListingState {
        &mut self.listing
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn dismiss_flash(&mut self) {
        self.flash = None;
    }

    pub fn busy(&self) -> bool {
        self.acting || self.listing.busy()
    }

    pub fn detail(&self) -> Option<&Contact> {
        self.detail.as_ref()
    }

    /// Media of the open detail, resolved against the API base.
    pub fn detail_media(&self) -> Option<MediaRef> {
        self.detail
            .as_ref()
            .and_then(|c| c.media(self.listing.client().base_url()))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // --- listing ------------------------------------------------------------

    /// Apply a listing response. Returns false when the response was stale.
    pub fn finish_fetch(&mut self, ticket: Ticket, response: Result<HttpResponse, ApiError>) -> bool {
        let applied = self.listing.complete(ticket, response);
        self.record_fetch(applied)
    }

    /// Apply a listing outcome that needed no request.
    pub fn finish_ready(&mut self, ticket: Ticket, outcome: Result<Listing, ApiError>) -> bool {
        let applied = self.listing.resolve(ticket, outcome);
        self.record_fetch(applied)
    }

    fn record_fetch(&mut self, applied: Applied) -> bool {
        match applied {
            Applied::Loaded => {
                if self.flash.as_ref().is_some_and(Flash::is_error) {
                    self.flash = None;
                }
                true
            }
            Applied::Failed(err) => {
                self.flash = Some(Flash::error(err.message_or("Failed to load")));
                true
            }
            Applied::Stale => false,
        }
    }

    // --- detail -------------------------------------------------------------

    pub fn begin_view(&mut self, id: ContactId) -> HttpRequest {
        self.acting = true;
        self.client().build_get_contact(id)
    }

    pub fn finish_view(&mut self, response: Result<HttpResponse, ApiError>) {
        self.acting = false;
        match response.and_then(|r| self.client().parse_get_contact(r)) {
            Ok(contact) => self.detail = Some(contact),
            Err(err) => self.flash = Some(Flash::error(err.message_or("Failed to fetch contact"))),
        }
    }

    // --- mutations ----------------------------------------------------------

    pub fn begin_toggle(&mut self, id: ContactId) -> HttpRequest {
        self.acting = true;
        self.client().build_toggle_status(id)
    }

    /// Record a toggle outcome; on success returns the refetch of the current page.
    pub fn finish_toggle(&mut self, response: Result<HttpResponse, ApiError>) -> Option<FetchPlan> {
        self.acting = false;
        match response.and_then(|r| self.client().parse_toggle_status(r)) {
            Ok(updated) => {
                self.flash = Some(Flash::success(format!(
                    "Status set to {} (#{})",
                    updated.status, updated.id
                )));
                if self.detail.as_ref().is_some_and(|d| d.id == updated.id) {
                    self.detail = Some(updated);
                }
                Some(self.listing.refresh())
            }
            Err(err) => {
                self.flash = Some(Flash::error(err.message_or("Failed to update status")));
                None
            }
        }
    }

    /// Text of the confirmation prompt shown before deleting.
    pub fn delete_prompt(id: ContactId) -> String {
        format!("Delete request #{id}? This cannot be undone.")
    }

    pub fn begin_delete(&mut self, id: ContactId) -> HttpRequest {
        self.acting = true;
        self.client().build_delete_contact(id)
    }

    /// Record a delete outcome; on success returns the refetch of the current page.
    pub fn finish_delete(
        &mut self,
        id: ContactId,
        response: Result<HttpResponse, ApiError>,
    ) -> Option<FetchPlan> {
        self.acting = false;
        match response.and_then(|r| self.client().parse_delete_contact(r)) {
            Ok(()) => {
                self.flash = Some(Flash::success(format!("Deleted #{id}")));
                if self.detail.as_ref().is_some_and(|d| d.id == id) {
                    self.detail = None;
                }
                Some(self.listing.refresh())
            }
            Err(err) => {
                self.flash = Some(Flash::error(err.message_or("Failed to delete")));
                None
            }
        }
    }

    /// Validate and encode a media upload for an existing record.
    pub fn begin_upload(&mut self, id: ContactId, media: &Attachment) -> Result<HttpRequest, ApiError> {
        if let Err(err) = media.validate() {
            self.flash = Some(Flash::error(err.to_string()));
            return Err(err);
        }
        self.acting = true;
        Ok(self.client().build_upload_media(id, media))
    }

    pub fn finish_upload(&mut self, response: Result<HttpResponse, ApiError>) -> Option<FetchPlan> {
        self.acting = false;
        match response.and_then(|r| self.client().parse_upload_media(r)) {
            Ok(updated) => {
                self.flash = Some(Flash::success(format!("Media attached to #{}", updated.id)));
                if self.detail.as_ref().is_some_and(|d| d.id == updated.id) {
                    self.detail = Some(updated);
                }
                Some(self.listing.refresh())
            }
            Err(err) => {
                self.flash = Some(Flash::error(err.message_or("Failed to upload media")));
                None
            }
        }
    }
}
