//! Listing aggregator: filter mode, pagination cursor, and fetch sequencing.
//!
//! # Design
//! The aggregator never performs I/O. Every change that alters the query
//! returns a [`FetchPlan`]; the host runs it and hands the outcome back via
//! [`ListingState::complete`] or [`ListingState::resolve`]. Each plan carries
//! a [`Ticket`] stamped with a generation number. Only the completion whose
//! generation matches the latest plan is applied, so a slow response for an
//! old filter can never overwrite the results of a newer one.

use crate::client::ContactsClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Contact, Listing, Page, PageRequest, Status, DEFAULT_PAGE_SIZE};

/// Active filter strategy. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    All,
    NotDone,
    ByStatus,
    ByPhone,
}

/// Response shape expected for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Paged,
    Flat,
}

/// Identifies one planned fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub shape: Shape,
}

/// What the host has to do for a plan.
#[derive(Debug, Clone)]
pub enum Work {
    /// Execute this request and pass the response to `complete`.
    Request(HttpRequest),
    /// Nothing to send; pass this outcome to `resolve`.
    Ready(Result<Listing, ApiError>),
}

#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub ticket: Ticket,
    pub work: Work,
}

impl FetchPlan {
    pub fn request(&self) -> Option<&HttpRequest> {
        match &self.work {
            Work::Request(req) => Some(req),
            Work::Ready(_) => None,
        }
    }
}

/// Result of handing a completion to the aggregator.
#[derive(Debug)]
pub enum Applied {
    Loaded,
    Failed(ApiError),
    /// A newer plan exists; the completion was dropped untouched.
    Stale,
}

/// View model for the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub visible: bool,
    pub current: u32,
    pub total: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl Pagination {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total)
    }
}

#[derive(Debug, Clone)]
pub struct ListingState {
    client: ContactsClient,
    page_size: u32,
    mode: Mode,
    status: Status,
    phone: String,
    page: u32,
    generation: u64,
    data: Page<Contact>,
    busy: bool,
}

impl ListingState {
    pub fn new(client: ContactsClient) -> Self {
        Self::with_page_size(client, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(client: ContactsClient, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
            mode: Mode::All,
            status: Status::Open,
            phone: String::new(),
            page: 0,
            generation: 0,
            data: Page::default(),
            busy: false,
        }
    }

    pub fn client(&self) -> &ContactsClient {
        &self.client
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn data(&self) -> &Page<Contact> {
        &self.data
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_mode(&mut self, mode: Mode) -> Option<FetchPlan> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        self.page = 0;
        Some(self.plan())
    }

    pub fn set_status(&mut self, status: Status) -> Option<FetchPlan> {
        if self.status == status {
            return None;
        }
        self.status = status;
        self.page = 0;
        Some(self.plan())
    }

    /// Outside phone mode the value is only stored for later.
    pub fn set_phone(&mut self, phone: &str) -> Option<FetchPlan> {
        if self.phone == phone {
            return None;
        }
        self.phone = phone.to_string();
        if self.mode != Mode::ByPhone {
            return None;
        }
        self.page = 0;
        Some(self.plan())
    }

    /// Switch mode and parameter together; one fetch at most.
    pub fn apply_filter(&mut self, mode: Mode, status: Option<Status>, phone: Option<&str>) -> Option<FetchPlan> {
        let mut changed = self.mode != mode;
        self.mode = mode;
        if let Some(status) = status {
            changed |= self.status != status;
            self.status = status;
        }
        if let Some(phone) = phone {
            changed |= mode == Mode::ByPhone && self.phone != phone;
            self.phone = phone.to_string();
        }
        if !changed {
            return None;
        }
        self.page = 0;
        Some(self.plan())
    }

    pub fn next_page(&mut self) -> Option<FetchPlan> {
        if !self.pagination().next_enabled {
            return None;
        }
        self.page += 1;
        Some(self.plan())
    }

    pub fn prev_page(&mut self) -> Option<FetchPlan> {
        if !self.pagination().prev_enabled {
            return None;
        }
        self.page -= 1;
        Some(self.plan())
    }

    /// Jump to a zero-based page index; ignored in phone mode.
    pub fn goto_page(&mut self, page: u32) -> Option<FetchPlan> {
        if self.mode == Mode::ByPhone || self.page == page {
            return None;
        }
        self.page = page;
        Some(self.plan())
    }

    /// Re-run the current query at the current page.
    pub fn refresh(&mut self) -> FetchPlan {
        self.plan()
    }

    /// Re-run the current query from the first page.
    pub fn reload(&mut self) -> FetchPlan {
        self.page = 0;
        self.plan()
    }

    fn plan(&mut self) -> FetchPlan {
        self.generation += 1;
        self.busy = true;
        let page = PageRequest::page(self.page, self.page_size);
        let (shape, work) = match self.mode {
            Mode::All => (Shape::Paged, Work::Request(self.client.build_list_contacts(&page))),
            Mode::NotDone => (Shape::Paged, Work::Request(self.client.build_list_not_done(&page))),
            Mode::ByStatus => (
                Shape::Paged,
                Work::Request(self.client.build_list_by_status(self.status, &page)),
            ),
            Mode::ByPhone => {
                let phone = self.phone.trim();
                let work = if phone.is_empty() {
                    Work::Ready(Ok(Listing::Paged(Page::default())))
                } else {
                    match self.client.build_find_by_phone(phone) {
                        Ok(req) => Work::Request(req),
                        Err(err) => Work::Ready(Err(err)),
                    }
                };
                (Shape::Flat, work)
            }
        };
        FetchPlan {
            ticket: Ticket {
                generation: self.generation,
                shape,
            },
            work,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply the host's response for `ticket`.
    pub fn complete(&mut self, ticket: Ticket, response: Result<HttpResponse, ApiError>) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                "dropping stale listing response"
            );
            return Applied::Stale;
        }
        let listing = response.and_then(|resp| match ticket.shape {
            Shape::Paged => self.client.parse_page(resp).map(Listing::Paged),
            Shape::Flat => self.client.parse_contact_list(resp).map(Listing::Flat),
        });
        self.resolve(ticket, listing)
    }

    /// Apply an already-decoded outcome for `ticket`.
    pub fn resolve(&mut self, ticket: Ticket, listing: Result<Listing, ApiError>) -> Applied {
        if !self.is_current(ticket) {
            return Applied::Stale;
        }
        self.busy = false;
        match listing {
            Ok(listing) => {
                self.data = listing.into_page();
                Applied::Loaded
            }
            Err(err) => Applied::Failed(err),
        }
    }

    /// Forget any in-flight plan without applying it.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.busy = false;
    }

    /// Prev/next follow the requested page, so repeated presses before a
    /// response lands cannot walk past either end.
    pub fn pagination(&self) -> Pagination {
        let total = self.data.total_pages.max(1);
        let paged = self.mode != Mode::ByPhone;
        Pagination {
            visible: paged,
            current: self.data.number.saturating_add(1).min(total),
            total,
            prev_enabled: paged && self.page > 0,
            next_enabled: paged && self.page.saturating_add(1) < total,
        }
    }
}
