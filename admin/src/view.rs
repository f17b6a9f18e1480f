//! Async host for [`AdminState`].
//!
//! # Design
//! The core decides *what* to fetch and whether a response is still wanted;
//! this type only runs the I/O. Every listing fetch runs as its own tokio
//! task. Dispatching a new fetch aborts the previous task, and the core's
//! generation ticket rejects anything that still slips through, so a slow
//! response for an old filter or page never replaces newer data. Dropping
//! the view aborts whatever is in flight.
//!
//! The state lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use trashclean_core::{
    AdminState, Attachment, ContactId, ContactsClient, FetchPlan, Mode, Status, Work,
};

use crate::transport::HttpTransport;

/// Asks the operator to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct AdminView<T: HttpTransport> {
    state: Arc<Mutex<AdminState>>,
    transport: Arc<T>,
    in_flight: Option<JoinHandle<()>>,
}

fn lock(state: &Mutex<AdminState>) -> MutexGuard<'_, AdminState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: HttpTransport> AdminView<T> {
    pub fn new(client: ContactsClient, page_size: u32, transport: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(AdminState::new(client, page_size))),
            transport: Arc::new(transport),
            in_flight: None,
        }
    }

    /// Read the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&AdminState) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn snapshot(&self) -> AdminState {
        lock(&self.state).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut AdminState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    /// Run a fetch plan, superseding any fetch still in flight.
    fn dispatch(&mut self, plan: FetchPlan) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        let FetchPlan { ticket, work } = plan;
        match work {
            Work::Ready(outcome) => {
                self.update(|s| s.finish_ready(ticket, outcome));
            }
            Work::Request(request) => {
                let state = Arc::clone(&self.state);
                let transport = Arc::clone(&self.transport);
                self.in_flight = Some(tokio::spawn(async move {
                    let response = transport.execute(request).await;
                    if !lock(&state).finish_fetch(ticket, response) {
                        tracing::debug!(generation = ticket.generation, "discarded stale listing");
                    }
                }));
            }
        }
    }

    fn dispatch_opt(&mut self, plan: Option<FetchPlan>) -> bool {
        match plan {
            Some(plan) => {
                self.dispatch(plan);
                true
            }
            None => false,
        }
    }

    /// Wait for the in-flight fetch, if any, to land.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    tracing::warn!(error = %err, "listing task failed");
                }
            }
        }
    }

    // --- listing ------------------------------------------------------------

    /// Refetch the current mode and page.
    pub fn load(&mut self) {
        let plan = self.update(|s| s.listing_mut().refresh());
        self.dispatch(plan);
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        let plan = self.update(|s| s.listing_mut().set_mode(mode));
        self.dispatch_opt(plan)
    }

    pub fn set_status(&mut self, status: Status) -> bool {
        let plan = self.update(|s| s.listing_mut().set_status(status));
        self.dispatch_opt(plan)
    }

    pub fn set_phone(&mut self, phone: &str) -> bool {
        let plan = self.update(|s| s.listing_mut().set_phone(phone));
        self.dispatch_opt(plan)
    }

    pub fn apply_filter(&mut self, mode: Mode, status: Option<Status>, phone: Option<&str>) -> bool {
        let plan = self.update(|s| s.listing_mut().apply_filter(mode, status, phone));
        self.dispatch_opt(plan)
    }

    pub fn next_page(&mut self) -> bool {
        let plan = self.update(|s| s.listing_mut().next_page());
        self.dispatch_opt(plan)
    }

    pub fn prev_page(&mut self) -> bool {
        let plan = self.update(|s| s.listing_mut().prev_page());
        self.dispatch_opt(plan)
    }

    pub fn goto_page(&mut self, page: u32) -> bool {
        let plan = self.update(|s| s.listing_mut().goto_page(page));
        self.dispatch_opt(plan)
    }

    // --- detail -------------------------------------------------------------

    pub async fn view(&mut self, id: ContactId) {
        let request = self.update(|s| s.begin_view(id));
        let response = self.transport.execute(request).await;
        self.update(|s| s.finish_view(response));
    }

    pub fn close_detail(&mut self) {
        self.update(AdminState::close_detail);
    }

    pub fn dismiss_flash(&mut self) {
        self.update(AdminState::dismiss_flash);
    }

    // --- mutations ----------------------------------------------------------

    pub async fn toggle(&mut self, id: ContactId) {
        let request = self.update(|s| s.begin_toggle(id));
        let response = self.transport.execute(request).await;
        let plan = self.update(|s| s.finish_toggle(response));
        self.dispatch_opt(plan);
    }

    /// Delete after confirmation. Returns false, without any request, when
    /// the operator declines.
    pub async fn delete(&mut self, id: ContactId, confirm: &mut impl Confirm) -> bool {
        if !confirm.confirm(&AdminState::delete_prompt(id)) {
            tracing::debug!(id, "delete declined");
            return false;
        }
        let request = self.update(|s| s.begin_delete(id));
        let response = self.transport.execute(request).await;
        let plan = self.update(|s| s.finish_delete(id, response));
        self.dispatch_opt(plan);
        true
    }

    pub async fn upload(&mut self, id: ContactId, media: &Attachment) {
        let Ok(request) = self.update(|s| s.begin_upload(id, media)) else {
            return;
        };
        let response = self.transport.execute(request).await;
        let plan = self.update(|s| s.finish_upload(response));
        self.dispatch_opt(plan);
    }
}

impl<T: HttpTransport> Drop for AdminView<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        lock(&self.state).listing_mut().cancel();
    }
}
