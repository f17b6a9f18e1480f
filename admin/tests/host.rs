//! Async host tests against the mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port and drives the
//! reqwest transport, the submission helper and `AdminView` over real HTTP.
//! `Scripted` wraps the real transport to count requests and to hold back
//! chosen responses, which is how the race and timeout cases are staged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trashclean_admin::{submit, AdminView, HttpTransport, ReqwestTransport};
use trashclean_core::{
    ApiError, Attachment, ContactForm, ContactId, ContactsClient, HttpRequest, HttpResponse,
    MediaRef, Mode, NewContact, Status,
};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new(Duration::from_secs(5))
}

#[derive(Clone)]
struct Scripted {
    inner: ReqwestTransport,
    calls: Arc<AtomicUsize>,
    slow: Option<(&'static str, Duration)>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            inner: transport(),
            calls: Arc::new(AtomicUsize::new(0)),
            slow: None,
        }
    }

    /// Delay every request whose URL contains `needle`.
    fn slow(mut self, needle: &'static str, delay: Duration) -> Self {
        self.slow = Some((needle, delay));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpTransport for Scripted {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((needle, delay)) = self.slow {
            if request.url.contains(needle) {
                tokio::time::sleep(delay).await;
            }
        }
        self.inner.execute(request).await
    }
}

fn form(name: &str, phone: &str) -> ContactForm {
    let mut form = ContactForm::new();
    form.fields = NewContact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_number: phone.to_string(),
        address: "500 Pine St".to_string(),
        description: String::new(),
    };
    form
}

async fn seed(client: &ContactsClient, count: usize) -> Vec<ContactId> {
    let transport = transport();
    let mut ids = Vec::new();
    for i in 0..count {
        let mut f = form(&format!("Client{i}"), "206-555-0100");
        let flash = submit(&mut f, client, &transport).await;
        assert!(!flash.is_error(), "{}", flash.text);
        let id = flash
            .text
            .trim_start_matches("Request received! Ref #")
            .trim_end_matches('.')
            .parse()
            .unwrap();
        ids.push(id);
    }
    ids
}

#[test_log::test(tokio::test)]
async fn submit_plain_and_with_media() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let transport = transport();

    let mut plain = form("Ana", "206-555-0100");
    let flash = submit(&mut plain, &client, &transport).await;
    assert_eq!(flash.text, "Request received! Ref #1.");
    assert_eq!(plain.fields, NewContact::default());

    let mut with_photo = form("Ben", "206-555-0101");
    with_photo.attachment = Some(Attachment::new("bins.jpg", "image/jpeg", b"jpegbytes".to_vec()));
    let flash = submit(&mut with_photo, &client, &transport).await;
    assert_eq!(flash.text, "Request received! Ref #2.");
    assert!(with_photo.attachment.is_none());

    let response = transport.execute(client.build_get_contact(2)).await.unwrap();
    let saved = client.parse_get_contact(response).unwrap();
    let media = saved.media(client.base_url()).unwrap();
    assert_eq!(media, MediaRef::Image(format!("{base}/uploads/2/image/bins.jpg")));

    let bytes = reqwest::get(media.url()).await.unwrap().bytes().await.unwrap();
    assert_eq!(&bytes[..], b"jpegbytes");
}

#[test_log::test(tokio::test)]
async fn invalid_form_sends_nothing() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let scripted = Scripted::new();

    let mut missing = form("Ana", "");
    let before = missing.fields.clone();
    let flash = submit(&mut missing, &client, &scripted).await;
    assert_eq!(flash.text, "Name, email, phone, and address are required.");
    assert_eq!(missing.fields, before);

    let mut bad_file = form("Ana", "206-555-0100");
    bad_file.attachment = Some(Attachment::new("notes.pdf", "application/pdf", vec![1]));
    let flash = submit(&mut bad_file, &client, &scripted).await;
    assert_eq!(flash.text, "Please upload an image or a video file.");
    assert!(bad_file.attachment.is_some());

    assert_eq!(scripted.calls(), 0);
}

#[test_log::test(tokio::test)]
async fn unreachable_server_keeps_form() {
    // Nothing listens on this port once the listener is dropped.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = ContactsClient::new(&base);
    let mut f = form("Ana", "206-555-0100");
    let before = f.fields.clone();
    let flash = submit(&mut f, &client, &transport()).await;
    assert!(flash.is_error());
    assert!(flash.text.starts_with("network error"), "{}", flash.text);
    assert_eq!(f.fields, before);
}

#[test_log::test(tokio::test)]
async fn unresponsive_server_times_out() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = ContactsClient::new(&base);
    let transport = ReqwestTransport::new(Duration::from_millis(200));
    let err = transport
        .execute(client.build_get_contact(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout(d) if d == Duration::from_millis(200)));

    let mut view = AdminView::new(client, 10, transport);
    view.load();
    view.settle().await;
    let flash = view.with_state(|s| s.flash().cloned()).unwrap();
    assert!(flash.is_error());
    assert_eq!(flash.text, "request timed out after 200ms");
    assert!(!view.with_state(|s| s.busy()));
}

#[test_log::test(tokio::test)]
async fn listing_pages_and_filters() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let ids = seed(&client, 11).await;

    let mut view = AdminView::new(client, 10, transport());
    view.load();
    view.settle().await;
    view.with_state(|s| {
        let listing = s.listing();
        assert_eq!(listing.data().content.len(), 10);
        assert_eq!(listing.data().content[0].id, ids[10]);
        let pager = listing.pagination();
        assert_eq!(pager.label(), "Page 1 of 2");
        assert!(!pager.prev_enabled);
        assert!(pager.next_enabled);
    });

    assert!(view.next_page());
    view.settle().await;
    view.with_state(|s| {
        assert_eq!(s.listing().data().content.len(), 1);
        assert_eq!(s.listing().data().content[0].id, ids[0]);
        assert!(!s.listing().pagination().next_enabled);
    });

    assert!(view.set_status(Status::Done));
    assert!(view.set_mode(Mode::ByStatus));
    view.settle().await;
    view.with_state(|s| {
        assert_eq!(s.listing().page(), 0);
        assert!(s.listing().data().content.is_empty());
    });
}

#[test_log::test(tokio::test)]
async fn slow_stale_page_never_replaces_newer_filter() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    seed(&client, 11).await;

    let scripted = Scripted::new().slow("page=1", Duration::from_millis(300));
    let mut view = AdminView::new(client, 10, scripted);
    assert!(view.goto_page(1));
    assert!(view.set_mode(Mode::NotDone));
    view.settle().await;

    // Give the abandoned page-1 fetch time to finish if it were still alive.
    tokio::time::sleep(Duration::from_millis(500)).await;
    view.with_state(|s| {
        assert_eq!(s.listing().mode(), Mode::NotDone);
        assert_eq!(s.listing().page(), 0);
        assert_eq!(s.listing().data().number, 0);
        assert_eq!(s.listing().data().content.len(), 10);
        assert!(!s.listing().busy());
    });
}

#[test_log::test(tokio::test)]
async fn blank_phone_lookup_sends_nothing() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let scripted = Scripted::new();
    let calls = scripted.calls.clone();

    let mut view = AdminView::new(client, 10, scripted);
    assert!(view.apply_filter(Mode::ByPhone, None, Some("   ")));
    view.settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    view.with_state(|s| {
        assert!(s.listing().data().content.is_empty());
        assert!(!s.listing().pagination().visible);
    });
}

#[test_log::test(tokio::test)]
async fn toggle_refetches_the_same_page() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let ids = seed(&client, 11).await;

    let mut view = AdminView::new(client, 10, transport());
    assert!(view.goto_page(1));
    view.settle().await;

    view.toggle(ids[0]).await;
    view.settle().await;
    view.with_state(|s| {
        assert_eq!(
            s.flash().unwrap().text,
            format!("Status set to PENDING (#{})", ids[0])
        );
        assert_eq!(s.listing().page(), 1);
        let row = &s.listing().data().content[0];
        assert_eq!(row.id, ids[0]);
        assert_eq!(row.status, Status::Pending);
    });
}

#[test_log::test(tokio::test)]
async fn declined_delete_sends_nothing() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let ids = seed(&client, 1).await;

    let scripted = Scripted::new();
    let calls = scripted.calls.clone();
    let mut view = AdminView::new(client, 10, scripted);

    let mut asked = Vec::new();
    let mut decline = |prompt: &str| {
        asked.push(prompt.to_string());
        false
    };
    assert!(!view.delete(ids[0], &mut decline).await);
    assert_eq!(asked, vec![format!("Delete request #{}? This cannot be undone.", ids[0])]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(view.delete(ids[0], &mut |_: &str| true).await);
    view.settle().await;
    view.with_state(|s| {
        assert_eq!(s.flash().unwrap().text, format!("Deleted #{}", ids[0]));
        assert!(s.listing().data().content.is_empty());
    });

    view.view(ids[0]).await;
    view.with_state(|s| {
        let flash = s.flash().unwrap();
        assert!(flash.is_error());
        assert_eq!(flash.text, format!("Contact not found: {}", ids[0]));
        assert!(s.detail().is_none());
    });
}

#[test_log::test(tokio::test)]
async fn upload_attaches_video_to_existing_request() {
    let base = start_server().await;
    let client = ContactsClient::new(&base);
    let ids = seed(&client, 1).await;

    let mut view = AdminView::new(client, 10, transport());
    view.view(ids[0]).await;
    assert!(view.with_state(|s| s.detail_media().is_none()));

    let clip = Attachment::new("clip.mp4", "video/mp4", b"mp4bytes".to_vec());
    view.upload(ids[0], &clip).await;
    view.settle().await;
    view.with_state(|s| {
        assert_eq!(s.flash().unwrap().text, format!("Media attached to #{}", ids[0]));
        assert_eq!(
            s.detail_media(),
            Some(MediaRef::Video(format!("{base}/uploads/{}/video/clip.mp4", ids[0])))
        );
    });
}
