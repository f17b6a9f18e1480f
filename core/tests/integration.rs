//! Admin workflow test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the core client,
//! the listing aggregator and the admin state over real HTTP using ureq.
//! Validates that request building and response parsing agree with the
//! server's schema end-to-end.

use trashclean_core::{
    AdminState, ContactForm, ContactsClient, HttpMethod, HttpRequest, HttpResponse, Mode,
    NewContact, PageRequest, RequestBody, Status, Work,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let body = match req.body {
        Some(RequestBody::Json(text)) => Some(text),
        Some(RequestBody::Multipart(_)) => panic!("multipart is exercised by the admin crate"),
        None => None,
    };

    let mut response = match (req.method, body) {
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.url).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status();
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status: status.as_u16(),
        reason,
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn submit(client: &ContactsClient, name: &str, phone: &str) -> i64 {
    let mut form = ContactForm::new();
    form.fields = NewContact {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone_number: phone.to_string(),
        address: "123 Main".to_string(),
        description: "two bins".to_string(),
    };
    let req = form.begin(client).unwrap();
    let result = client.parse_create_contact(execute(req));
    let id = result.as_ref().map(|c| c.id).unwrap();
    let flash = form.finish(result);
    assert_eq!(flash.text, format!("Request received! Ref #{id}."));
    assert_eq!(form.fields, NewContact::default());
    id
}

/// Run a fetch plan to completion.
fn run_plan(state: &mut AdminState, plan: trashclean_core::FetchPlan) {
    let applied = match plan.work {
        Work::Request(req) => state.finish_fetch(plan.ticket, Ok(execute(req))),
        Work::Ready(outcome) => state.finish_ready(plan.ticket, outcome),
    };
    assert!(applied, "plan should be current");
}

#[test]
fn admin_workflow() {
    let base = start_server();
    let client = ContactsClient::new(&base);

    // Step 1: empty list.
    let page = client
        .parse_page(execute(client.build_list_contacts(&PageRequest::default())))
        .unwrap();
    assert!(page.content.is_empty());

    // Step 2: eleven submissions, one with a distinctive phone.
    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(submit(&client, &format!("Client{i}"), "206-555-0100"));
    }
    let odd_one = submit(&client, "Zed", "425-555-0199");

    // Step 3: paged listing, 11 records over pages of 10.
    let mut admin = AdminState::new(client.clone(), 10);
    let plan = admin.listing_mut().refresh();
    run_plan(&mut admin, plan);
    assert_eq!(admin.listing().data().content.len(), 10);
    assert_eq!(admin.listing().data().content[0].id, odd_one);
    let pager = admin.listing().pagination();
    assert_eq!(pager.label(), "Page 1 of 2");
    assert!(pager.next_enabled);

    let plan = admin.listing_mut().next_page().unwrap();
    run_plan(&mut admin, plan);
    assert_eq!(admin.listing().data().content.len(), 1);
    assert!(!admin.listing().pagination().next_enabled);

    // Step 4: phone lookup, repeated, yields the same set.
    let plan = admin
        .listing_mut()
        .apply_filter(Mode::ByPhone, None, Some("425-555-0199"))
        .unwrap();
    assert_eq!(admin.listing().page(), 0);
    run_plan(&mut admin, plan);
    let first = admin.listing().data().clone();
    let plan = admin.listing_mut().refresh();
    run_plan(&mut admin, plan);
    assert_eq!(admin.listing().data(), &first);
    assert_eq!(first.content.len(), 1);
    assert_eq!(first.content[0].id, odd_one);

    // Step 5: toggle status, list by status reflects it.
    let req = admin.begin_toggle(ids[0]);
    let plan = admin.finish_toggle(Ok(execute(req))).unwrap();
    assert_eq!(
        admin.flash().unwrap().text,
        format!("Status set to PENDING (#{})", ids[0])
    );
    run_plan(&mut admin, plan);

    let plan = admin
        .listing_mut()
        .apply_filter(Mode::ByStatus, Some(Status::Pending), None)
        .unwrap();
    run_plan(&mut admin, plan);
    let pending: Vec<i64> = admin.listing().data().content.iter().map(|c| c.id).collect();
    assert_eq!(pending, vec![ids[0]]);

    // Step 6: view detail.
    let req = admin.begin_view(ids[0]);
    admin.finish_view(Ok(execute(req)));
    let detail = admin.detail().unwrap();
    assert_eq!(detail.description.as_deref(), Some("two bins"));
    assert!(detail.created_at.is_some());
    assert!(admin.detail_media().is_none());

    // Step 7: delete, then the detail is gone and the lookup 404s.
    let req = admin.begin_delete(ids[0]);
    let plan = admin.finish_delete(ids[0], Ok(execute(req))).unwrap();
    assert!(admin.detail().is_none());
    run_plan(&mut admin, plan);
    assert!(admin.listing().data().content.is_empty());

    let err = client
        .parse_get_contact(execute(client.build_get_contact(ids[0])))
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), format!("Contact not found: {}", ids[0]));

    // Step 8: deleting again reports the server's message.
    let req = admin.begin_delete(ids[0]);
    assert!(admin.finish_delete(ids[0], Ok(execute(req))).is_none());
    assert!(admin.flash().unwrap().is_error());

    // Step 9: not-done excludes nothing now that the only PENDING record is gone.
    let plan = admin.listing_mut().set_mode(Mode::NotDone).unwrap();
    run_plan(&mut admin, plan);
    assert_eq!(admin.listing().data().total_elements, Some(10));
}
