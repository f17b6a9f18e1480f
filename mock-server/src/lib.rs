use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Uploads above this size are rejected by the body limit layer.
pub const MAX_UPLOAD_BYTES: usize = 60 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Open,
    Pending,
    Done,
}

impl Status {
    fn next(self) -> Self {
        match self {
            Status::Open => Status::Pending,
            Status::Pending => Status::Done,
            Status::Done => Status::Open,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    pub description: Option<String>,
    pub status: Option<Status>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub number: u32,
    pub size: u32,
}

struct StoredMedia {
    content_type: String,
    data: Bytes,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    contacts: BTreeMap<i64, Contact>,
    media: HashMap<String, StoredMedia>,
}

pub type Db = Arc<RwLock<Store>>;

type HandlerError = (StatusCode, String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route("/api/contacts/with-media", post(create_with_media))
        .route("/api/contacts/status/not-done", get(list_not_done))
        .route("/api/contacts/status/{status}", get(list_by_status))
        .route("/api/contacts/phone/{phone}", get(find_by_phone))
        .route("/api/contacts/{id}", get(get_contact).delete(delete_contact))
        .route("/api/contacts/{id}/status", put(toggle_status))
        .route("/api/contacts/{id}/image", post(upload_image))
        .route("/api/contacts/{id}/video", post(upload_video))
        .route("/uploads/{*key}", get(get_media))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(id: i64) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("Contact not found: {id}"))
}

fn bad_request(msg: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, msg.into())
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

impl Store {
    fn insert(&mut self, input: CreateContact) -> Result<Contact, HandlerError> {
        let required = [&input.name, &input.email, &input.phone_number, &input.address];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(bad_request(
                "name, email, phoneNumber and address are required",
            ));
        }
        self.next_id += 1;
        // Strictly increasing timestamps keep createdAt ordering deterministic.
        let created_at = Utc::now().naive_utc() + Duration::milliseconds(self.next_id);
        let contact = Contact {
            id: self.next_id,
            name: input.name,
            email: input.email,
            phone_number: input.phone_number,
            address: input.address,
            description: input.description.filter(|d| !d.trim().is_empty()),
            status: input.status.unwrap_or_default(),
            image: None,
            video: None,
            created_at,
        };
        self.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    fn attach(
        &mut self,
        id: i64,
        kind: &str,
        file_name: &str,
        content_type: String,
        data: Bytes,
    ) -> Result<Contact, HandlerError> {
        let contact = self.contacts.get_mut(&id).ok_or_else(|| not_found(id))?;
        let file_name = file_name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or("upload");
        let key = format!("uploads/{id}/{kind}/{file_name}");
        if kind == "video" {
            contact.video = Some(key.clone());
        } else {
            contact.image = Some(key.clone());
        }
        let contact = contact.clone();
        self.media.insert(key, StoredMedia { content_type, data });
        Ok(contact)
    }

    fn page(&self, filter: impl Fn(&Contact) -> bool, params: &PageParams) -> Page<Contact> {
        let mut matched: Vec<Contact> = self.contacts.values().filter(|c| filter(c)).cloned().collect();
        match params.sort_by.as_deref().unwrap_or("createdAt") {
            "id" => matched.sort_by_key(|c| c.id),
            "name" => matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            _ => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))),
        }
        if !params
            .direction
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("ASC"))
        {
            matched.reverse();
        }

        let size = params.size.unwrap_or(10).max(1);
        let number = params.page.unwrap_or(0);
        let total_elements = matched.len() as u64;
        let total_pages = total_elements.div_ceil(u64::from(size)) as u32;
        let content = matched
            .into_iter()
            .skip(number as usize * size as usize)
            .take(size as usize)
            .collect();
        Page {
            content,
            total_pages,
            total_elements,
            number,
            size,
        }
    }
}

async fn list_contacts(State(db): State<Db>, Query(params): Query<PageParams>) -> Json<Page<Contact>> {
    Json(db.read().await.page(|_| true, &params))
}

async fn list_not_done(State(db): State<Db>, Query(params): Query<PageParams>) -> Json<Page<Contact>> {
    Json(db.read().await.page(|c| c.status != Status::Done, &params))
}

async fn list_by_status(
    State(db): State<Db>,
    Path(status): Path<Status>,
    Query(params): Query<PageParams>,
) -> Json<Page<Contact>> {
    Json(db.read().await.page(|c| c.status == status, &params))
}

async fn find_by_phone(State(db): State<Db>, Path(phone): Path<String>) -> Json<Vec<Contact>> {
    let store = db.read().await;
    let wanted = digits(&phone);
    let found = store
        .contacts
        .values()
        .filter(|c| {
            c.phone_number.contains(phone.trim())
                || (!wanted.is_empty() && digits(&c.phone_number).contains(&wanted))
        })
        .cloned()
        .collect();
    Json(found)
}

async fn create_contact(
    State(db): State<Db>,
    Json(input): Json<CreateContact>,
) -> Result<(StatusCode, Json<Contact>), HandlerError> {
    let contact = db.write().await.insert(input)?;
    tracing::info!(id = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

struct Upload {
    kind: String,
    file_name: String,
    content_type: String,
    data: Bytes,
}

async fn read_upload(field: axum::extract::multipart::Field<'_>, kind: &str) -> Result<Upload, HandlerError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
    Ok(Upload {
        kind: kind.to_string(),
        file_name,
        content_type,
        data,
    })
}

async fn create_with_media(
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Contact>), HandlerError> {
    let mut input: Option<CreateContact> = None;
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| bad_request(e.to_string()))? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("data") => {
                let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
                input = Some(serde_json::from_slice(&bytes).map_err(|e| bad_request(e.to_string()))?);
            }
            Some(kind @ ("image" | "video")) => {
                uploads.push(read_upload(field, kind).await?);
            }
            _ => {}
        }
    }
    let input = input.ok_or_else(|| bad_request("missing 'data' part"))?;

    let mut store = db.write().await;
    let mut contact = store.insert(input)?;
    for upload in uploads {
        contact = store.attach(
            contact.id,
            &upload.kind,
            &upload.file_name,
            upload.content_type,
            upload.data,
        )?;
    }
    tracing::info!(id = contact.id, "contact created with media");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn upload(db: Db, id: i64, kind: &str, mut multipart: Multipart) -> Result<Json<Contact>, HandlerError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| bad_request(e.to_string()))? {
        if field.name() == Some(kind) {
            let upload = read_upload(field, kind).await?;
            let contact = db.write().await.attach(
                id,
                kind,
                &upload.file_name,
                upload.content_type,
                upload.data,
            )?;
            return Ok(Json(contact));
        }
    }
    Err(bad_request(format!("missing '{kind}' part")))
}

async fn upload_image(
    State(db): State<Db>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Contact>, HandlerError> {
    upload(db, id, "image", multipart).await
}

async fn upload_video(
    State(db): State<Db>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Contact>, HandlerError> {
    upload(db, id, "video", multipart).await
}

async fn get_contact(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Contact>, HandlerError> {
    let store = db.read().await;
    store.contacts.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn toggle_status(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Contact>, HandlerError> {
    let mut store = db.write().await;
    let contact = store.contacts.get_mut(&id).ok_or_else(|| not_found(id))?;
    contact.status = contact.status.next();
    tracing::info!(id, status = ?contact.status, "status advanced");
    Ok(Json(contact.clone()))
}

async fn delete_contact(State(db): State<Db>, Path(id): Path<i64>) -> Result<StatusCode, HandlerError> {
    let mut store = db.write().await;
    let contact = store.contacts.remove(&id).ok_or_else(|| not_found(id))?;
    for key in [contact.image, contact.video].into_iter().flatten() {
        store.media.remove(&key);
    }
    tracing::info!(id, "contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_media(State(db): State<Db>, Path(key): Path<String>) -> Response {
    let store = db.read().await;
    match store.media.get(&format!("uploads/{key}")) {
        Some(media) => (
            [(header::CONTENT_TYPE, media.content_type.clone())],
            media.data.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "media not found").into_response(),
    }
}
