//! Lead-capture form: validation, encoding choice, and post-submit state.
//!
//! Validation here is advisory; the backend is authoritative. It exists so
//! obviously incomplete forms and oversized uploads never leave the client.

use crate::client::ContactsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Contact, NewContact};

/// Largest accepted upload: 50 MiB.
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

pub const MISSING_FIELDS: &str = "Name, email, phone, and address are required.";
pub const UNSUPPORTED_MEDIA: &str = "Please upload an image or a video file.";
pub const MEDIA_TOO_LARGE: &str = "File is too large (limit 50MB).";

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_image(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.content_type.to_ascii_lowercase().starts_with("video/")
    }

    /// Reject anything that is not an image or video, or that exceeds the size cap.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.is_image() && !self.is_video() {
            return Err(ApiError::Validation(UNSUPPORTED_MEDIA.to_string()));
        }
        if self.size() > MAX_MEDIA_BYTES {
            return Err(ApiError::Validation(MEDIA_TOO_LARGE.to_string()));
        }
        Ok(())
    }
}

/// Kind of banner shown after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A dismissible success or error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }
}

/// Editable state of the request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub fields: NewContact,
    pub attachment: Option<Attachment>,
    pub busy: bool,
    pub message: Option<Flash>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let f = &self.fields;
        let required = [&f.name, &f.email, &f.phone_number, &f.address];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
        }
        if let Some(attachment) = &self.attachment {
            attachment.validate()?;
        }
        Ok(())
    }

    /// Validate and encode the form. Plain JSON without media, multipart with it.
    pub fn build_request(&self, client: &ContactsClient) -> Result<HttpRequest, ApiError> {
        self.validate()?;
        match &self.attachment {
            None => client.build_create_contact(&self.fields),
            Some(media) => client.build_create_contact_with_media(&self.fields, media),
        }
    }

    /// Start a submission: clears the previous message and builds the request.
    ///
    /// A validation failure is recorded as the form's message and returned;
    /// the fields are left as typed.
    pub fn begin(&mut self, client: &ContactsClient) -> Result<HttpRequest, ApiError> {
        self.message = None;
        match self.build_request(client) {
            Ok(request) => {
                self.busy = true;
                Ok(request)
            }
            Err(err) => {
                self.message = Some(Flash::error(err.message_or("Failed to submit.")));
                Err(err)
            }
        }
    }

    /// Record the outcome. Success resets fields and attachment; failure keeps them.
    pub fn finish(&mut self, result: Result<Contact, ApiError>) -> Flash {
        self.busy = false;
        let flash = match result {
            Ok(saved) => {
                self.fields = NewContact::default();
                self.attachment = None;
                Flash::success(confirmation(&saved))
            }
            Err(err) => Flash::error(err.message_or("Failed to submit.")),
        };
        self.message = Some(flash.clone());
        flash
    }
}

/// Human-readable receipt for a created request.
pub fn confirmation(saved: &Contact) -> String {
    format!("Request received! Ref #{}.", saved.id)
}
