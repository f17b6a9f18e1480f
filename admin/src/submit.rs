//! Lead-form submission over a transport.

use std::io;
use std::path::Path;

use trashclean_core::{Attachment, ContactForm, ContactsClient, Flash};

use crate::transport::HttpTransport;

/// Validate, send and record one submission. The returned flash is also
/// stored as the form's message.
pub async fn submit<T: HttpTransport>(
    form: &mut ContactForm,
    client: &ContactsClient,
    transport: &T,
) -> Flash {
    let request = match form.begin(client) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "submission rejected before sending");
            return form
                .message
                .clone()
                .unwrap_or_else(|| Flash::error(err.message_or("Failed to submit.")));
        }
    };
    let result = transport
        .execute(request)
        .await
        .and_then(|response| client.parse_create_contact(response));
    if let Ok(saved) = &result {
        tracing::info!(id = saved.id, "request submitted");
    }
    form.finish(result)
}

/// Read a file into an [`Attachment`], guessing its content type from the
/// extension.
pub async fn attachment_from_path(path: &Path) -> io::Result<Attachment> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(Attachment::new(file_name, content_type.essence_str(), data))
}
