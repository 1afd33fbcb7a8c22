//! Upload and assistant endpoints.

use crate::api::{Api, RequestContext};
use crate::multipart::MultipartForm;
use crate::response::{ApiFailure, ApiResponse, CREATED, OK};
use lifeboard_core::assistant::{ChatReply, ChatRequest};
use lifeboard_core::storage::{record_upload, StoredFile};
use log::warn;

/// Form part carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

impl Api {
    /// Stores the `file` part of `form` and returns its public URL.
    pub fn upload(&self, ctx: &RequestContext, mut form: MultipartForm) -> ApiResponse<StoredFile> {
        self.handle("upload", ctx, CREATED, |user_id| {
            let request = form
                .take_upload(UPLOAD_FIELD)
                .ok_or_else(|| ApiFailure::bad_request(UPLOAD_FIELD, "a file part is required"))?;
            let stored = self.files.store(user_id, &request)?;
            if let Err(err) = record_upload(&self.connection(), user_id, &stored) {
                if let Err(remove_err) = self.files.remove(&stored) {
                    warn!("event=upload_rollback module=api status=error error={remove_err}");
                }
                return Err(err.into());
            }
            Ok(stored)
        })
    }

    /// Forwards a conversation to the configured assistant.
    pub fn chat(&self, ctx: &RequestContext, request: ChatRequest) -> ApiResponse<ChatReply> {
        self.handle("chat", ctx, OK, |_user_id| Ok(self.assistant.complete(&request)?))
    }
}
