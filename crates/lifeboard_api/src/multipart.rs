//! Parsed multipart form handed over by the HTTP layer.

use lifeboard_core::storage::UploadRequest;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One form part. File parts carry a `file_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file part.
    pub fn with_file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data,
        });
        self
    }

    /// Appends a plain text field.
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: value.into().into_bytes(),
        });
        self
    }

    /// First part named `name`.
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Text value of a non-file field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.part(name)
            .filter(|part| part.file_name.is_none())
            .and_then(|part| String::from_utf8(part.data.clone()).ok())
    }

    /// Turns the file part named `name` into an upload; `None` when it is
    /// missing or not a file.
    pub fn take_upload(&mut self, name: &str) -> Option<UploadRequest> {
        let idx = self
            .parts
            .iter()
            .position(|part| part.name == name && part.file_name.is_some())?;
        let part = self.parts.remove(idx);
        Some(UploadRequest {
            file_name: part.file_name.unwrap_or_default(),
            content_type: part
                .content_type
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            data: part.data,
        })
    }
}
