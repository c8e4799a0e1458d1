use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use std::collections::HashMap;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// A fully buffered multipart form: parts sent with a filename are files,
/// everything else is text.
#[derive(Debug, Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut payload: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(mut field) = payload.try_next().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                data.extend_from_slice(&chunk?);
            }

            if file_name.is_some() {
                form.files.insert(name, UploadedFile { file_name, data });
            } else {
                let value = String::from_utf8(data)
                    .map_err(|_| ApiError::BadRequest(format!("Field {} is not valid UTF-8", name)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The named file, unless it was sent empty (browsers send an empty part
    /// for an untouched file input).
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|file| !file.data.is_empty())
    }

    /// The named text field, trimmed; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.text(name)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}
