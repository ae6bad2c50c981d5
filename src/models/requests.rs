//! Request DTOs for the page server API
//!
//! Collects multipart upload fields and validates them before anything is
//! written to the store.

use axum::{body::Bytes, extract::Multipart, http::StatusCode};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::store::Retention;

/// Retention used by `/api/upload` when no expiration field is sent
pub const DEFAULT_API_EXPIRATION_DAYS: i64 = 7;

/// Selector used by `/upload` when no expiration field is sent
pub const DEFAULT_EXPIRATION_SELECTOR: &str = "7";

/// Content that passed validation and is ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub content: String,
    pub retention: Retention,
}

/// Multipart fields of an upload request.
///
/// Shared by the browser form (`POST /upload`) and the API
/// (`POST /api/upload`); each endpoint validates it differently.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Pasted HTML from the `html_content` field
    pub html_content: Option<String>,
    /// Bytes of the `html_file` field, when it carried a file name
    pub html_file: Option<Bytes>,
    /// Raw `expiration` field
    pub expiration: Option<String>,
}

impl UploadRequest {
    /// Reads the known fields out of a multipart body; unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut req = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            let has_file_name = field.file_name().is_some_and(|f| !f.is_empty());

            match name.as_str() {
                "html_file" if has_file_name => {
                    req.html_file = Some(field.bytes().await.map_err(multipart_error)?);
                }
                "html_content" => {
                    req.html_content = Some(field.text().await.map_err(multipart_error)?);
                }
                "expiration" => {
                    req.expiration = Some(field.text().await.map_err(multipart_error)?);
                }
                _ => {}
            }
        }

        Ok(req)
    }

    /// Validates a browser form upload.
    ///
    /// A named file wins over pasted text. The expiration must be one of the
    /// configured selectors.
    pub fn validate_form(self, config: &Config) -> Result<ValidatedUpload> {
        let content = if let Some(file) = self.html_file {
            check_size(file.len(), config, "File")?;
            decode_utf8(file)?
        } else if let Some(text) = self.html_content.filter(|t| !t.is_empty()) {
            check_size(text.len(), config, "Content")?;
            text
        } else {
            String::new()
        };

        if content.trim().is_empty() {
            return Err(AppError::Validation("No HTML content provided".to_string()));
        }

        let selector = self
            .expiration
            .unwrap_or_else(|| DEFAULT_EXPIRATION_SELECTOR.to_string());
        let retention = config
            .retention_options
            .resolve(&selector)
            .ok_or_else(|| AppError::Validation("Invalid expiration option".to_string()))?;

        Ok(ValidatedUpload { content, retention })
    }

    /// Validates an API upload.
    ///
    /// Only a file is accepted. The expiration is a day count where zero or
    /// less means indefinite.
    pub fn validate_api(self, config: &Config) -> Result<ValidatedUpload> {
        let file = self
            .html_file
            .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

        check_size(file.len(), config, "File")?;
        let content = decode_utf8(file)?;

        if content.trim().is_empty() {
            return Err(AppError::Validation("Empty file".to_string()));
        }

        let days = match self.expiration.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_API_EXPIRATION_DAYS,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::Validation("Invalid expiration option".to_string()))?,
        };

        Ok(ValidatedUpload {
            content,
            retention: Retention::from_days(days),
        })
    }
}

fn check_size(len: usize, config: &Config, what: &str) -> Result<()> {
    if len > config.max_upload_size {
        return Err(AppError::TooLarge(format!(
            "{} too large. Maximum size is {:.1}MB",
            what,
            config.max_upload_size_mb()
        )));
    }
    Ok(())
}

fn decode_utf8(bytes: Bytes) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::Validation("File must be valid UTF-8 text".to_string()))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        Config {
            max_upload_size: 16,
            ..Config::default()
        }
    }

    fn form(content: &str, expiration: Option<&str>) -> UploadRequest {
        UploadRequest {
            html_content: Some(content.to_string()),
            html_file: None,
            expiration: expiration.map(str::to_string),
        }
    }

    fn api(file: &[u8], expiration: Option<&str>) -> UploadRequest {
        UploadRequest {
            html_content: None,
            html_file: Some(Bytes::copy_from_slice(file)),
            expiration: expiration.map(str::to_string),
        }
    }

    #[test]
    fn test_form_defaults_to_seven_days() {
        let upload = form("<h1>hi</h1>", None)
            .validate_form(&Config::default())
            .unwrap();
        assert_eq!(upload.content, "<h1>hi</h1>");
        assert_eq!(upload.retention, Retention::from_days(7));
    }

    #[test]
    fn test_form_indefinite_selector() {
        let upload = form("<h1>hi</h1>", Some("0"))
            .validate_form(&Config::default())
            .unwrap();
        assert_eq!(upload.retention, Retention::Indefinite);
    }

    #[test]
    fn test_form_rejects_unknown_selector() {
        let result = form("<h1>hi</h1>", Some("2")).validate_form(&Config::default());
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Invalid expiration option"));
    }

    #[test]
    fn test_form_rejects_blank_content() {
        let result = form("   \n\t", Some("1")).validate_form(&Config::default());
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "No HTML content provided"));

        let result = UploadRequest::default().validate_form(&Config::default());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_form_rejects_oversized_content() {
        let result = form(&"x".repeat(17), Some("1")).validate_form(&small_config());
        assert!(matches!(result, Err(AppError::TooLarge(msg)) if msg.starts_with("Content too large")));

        // Exactly at the limit is accepted
        assert!(form(&"x".repeat(16), Some("1"))
            .validate_form(&small_config())
            .is_ok());
    }

    #[test]
    fn test_form_size_counts_bytes_not_chars() {
        // 6 characters, 18 bytes
        let result = form("✓✓✓✓✓✓", Some("1")).validate_form(&small_config());
        assert!(matches!(result, Err(AppError::TooLarge(_))));
    }

    #[test]
    fn test_form_prefers_file_over_text() {
        let req = UploadRequest {
            html_content: Some("<p>text</p>".to_string()),
            html_file: Some(Bytes::from_static(b"<p>file</p>")),
            expiration: Some("30".to_string()),
        };
        let upload = req.validate_form(&Config::default()).unwrap();
        assert_eq!(upload.content, "<p>file</p>");
        assert_eq!(upload.retention, Retention::from_days(30));
    }

    #[test]
    fn test_form_rejects_invalid_utf8_file() {
        let req = UploadRequest {
            html_file: Some(Bytes::from_static(&[0xff, 0xfe, 0x00])),
            ..UploadRequest::default()
        };
        let result = req.validate_form(&Config::default());
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("UTF-8")));
    }

    #[test]
    fn test_api_requires_file() {
        let result = form("<p>x</p>", None).validate_api(&Config::default());
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "No file provided"));
    }

    #[test]
    fn test_api_expiration_days() {
        let config = Config::default();

        let upload = api(b"<p>x</p>", None).validate_api(&config).unwrap();
        assert_eq!(upload.retention, Retention::from_days(7));

        let upload = api(b"<p>x</p>", Some("3")).validate_api(&config).unwrap();
        assert_eq!(upload.retention, Retention::from_days(3));

        let upload = api(b"<p>x</p>", Some("-5")).validate_api(&config).unwrap();
        assert_eq!(upload.retention, Retention::Indefinite);

        assert!(api(b"<p>x</p>", Some("soon")).validate_api(&config).is_err());
    }

    #[test]
    fn test_api_rejects_empty_and_oversized_files() {
        let result = api(b"  \n", None).validate_api(&small_config());
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Empty file"));

        let result = api(&[b'x'; 17], None).validate_api(&small_config());
        assert!(matches!(result, Err(AppError::TooLarge(msg)) if msg.starts_with("File too large")));
    }
}
