//! Record forms
//!
//! Projects and organisations are submitted as `multipart/form-data` so that
//! a logo can be uploaded with the other fields. Text values are trimmed and
//! empty values are treated as absent.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::StreamExt;

use fossfund_common::{
    DESC, DESC_MAX_LEN, DESC_MIN_LEN, FossfundError, HOMEPAGE, LOGO, NAME, NAME_MAX_LEN, ORG_ID,
    REMOVE_LOGO, clean_text, is_http_url, utils::char_length,
};
use fossfund_persistence::{OrganisationDraft, ProjectDraft};

use crate::service::logo::LogoStore;

/// Largest accepted text field
const TEXT_FIELD_LIMIT: usize = 64 * 1024;

/// An uploaded logo image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Submitted fields of a project or organisation form
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    fields: HashMap<String, String>,
    logo: Option<LogoUpload>,
}

fn form_error(e: impl std::fmt::Display) -> FossfundError {
    FossfundError::IllegalArgument(format!("invalid form data: {}", e))
}

impl RecordForm {
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: LogoUpload) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Read a multipart form
    ///
    /// The logo's content type is checked as soon as its first bytes arrive
    /// and reading stops once it exceeds the store's size limit. An empty
    /// file field means no logo was chosen.
    pub async fn read(payload: &mut Multipart, logo_store: &LogoStore) -> anyhow::Result<Self> {
        let mut form = Self::default();

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(form_error)?;
            let Some(name) = field
                .content_disposition()
                .and_then(|cd| cd.get_name())
                .map(str::to_string)
            else {
                continue;
            };

            if name == LOGO {
                let content_type = field.content_type().map(|m| m.to_string());
                let mut data = Vec::new();

                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(form_error)?;
                    if data.is_empty() && !chunk.is_empty() {
                        LogoStore::validate_content_type(content_type.as_deref())?;
                    }
                    data.extend_from_slice(&chunk);
                    logo_store.validate_size(data.len())?;
                }

                form.logo = if data.is_empty() {
                    None
                } else {
                    Some(LogoUpload {
                        content_type: content_type.unwrap_or_default(),
                        data,
                    })
                };
            } else {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(form_error)?;
                    value.extend_from_slice(&chunk);
                    if value.len() > TEXT_FIELD_LIMIT {
                        return Err(form_error(format!("field '{}' is too large", name)).into());
                    }
                }
                let value = String::from_utf8(value).map_err(form_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed value of a field, `None` when missing or empty
    pub fn text(&self, key: &str) -> Option<String> {
        clean_text(self.fields.get(key).map(String::as_str))
    }

    /// Integer value of a field, `None` when missing or empty
    pub fn integer(&self, key: &str) -> Result<Option<i32>, FossfundError> {
        match self.text(key) {
            Some(value) => value
                .parse::<i32>()
                .map(Some)
                .map_err(|_| FossfundError::IllegalArgument(format!("{} must be a number", key))),
            None => Ok(None),
        }
    }

    /// Primary key carried by an edit form
    pub fn record_id(&self, key: &str) -> Result<i32, FossfundError> {
        self.integer(key)?
            .ok_or_else(|| FossfundError::IllegalArgument(format!("{} is required", key)))
    }

    /// Whether the user asked to remove the current logo
    pub fn remove_logo(&self) -> bool {
        self.text(REMOVE_LOGO).is_some()
    }

    pub fn logo(&self) -> Option<&LogoUpload> {
        self.logo.as_ref()
    }

    fn name(&self) -> Result<String, FossfundError> {
        let name = self
            .text(NAME)
            .ok_or_else(|| FossfundError::IllegalArgument("name is required".to_string()))?;

        if char_length(&name) > NAME_MAX_LEN {
            return Err(FossfundError::IllegalArgument(format!(
                "name must be at most {} characters",
                NAME_MAX_LEN
            )));
        }

        Ok(name)
    }

    fn desc(&self) -> Result<Option<String>, FossfundError> {
        let desc = self.text(DESC);

        if let Some(desc) = &desc {
            let len = char_length(desc);
            if !(DESC_MIN_LEN..=DESC_MAX_LEN).contains(&len) {
                return Err(FossfundError::IllegalArgument(format!(
                    "desc must be between {} and {} characters",
                    DESC_MIN_LEN, DESC_MAX_LEN
                )));
            }
        }

        Ok(desc)
    }

    pub fn project_draft(&self) -> Result<ProjectDraft, FossfundError> {
        let homepage = self.text(HOMEPAGE);
        if let Some(homepage) = &homepage
            && !is_http_url(homepage)
        {
            return Err(FossfundError::IllegalArgument(
                "homepage must be an http or https URL".to_string(),
            ));
        }

        Ok(ProjectDraft {
            org_id: self.integer(ORG_ID)?.filter(|id| *id != 0),
            name: self.name()?,
            desc: self.desc()?,
            homepage,
        })
    }

    pub fn organisation_draft(&self) -> Result<OrganisationDraft, FossfundError> {
        Ok(OrganisationDraft {
            name: self.name()?,
            desc: self.desc()?,
        })
    }
}
