//! Domain model types returned by the persistence layer

use serde::{Deserialize, Serialize};

use crate::entity::{organisations, projects, users};

pub use crate::entity::sea_orm_active_enums::{OAuthProvider, UrlType};

/// A page of results
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_count: u64,
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total_count: u64, page_number: u64, page_size: u64, page_items: Vec<T>) -> Self {
        Self {
            total_count,
            page_number,
            pages_available: if page_size > 0 {
                total_count.div_ceil(page_size)
            } else {
                0
            },
            page_items,
        }
    }

    pub fn empty(page_number: u64) -> Self {
        Self {
            total_count: 0,
            page_number,
            pages_available: 0,
            page_items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_items.is_empty()
    }
}

/// Row offset of the first item on a 1-based page
///
/// `None` when the offset does not fit a signed 64-bit SQL `OFFSET`; no such
/// page can hold any rows.
pub fn page_offset(page_number: u64, page_size: u64) -> Option<u64> {
    page_number
        .saturating_sub(1)
        .checked_mul(page_size)
        .filter(|offset| *offset <= i64::MAX as u64)
}

/// A project together with its organisation, if any
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(rename = "projID")]
    pub proj_id: i32,
    #[serde(rename = "orgID")]
    pub org_id: Option<i32>,
    pub name: String,
    pub desc: Option<String>,
    pub homepage: Option<String>,
    pub logo: bool,
    pub org_name: Option<String>,
}

impl ProjectInfo {
    pub fn from_models(project: projects::Model, org: Option<organisations::Model>) -> Self {
        Self {
            proj_id: project.proj_id,
            org_id: project.org_id,
            name: project.name,
            desc: project.desc,
            homepage: project.homepage,
            logo: project.logo,
            org_name: org.map(|o| o.name),
        }
    }
}

/// An organisation backing projects
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationInfo {
    #[serde(rename = "orgID")]
    pub org_id: i32,
    pub name: String,
    pub desc: Option<String>,
    pub logo: bool,
}

impl From<organisations::Model> for OrganisationInfo {
    fn from(value: organisations::Model) -> Self {
        Self {
            org_id: value.org_id,
            name: value.name,
            desc: value.desc,
            logo: value.logo,
        }
    }
}

/// Validated field values for creating or updating a project
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub org_id: Option<i32>,
    pub name: String,
    pub desc: Option<String>,
    pub homepage: Option<String>,
}

/// Validated field values for creating or updating an organisation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrganisationDraft {
    pub name: String,
    pub desc: Option<String>,
}

/// A user, as seen through one of their sessions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(rename = "userID")]
    pub user_id: i32,
    pub provider: Option<OAuthProvider>,
    #[serde(rename = "providerUserID")]
    pub provider_user_id: Option<String>,
    pub joined: chrono::NaiveDateTime,
}

impl From<users::Model> for UserInfo {
    fn from(value: users::Model) -> Self {
        Self {
            user_id: value.user_id,
            provider: value.provider,
            provider_user_id: value.provider_user_id,
            joined: value.joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(21, 2, 10, vec![1, 2, 3]);
        assert_eq!(page.total_count, 21);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.pages_available, 3);
        assert!(!page.is_empty());

        let page: Page<i32> = Page::new(5, 1, 0, vec![]);
        assert_eq!(page.pages_available, 0);
    }

    #[test]
    fn test_page_empty() {
        let page: Page<ProjectInfo> = Page::empty(1);
        assert_eq!(page.page_number, 1);
        assert!(page.is_empty());
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), Some(0));
        assert_eq!(page_offset(3, 10), Some(20));
        assert_eq!(page_offset(0, 10), Some(0));
        assert_eq!(page_offset(i64::MAX as u64, 1), Some(i64::MAX as u64 - 1));
        assert_eq!(page_offset(i64::MAX as u64, 10), None);
        assert_eq!(page_offset(u64::MAX, 2), None);
    }

    #[test]
    fn test_project_info_from_models() {
        let project = projects::Model {
            proj_id: 7,
            org_id: Some(2),
            name: "Emacs".to_string(),
            desc: Some("An extensible text editor".to_string()),
            homepage: Some("https://www.gnu.org/software/emacs/".to_string()),
            logo: true,
        };
        let org = organisations::Model {
            org_id: 2,
            name: "GNU".to_string(),
            desc: None,
            logo: false,
        };

        let info = ProjectInfo::from_models(project, Some(org));
        assert_eq!(info.proj_id, 7);
        assert_eq!(info.org_name.as_deref(), Some("GNU"));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["projID"], 7);
        assert_eq!(json["orgID"], 2);
        assert_eq!(json["orgName"], "GNU");
    }
}
