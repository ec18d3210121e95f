//! Shared fixtures for the HTTP tests: an in-memory persistence backend and
//! a fully configured application state.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use config::Config;

use fossfund_auth::service::oauth::{OAuthService, OAuthUserInfo};
use fossfund_auth::service::session::SessionService;
use fossfund_common::crypto::CookieSealer;
use fossfund_persistence::model::page_offset;
use fossfund_persistence::{
    OAuthProvider, OrganisationDraft, OrganisationInfo, OrganisationPersistence, Page,
    PersistenceService, ProjectDraft, ProjectInfo, ProjectPersistence, UserInfo, UserPersistence,
};
use fossfund_server::model::{AppState, Configuration};

pub const BOUNDARY: &str = "fossfund-test-boundary";
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
pub const DESC_TEXT: &str = "A free software text editor";

#[derive(Default)]
struct Tables {
    projects: BTreeMap<i32, ProjectInfo>,
    organisations: BTreeMap<i32, OrganisationInfo>,
    users: Vec<UserInfo>,
    sessions: HashMap<String, i32>,
    next_project: i32,
    next_organisation: i32,
}

/// In-memory persistence backend
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Make every following call fail like a lost database connection
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }

    pub fn project(&self, proj_id: i32) -> Option<ProjectInfo> {
        let tables = self.tables.lock().unwrap();
        tables
            .projects
            .get(&proj_id)
            .map(|p| with_org_name(p, &tables.organisations))
    }

    pub fn organisation(&self, org_id: i32) -> Option<OrganisationInfo> {
        self.tables.lock().unwrap().organisations.get(&org_id).cloned()
    }

    pub fn users(&self) -> Vec<UserInfo> {
        self.tables.lock().unwrap().users.clone()
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }
}

fn with_org_name(project: &ProjectInfo, orgs: &BTreeMap<i32, OrganisationInfo>) -> ProjectInfo {
    ProjectInfo {
        org_name: project
            .org_id
            .and_then(|id| orgs.get(&id))
            .map(|o| o.name.clone()),
        ..project.clone()
    }
}

fn page_of<T: Clone>(items: Vec<T>, page_number: u64, page_size: u64) -> Page<T> {
    let total = items.len() as u64;
    let offset = page_offset(page_number, page_size)
        .and_then(|offset| usize::try_from(offset).ok())
        .unwrap_or(usize::MAX);
    let page_items = items
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .collect();
    Page::new(total, page_number, page_size, page_items)
}

#[async_trait]
impl ProjectPersistence for MemoryStore {
    async fn project_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<ProjectInfo>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let items = tables
            .projects
            .values()
            .map(|p| with_org_name(p, &tables.organisations))
            .collect();
        Ok(page_of(items, page_number, page_size))
    }

    async fn project_find_first(&self, limit: u64) -> anyhow::Result<Vec<ProjectInfo>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .projects
            .values()
            .take(limit as usize)
            .map(|p| with_org_name(p, &tables.organisations))
            .collect())
    }

    async fn project_get(&self, proj_id: i32) -> anyhow::Result<Option<ProjectInfo>> {
        self.check()?;
        Ok(self.project(proj_id))
    }

    async fn project_create(&self, draft: &ProjectDraft, logo: bool) -> anyhow::Result<i32> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.next_project += 1;
        let proj_id = tables.next_project;
        tables.projects.insert(
            proj_id,
            ProjectInfo {
                proj_id,
                org_id: draft.org_id,
                name: draft.name.clone(),
                desc: draft.desc.clone(),
                homepage: draft.homepage.clone(),
                logo,
                org_name: None,
            },
        );
        Ok(proj_id)
    }

    async fn project_update(
        &self,
        proj_id: i32,
        draft: &ProjectDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(project) = tables.projects.get_mut(&proj_id) else {
            return Ok(false);
        };
        project.org_id = draft.org_id;
        project.name = draft.name.clone();
        project.desc = draft.desc.clone();
        project.homepage = draft.homepage.clone();
        if let Some(logo) = logo {
            project.logo = logo;
        }
        Ok(true)
    }

    async fn project_set_logo(&self, proj_id: i32, logo: bool) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.projects.get_mut(&proj_id) {
            Some(project) => {
                project.logo = logo;
                true
            }
            None => false,
        })
    }

    async fn project_delete(&self, proj_id: i32) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .projects
            .remove(&proj_id)
            .is_some())
    }
}

#[async_trait]
impl OrganisationPersistence for MemoryStore {
    async fn organisation_find_all(&self) -> anyhow::Result<Vec<OrganisationInfo>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .organisations
            .values()
            .cloned()
            .collect())
    }

    async fn organisation_find_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> anyhow::Result<Page<OrganisationInfo>> {
        let items = self.organisation_find_all().await?;
        Ok(page_of(items, page_number, page_size))
    }

    async fn organisation_get(&self, org_id: i32) -> anyhow::Result<Option<OrganisationInfo>> {
        self.check()?;
        Ok(self.organisation(org_id))
    }

    async fn organisation_create(
        &self,
        draft: &OrganisationDraft,
        logo: bool,
    ) -> anyhow::Result<i32> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.next_organisation += 1;
        let org_id = tables.next_organisation;
        tables.organisations.insert(
            org_id,
            OrganisationInfo {
                org_id,
                name: draft.name.clone(),
                desc: draft.desc.clone(),
                logo,
            },
        );
        Ok(org_id)
    }

    async fn organisation_update(
        &self,
        org_id: i32,
        draft: &OrganisationDraft,
        logo: Option<bool>,
    ) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(org) = tables.organisations.get_mut(&org_id) else {
            return Ok(false);
        };
        org.name = draft.name.clone();
        org.desc = draft.desc.clone();
        if let Some(logo) = logo {
            org.logo = logo;
        }
        Ok(true)
    }

    async fn organisation_set_logo(&self, org_id: i32, logo: bool) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.organisations.get_mut(&org_id) {
            Some(org) => {
                org.logo = logo;
                true
            }
            None => false,
        })
    }

    async fn organisation_delete(&self, org_id: i32) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.organisations.remove(&org_id).is_none() {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for project in tables.projects.values_mut() {
            if project.org_id == Some(org_id) {
                project.org_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl UserPersistence for MemoryStore {
    async fn user_find_by_provider(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<Option<UserInfo>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| {
                u.provider == Some(provider)
                    && u.provider_user_id.as_deref() == Some(provider_user_id)
            })
            .cloned())
    }

    async fn user_create(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> anyhow::Result<UserInfo> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let user = UserInfo {
            user_id: tables.users.len() as i32 + 1,
            provider: Some(provider),
            provider_user_id: Some(provider_user_id.to_string()),
            joined: chrono::Utc::now().naive_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn session_create(&self, user_id: i32) -> anyhow::Result<String> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let ses_id = format!("session-{}", tables.sessions.len() + 1);
        tables.sessions.insert(ses_id.clone(), user_id);
        Ok(ses_id)
    }

    async fn session_find_user(&self, ses_id: &str) -> anyhow::Result<Option<UserInfo>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .sessions
            .get(ses_id)
            .and_then(|user_id| tables.users.iter().find(|u| u.user_id == *user_id))
            .cloned())
    }

    async fn session_delete(&self, ses_id: &str) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .sessions
            .remove(ses_id)
            .is_some())
    }
}

#[async_trait]
impl PersistenceService for MemoryStore {
    async fn health_check(&self) -> anyhow::Result<()> {
        self.check()
    }
}

/// Application state over a [`MemoryStore`] and a temporary static directory
pub struct TestContext {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub static_dir: tempfile::TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_overrides(&[]).await
    }

    /// Build with extra configuration values, e.g. `("app.projects_per_page", "2")`
    pub async fn with_overrides(overrides: &[(&str, &str)]) -> Self {
        let static_dir = tempfile::tempdir().unwrap();

        let mut builder = Config::builder()
            .set_override("app.host", "fossfund.test")
            .unwrap()
            .set_override("app.static_dir", static_dir.path().to_string_lossy().to_string())
            .unwrap()
            .set_override("app.max_logo_size", 1024i64)
            .unwrap()
            .set_override("oauth.providers.github.client_id", "test-client")
            .unwrap()
            .set_override("oauth.providers.github.client_secret", "test-secret")
            .unwrap();
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value).unwrap();
        }
        let configuration = Configuration::from_config(builder.build().unwrap());

        let store = Arc::new(MemoryStore::default());
        let oauth_service = Arc::new(OAuthService::new(&configuration.oauth_config()).unwrap());
        let session_service = Arc::new(SessionService::new(CookieSealer::new(
            &CookieSealer::generate_key(),
        )));

        let state = Arc::new(AppState::new(
            configuration,
            store.clone(),
            oauth_service,
            session_service,
        ));
        state.logo_store.ensure_dirs().await.unwrap();

        Self {
            state,
            store,
            static_dir,
        }
    }

    /// Log a user in and return the session cookie value
    pub async fn login(&self, provider_user_id: &str) -> String {
        let identity = OAuthUserInfo {
            provider: OAuthProvider::Github,
            provider_user_id: provider_user_id.to_string(),
            raw_claims: HashMap::new(),
        };
        self.state
            .session_service
            .login(self.store.as_ref(), &identity)
            .await
            .unwrap()
    }
}

/// Initialise the application the way the server builds it
#[macro_export]
macro_rules! test_app {
    ($ctx:expr) => {{
        let state = $ctx.state.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(fossfund_server::error::error_pages())
                .wrap(fossfund_server::middleware::session::SessionMiddleware)
                .wrap(fossfund_server::startup::access_logger())
                .configure(move |cfg| fossfund_server::startup::configure_app(cfg, state)),
        )
        .await
    }};
}

/// Build a `multipart/form-data` body
pub fn multipart(fields: &[(&str, &str)], logo: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((content_type, data)) = logo {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"logo\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// POST a multipart form
pub fn form_request(
    uri: &str,
    fields: &[(&str, &str)],
    logo: Option<(&str, &[u8])>,
) -> actix_web::test::TestRequest {
    let (content_type, body) = multipart(fields, logo);
    actix_web::test::TestRequest::post()
        .uri(uri)
        .insert_header((actix_web::http::header::CONTENT_TYPE, content_type))
        .set_payload(body)
}

pub fn location(resp: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
