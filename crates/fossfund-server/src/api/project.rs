//! Project catalogue endpoints

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Serialize;
use tracing::{info, warn};

use fossfund_common::{FossfundError, PROJ_ID, RecordKind};
use fossfund_persistence::{OrganisationInfo, Page, ProjectInfo, UserInfo};

use crate::{
    api::{PageQuery, auth_context, parse_id},
    error::AppError,
    model::{
        AppState,
        response::{self, redirect},
    },
    service::{catalog, form::RecordForm, logo::LogoStore},
};

const KIND: RecordKind = RecordKind::Project;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListView {
    page: Page<ProjectInfo>,
    user: Option<UserInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormView {
    project: Option<ProjectInfo>,
    organisations: Vec<OrganisationInfo>,
    user: Option<UserInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectView {
    project: ProjectInfo,
    logo_url: Option<String>,
    user: Option<UserInfo>,
}

fn project_url(proj_id: i32) -> String {
    format!("/project/{}", proj_id)
}

/// Store an uploaded logo for a saved project
///
/// When the file cannot be written the project is left without a logo.
async fn store_logo(data: &AppState, proj_id: i32, form: &RecordForm) -> anyhow::Result<()> {
    let Some(logo) = form.logo() else {
        return Ok(());
    };

    if let Err(e) = data.logo_store.save(KIND, proj_id, &logo.data).await {
        warn!(proj_id, "Failed to store logo: {}", e);
        data.persistence.project_set_logo(proj_id, false).await?;
        return Err(e);
    }

    Ok(())
}

/// Paginated list of projects
#[get("")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page_number = catalog::page_number(query.page())?;
    let page = data
        .persistence
        .project_find_page(page_number, data.configuration.projects_per_page())
        .await?;
    let (page, message) = catalog::check_page(page, "projects")?;

    let list_view = ListView {
        page,
        user: auth_context(&req).user,
    };

    Ok(match message {
        Some(message) => response::Result::<ListView>::http_message(&message, list_view),
        None => response::Result::<ListView>::http_success(list_view),
    })
}

/// Data for the empty project form
#[get("/add")]
async fn add_form(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let organisations = data.persistence.organisation_find_all().await?;

    Ok(response::Result::<FormView>::http_success(FormView {
        project: None,
        organisations,
        user: auth_context(&req).user,
    }))
}

/// Create a project, then show it
#[post("/add")]
async fn add(data: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, AppError> {
    let form = RecordForm::read(&mut payload, &data.logo_store).await?;
    let draft = form.project_draft()?;

    let proj_id = data
        .persistence
        .project_create(&draft, form.logo().is_some())
        .await?;
    store_logo(&data, proj_id, &form).await?;

    info!(proj_id, name = %draft.name, "Project created");
    Ok(redirect(&project_url(proj_id)))
}

/// Data for the form editing an existing project
#[get("/edit/{id}")]
async fn edit_form(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(proj_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let project = data
        .persistence
        .project_get(proj_id)
        .await?
        .ok_or(FossfundError::ProjectNotExist(proj_id))?;
    let organisations = data.persistence.organisation_find_all().await?;

    Ok(response::Result::<FormView>::http_success(FormView {
        project: Some(project),
        organisations,
        user: auth_context(&req).user,
    }))
}

/// Update a project, then show it
///
/// A new logo replaces the current one, `removeLogo` deletes it and
/// otherwise the logo is left alone.
#[post("/edit")]
async fn edit(data: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, AppError> {
    let form = RecordForm::read(&mut payload, &data.logo_store).await?;
    let proj_id = form.record_id(PROJ_ID)?;
    let draft = form.project_draft()?;

    let logo = if form.logo().is_some() {
        Some(true)
    } else if form.remove_logo() {
        Some(false)
    } else {
        None
    };

    if !data
        .persistence
        .project_update(proj_id, &draft, logo)
        .await?
    {
        return Err(FossfundError::ProjectNotExist(proj_id).into());
    }

    match logo {
        Some(true) => store_logo(&data, proj_id, &form).await?,
        Some(false) => {
            data.logo_store.remove(KIND, proj_id).await?;
        }
        None => {}
    }

    info!(proj_id, "Project updated");
    Ok(redirect(&project_url(proj_id)))
}

/// Delete a project and its logo
#[get("/remove/{id}")]
async fn remove(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(proj_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    if data.persistence.project_delete(proj_id).await? {
        data.logo_store.remove(KIND, proj_id).await?;
        info!(proj_id, "Project deleted");
    }

    Ok(redirect("/project"))
}

/// A single project with its organisation
#[get("/{id}")]
async fn view(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(proj_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let project = data
        .persistence
        .project_get(proj_id)
        .await?
        .ok_or(FossfundError::ProjectNotExist(proj_id))?;

    Ok(response::Result::<ProjectView>::http_success(ProjectView {
        logo_url: project.logo.then(|| LogoStore::url(KIND, proj_id)),
        project,
        user: auth_context(&req).user,
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/project")
        .service(list)
        .service(add_form)
        .service(add)
        .service(edit_form)
        .service(edit)
        .service(remove)
        .service(view)
}
