//! Organisation catalogue endpoints

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Serialize;
use tracing::{info, warn};

use fossfund_common::{FossfundError, ORG_ID, RecordKind};
use fossfund_persistence::{OrganisationInfo, Page, UserInfo};

use crate::{
    api::{PageQuery, auth_context, parse_id},
    error::AppError,
    model::{
        AppState,
        response::{self, redirect},
    },
    service::{catalog, form::RecordForm, logo::LogoStore},
};

const KIND: RecordKind = RecordKind::Organisation;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListView {
    page: Page<OrganisationInfo>,
    user: Option<UserInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormView {
    organisation: Option<OrganisationInfo>,
    user: Option<UserInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganisationView {
    organisation: OrganisationInfo,
    logo_url: Option<String>,
    user: Option<UserInfo>,
}

fn organisation_url(org_id: i32) -> String {
    format!("/organisation/{}", org_id)
}

/// Store an uploaded logo for a saved organisation
///
/// When the file cannot be written the organisation is left without a logo.
async fn store_logo(data: &AppState, org_id: i32, form: &RecordForm) -> anyhow::Result<()> {
    let Some(logo) = form.logo() else {
        return Ok(());
    };

    if let Err(e) = data.logo_store.save(KIND, org_id, &logo.data).await {
        warn!(org_id, "Failed to store logo: {}", e);
        data.persistence.organisation_set_logo(org_id, false).await?;
        return Err(e);
    }

    Ok(())
}

/// Paginated list of organisations
#[get("")]
async fn list(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page_number = catalog::page_number(query.page())?;
    let page = data
        .persistence
        .organisation_find_page(page_number, data.configuration.organisations_per_page())
        .await?;
    let (page, message) = catalog::check_page(page, "organisations")?;

    let list_view = ListView {
        page,
        user: auth_context(&req).user,
    };

    Ok(match message {
        Some(message) => response::Result::<ListView>::http_message(&message, list_view),
        None => response::Result::<ListView>::http_success(list_view),
    })
}

/// Data for the empty organisation form
#[get("/add")]
async fn add_form(req: HttpRequest) -> HttpResponse {
    response::Result::<FormView>::http_success(FormView {
        organisation: None,
        user: auth_context(&req).user,
    })
}

/// Create an organisation, then show it
#[post("/add")]
async fn add(data: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, AppError> {
    let form = RecordForm::read(&mut payload, &data.logo_store).await?;
    let draft = form.organisation_draft()?;

    let org_id = data
        .persistence
        .organisation_create(&draft, form.logo().is_some())
        .await?;
    store_logo(&data, org_id, &form).await?;

    info!(org_id, name = %draft.name, "Organisation created");
    Ok(redirect(&organisation_url(org_id)))
}

/// Data for the form editing an existing organisation
#[get("/edit/{id}")]
async fn edit_form(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(org_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let organisation = data
        .persistence
        .organisation_get(org_id)
        .await?
        .ok_or(FossfundError::OrganisationNotExist(org_id))?;

    Ok(response::Result::<FormView>::http_success(FormView {
        organisation: Some(organisation),
        user: auth_context(&req).user,
    }))
}

/// Update an organisation, then show it
///
/// A new logo replaces the current one, `removeLogo` deletes it and
/// otherwise the logo is left alone.
#[post("/edit")]
async fn edit(data: web::Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, AppError> {
    let form = RecordForm::read(&mut payload, &data.logo_store).await?;
    let org_id = form.record_id(ORG_ID)?;
    let draft = form.organisation_draft()?;

    let logo = if form.logo().is_some() {
        Some(true)
    } else if form.remove_logo() {
        Some(false)
    } else {
        None
    };

    if !data
        .persistence
        .organisation_update(org_id, &draft, logo)
        .await?
    {
        return Err(FossfundError::OrganisationNotExist(org_id).into());
    }

    match logo {
        Some(true) => store_logo(&data, org_id, &form).await?,
        Some(false) => {
            data.logo_store.remove(KIND, org_id).await?;
        }
        None => {}
    }

    info!(org_id, "Organisation updated");
    Ok(redirect(&organisation_url(org_id)))
}

/// Delete an organisation and its logo
#[get("/remove/{id}")]
async fn remove(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(org_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    if data.persistence.organisation_delete(org_id).await? {
        data.logo_store.remove(KIND, org_id).await?;
        info!(org_id, "Organisation deleted");
    }

    Ok(redirect("/organisation"))
}

/// A single organisation
#[get("/{id}")]
async fn view(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let Some(org_id) = parse_id(&path) else {
        return Ok(HttpResponse::NotFound().finish());
    };

    let organisation = data
        .persistence
        .organisation_get(org_id)
        .await?
        .ok_or(FossfundError::OrganisationNotExist(org_id))?;

    Ok(response::Result::<OrganisationView>::http_success(OrganisationView {
        logo_url: organisation.logo.then(|| LogoStore::url(KIND, org_id)),
        organisation,
        user: auth_context(&req).user,
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/organisation")
        .service(list)
        .service(add_form)
        .service(add)
        .service(edit_form)
        .service(edit)
        .service(remove)
        .service(view)
}
