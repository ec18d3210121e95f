use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Serialize;

use fossfund_common::INDEX_PROJECT_COUNT;
use fossfund_persistence::{ProjectInfo, UserInfo};

use crate::{
    api::auth_context,
    error::AppError,
    model::{AppState, response},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexView {
    projects: Vec<ProjectInfo>,
    user: Option<UserInfo>,
}

/// Front page: a few projects and the current user
#[get("/")]
pub async fn index(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let projects = data
        .persistence
        .project_find_first(INDEX_PROJECT_COUNT)
        .await?;

    Ok(response::Result::<IndexView>::http_success(IndexView {
        projects,
        user: auth_context(&req).user,
    }))
}
