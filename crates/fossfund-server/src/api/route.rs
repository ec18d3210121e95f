use actix_web::{Scope, web};

pub fn routes() -> Scope {
    web::scope("")
        .service(super::index::index)
        .service(super::static_files::serve)
        .service(super::project::routes())
        .service(super::organisation::routes())
        .service(super::user::routes())
}
