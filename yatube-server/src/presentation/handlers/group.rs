use crate::application::group_service::GroupService;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::presentation::dto::CreateGroupRequest;
use crate::presentation::utils::request_id;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use tracing::info;

#[get("/groups")]
pub async fn list_groups(groups: web::Data<GroupService>) -> Result<HttpResponse, DomainError> {
    Ok(HttpResponse::Ok().json(groups.list_groups().await?))
}

#[post("/groups")]
pub async fn create_group(
    req: HttpRequest,
    actor: Actor,
    groups: web::Data<GroupService>,
    payload: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, DomainError> {
    let CreateGroupRequest {
        title,
        slug,
        description,
    } = payload.into_inner();
    let group = groups.create_group(&actor, title, slug, description).await?;

    info!(request_id = %request_id(&req), slug = %group.slug, "group created");

    Ok(HttpResponse::Created().json(group))
}

#[delete("/groups/{slug}")]
pub async fn delete_group(
    req: HttpRequest,
    actor: Actor,
    groups: web::Data<GroupService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    groups.delete_group(&actor, &slug).await?;

    info!(request_id = %request_id(&req), slug = %slug, "group deleted");

    Ok(HttpResponse::NoContent().finish())
}
