use crate::application::feed_service::FeedService;
use crate::application::post_service::PostService;
use crate::domain::actor::Actor;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    AuthorSummary, FeedQuery, GroupFeedResponse, PostForm, PostListResponse, ProfileResponse,
};
use crate::presentation::utils::request_id;
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use tracing::info;
use uuid::Uuid;

#[get("/posts")]
pub async fn index(
    req: HttpRequest,
    feeds: web::Data<FeedService>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = feeds.global_feed(query.page_number()).await?;

    info!(
        request_id = %request_id(&req),
        page = page.number,
        "feed retrieved"
    );

    Ok(HttpResponse::Ok().json(PostListResponse::from(page)))
}

#[get("/group/{slug}")]
pub async fn group_posts(
    req: HttpRequest,
    feeds: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let feed = feeds.group_feed(&slug, query.page_number()).await?;

    info!(
        request_id = %request_id(&req),
        group = %feed.group,
        page = feed.page.number,
        "group feed retrieved"
    );

    Ok(HttpResponse::Ok().json(GroupFeedResponse {
        group: feed.group,
        feed: feed.page.into(),
    }))
}

#[get("/profile/{username}")]
pub async fn profile(
    req: HttpRequest,
    feeds: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse, DomainError> {
    let username = path.into_inner();
    let feed = feeds.author_feed(&username, query.page_number()).await?;

    info!(
        request_id = %request_id(&req),
        author = %feed.author.username,
        page = feed.page.number,
        "profile retrieved"
    );

    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: AuthorSummary {
            username: feed.author.username,
            posts_count: feed.page.total,
        },
        feed: feed.page.into(),
    }))
}

#[get("/posts/{id}")]
pub async fn post_detail(
    post: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = post.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts")]
pub async fn create_post(
    req: HttpRequest,
    actor: Actor,
    post: web::Data<PostService>,
    payload: web::Json<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let group = payload.group_slug().map(str::to_owned);
    let payload = payload.into_inner();
    let post = post
        .create_post(&actor, payload.text, group.as_deref())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %post.author,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{id}")]
pub async fn update_post(
    req: HttpRequest,
    actor: Actor,
    post: web::Data<PostService>,
    payload: web::Json<PostForm>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let group = payload.group_slug().map(str::to_owned);
    let payload = payload.into_inner();
    let post = post
        .edit_post(&actor, post_id, payload.text, group.as_deref())
        .await?;

    info!(
        request_id = %request_id(&req),
        username = %post.author,
        post_id = %post.id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}
