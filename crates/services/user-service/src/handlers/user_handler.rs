//! User endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::{util, AppResult, OptionExt};
use domain::{CreateUser, UserResponse};

use crate::extractors::FormOrJson;
use crate::state::AppState;

/// Page size used when a paged listing is requested without an explicit size.
const DEFAULT_PAGE_SIZE: u64 = 20;

/// User creation request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Email address used for lookups
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
}

/// Listing parameters; both absent means "fetch everything".
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    pub email: String,
}

/// Message-only response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Create user routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).put(create_user).delete(delete_user))
        .route("/get-by-email", get(get_by_email))
        .route("/:user_id", get(get_user))
}

/// List users, either all of them or one id-ordered page.
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("per_page" = Option<u64>, Query, description = "Page size, defaults to 20")
    ),
    responses(
        (status = 200, description = "Users; paged responses carry an X-Total-Count header", body = Vec<UserResponse>),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    if params.page.is_none() && params.per_page.is_none() {
        let users = state.repo.get_all().await?;
        let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        return Ok(Json(body).into_response());
    }

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PAGE_SIZE);
    let (users, total) = state.repo.get_page(page, per_page).await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    let mut response = Json(body).into_response();
    response.headers_mut().insert(
        HeaderName::from_static("x-total-count"),
        HeaderValue::from(total),
    );
    Ok(response)
}

/// Get user by ID.
#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user, or null when absent", body = UserResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Option<UserResponse>>> {
    let user = state.repo.get_by_id(user_id).await?;
    Ok(Json(user.map(UserResponse::from)))
}

/// Get user by email address.
#[utoipa::path(
    get,
    path = "/user/get-by-email",
    tag = "Users",
    params(
        ("email" = String, Query, description = "Email address to look up")
    ),
    responses(
        (status = 200, description = "The user, or null when absent", body = UserResponse)
    )
)]
pub async fn get_by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> AppResult<Json<Option<UserResponse>>> {
    let user = state.repo.get_by_email(&params.email).await?;
    Ok(Json(user.map(UserResponse::from)))
}

/// Create a new user from a JSON or form-encoded body.
#[utoipa::path(
    put,
    path = "/user",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .repo
        .save(CreateUser {
            email: payload.email,
            name: payload.name,
        })
        .await?;

    tracing::debug!(user = %util::dump(&user), "user created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Delete a user by id.
#[utoipa::path(
    delete,
    path = "/user",
    tag = "Users",
    params(
        ("id" = i32, Query, description = "ID of the user to delete")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let user = state.repo.get_by_id(params.id).await?.ok_or_not_found()?;
    state.repo.delete(&user).await?;

    tracing::info!(user_id = params.id, "user deleted");

    let confirmation = "User successfully deleted";
    let response = if util::prefers_json_response(&headers) {
        Json(MessageResponse {
            message: confirmation.to_string(),
        })
        .into_response()
    } else {
        confirmation.into_response()
    };
    Ok(response)
}
