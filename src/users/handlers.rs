use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::{
    dto::{PublicUser, SignupRequest},
    repo_types::NewUser,
};
use crate::{
    auth::{password::hash_password, CurrentUser},
    error::ApiError,
    state::AppState,
    validation::{self, email, required, JsonBody, Rule},
};

const SIGNUP_RULES: &[Rule] = &[
    required("firstName", r#"Please provide a value for "firstName""#),
    required("lastName", r#"Please provide a value for "lastName""#),
    required("emailAddress", r#"Please provide a value for "emailAddress""#),
    email("emailAddress", r#"Email must be a valid "email address""#),
    required("password", r#"Please provide a value for "password""#),
];

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(get_current_user).post(create_user))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<(StatusCode, [(header::HeaderName, &'static str); 1]), ApiError> {
    validation::validate(&body, SIGNUP_RULES)?;
    let payload: SignupRequest = validation::decode(body)?;

    if state
        .store
        .find_user_by_email(&payload.email_address)
        .await?
        .is_some()
    {
        warn!(email = %payload.email_address, "email already registered");
        return Err(ApiError::duplicate_email(&payload.email_address));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email_address: payload.email_address,
            password_hash,
        })
        .await?;

    info!(user_id = user.id, email = %user.email_address, "user registered");
    Ok((StatusCode::CREATED, [(header::LOCATION, "/")]))
}
