//! `POST /create-user`: register a caller. Email uniqueness is not enforced.

use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: &'static str,
    pub user_id: String,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Form(form): Form<CreateUserForm>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let user = ctx.store().create_user(&form.name, &form.email).await?;
    tracing::info!(user_id = %user.user_id, "User created");
    Ok(Json(CreateUserResponse {
        message: "User created successfully",
        user_id: user.user_id,
    }))
}
