use axum::Extension;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, warn};

use crate::db::entities::{prelude::User, user};
use crate::server::config::DEFAULT_ADMIN_PASSWORD;
use crate::web::error::AppError;
use crate::web::models::{AuthenticatedUser, Claims, LoginRequest, LoginResponse, UserResponse};

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    let user = User::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    // Token valid for 24 hours.
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(format!("Failed to sign token: {e}")))?;

    Ok(LoginResponse {
        success: true,
        token,
        user: UserResponse {
            id: user.id,
            username: user.username.clone(),
        },
    })
}

pub async fn change_password(
    pool: &DatabaseConnection,
    user_id: i32,
    current_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    if new_password.len() < 6 {
        return Err(AppError::InvalidInput(
            "New password must be at least 6 characters long".to_string(),
        ));
    }

    let user = User::find_by_id(user_id)
        .one(pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    let valid_password = verify(current_password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidInput(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash(new_password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(format!("Password hashing failed: {e}")))?;

    let mut active_user: user::ActiveModel = user.into();
    active_user.password_hash = Set(password_hash);
    active_user.update(pool).await?;

    Ok(())
}

/// Seeds the initial console account when it does not exist yet, so a
/// fresh deployment is immediately usable.
pub async fn ensure_default_user(
    pool: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    let existing = User::find()
        .filter(user::Column::Username.eq(username))
        .one(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash = hash(password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(format!("Password hashing failed: {e}")))?;

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    new_user.insert(pool).await?;

    info!(username = %username, "Default user created.");
    if password == DEFAULT_ADMIN_PASSWORD {
        warn!("Default user uses the built-in password; change it after first login.");
    }
    Ok(())
}

pub async fn me(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserResponse>, AppError> {
    Ok(axum::Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}
