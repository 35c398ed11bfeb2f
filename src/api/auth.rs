//! Account endpoints. Registration, login and profile lookup are not built
//! yet; every call answers 501 without reading the request body.

use crate::error::AppError;

pub async fn register_handler() -> AppError {
    AppError::NotImplemented("User registration is not implemented yet")
}

pub async fn login_handler() -> AppError {
    AppError::NotImplemented("Login is not implemented yet")
}

pub async fn me_handler() -> AppError {
    AppError::NotImplemented("Current user lookup is not implemented yet")
}
