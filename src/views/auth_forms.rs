use crate::core::error::ViewError;
use crate::navigation::route::Route;
use crate::services::auth::AuthService;
use crate::validation::forms::{LoginForm, RegisterForm};

/// Validate and log in; the landing route on success
pub async fn submit_login(auth: &AuthService, form: LoginForm) -> Result<Route, ViewError> {
    let credentials = form.validate()?;
    auth.login(&credentials).await?;
    Ok(Route::LANDING)
}

/// Validate and create an account, which also logs the user in
pub async fn submit_register(auth: &AuthService, form: RegisterForm) -> Result<Route, ViewError> {
    let registration = form.validate()?;
    auth.register(&registration).await?;
    Ok(Route::LANDING)
}
