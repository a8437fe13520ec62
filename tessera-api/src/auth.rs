use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tessera_core::CoreError;
use tessera_shared::mask_email;

use crate::{
    flash::{self, Flash},
    forms::{check, FormErrors, LoginForm, SignupForm},
    middleware::{
        session::{clear_session, issue_session_token, session_cookie},
        Principal, RequestContext,
    },
    state::AppState,
    views, web,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(signup_page).post(signup))
}

// ============================================================================
// Login / Logout
// ============================================================================

async fn login_page(Extension(ctx): Extension<RequestContext>, jar: CookieJar) -> Response {
    if ctx.principal.is_some() {
        return Redirect::to("/").into_response();
    }
    views::render(jar, &ctx, "Log in", views::login(&LoginForm::default(), &FormErrors::default()))
}

async fn login(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(errors) = check(&form) {
        return views::render(jar, &ctx, "Log in", views::login(&form, &errors));
    }

    // 1. Verify credentials
    let user = match state.service.authenticate(&form.email, &form.password).await {
        Ok(user) => user,
        Err(e @ CoreError::InvalidCredentials) => {
            let mut errors = FormErrors::default();
            errors.add("password", e.to_string());
            return views::render(jar, &ctx, "Log in", views::login(&form, &errors));
        }
        Err(e) => return web::failure(jar, &ctx, e, "/login"),
    };

    // 2. Establish the session
    let principal = Principal::from(&user);
    let token = match issue_session_token(&state.auth, &principal, form.remember()) {
        Ok(token) => token,
        Err(e) => return web::failure(jar, &ctx, CoreError::storage(format!("Token encoding failed: {}", e)), "/login"),
    };

    tracing::info!("User {} logged in", mask_email(&user.email));
    let jar = jar.add(session_cookie(&state.auth, token, form.remember()));
    let jar = flash::push(jar, Flash::info("Logged in successfully."));
    (jar, Redirect::to("/")).into_response()
}

async fn logout(jar: CookieJar) -> Response {
    let jar = flash::push(clear_session(jar), Flash::info("You have been logged out."));
    (jar, Redirect::to("/")).into_response()
}

// ============================================================================
// Sign-up
// ============================================================================

async fn signup_page(Extension(ctx): Extension<RequestContext>, jar: CookieJar) -> Response {
    if ctx.principal.is_some() {
        return Redirect::to("/").into_response();
    }
    views::render(jar, &ctx, "Sign up", views::signup(&SignupForm::default(), &FormErrors::default()))
}

async fn signup(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Response {
    if let Err(errors) = check(&form) {
        return views::render(jar, &ctx, "Sign up", views::signup(&form, &errors));
    }

    match state.service.sign_up(&form.email, &form.password).await {
        Ok(user) => {
            tracing::info!("User {} signed up", mask_email(&user.email));
            let jar = flash::push(jar, Flash::info("Account created. Please log in."));
            (jar, Redirect::to("/login")).into_response()
        }
        Err(e @ (CoreError::EmailTaken(_) | CoreError::Validation(_))) => {
            let mut errors = FormErrors::default();
            errors.add("email", e.to_string());
            views::render(jar, &ctx, "Sign up", views::signup(&form, &errors))
        }
        Err(e) => web::failure(jar, &ctx, e, "/register"),
    }
}
