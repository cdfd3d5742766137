use std::convert::Infallible;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use warp::http::{header, StatusCode, Uri};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::auth::{self, SessionId, SESSION_COOKIE};
use crate::flash::{self, Flash, FLASH_COOKIE};
use crate::pages;
use crate::spamcheck::{Error, SpamCheck, SpamCheckAuthed};

#[derive(Debug, Deserialize)]
struct SignupForm {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PredictForm {
    sms: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordForm {
    email: Option<String>,
}

pub fn routes(
    check: Arc<SpamCheck>,
    secure: bool,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(pending_flash())
        .map(|flash: Option<Flash>| html(pages::index(flash.as_ref()), flash.is_some()));

    let about = warp::path!("about")
        .and(warp::get())
        .and(pending_flash())
        .map(|flash: Option<Flash>| html(pages::about(flash.as_ref()), flash.is_some()));

    let predict_page = warp::path!("predict")
        .and(warp::get())
        .and(with_check(&check))
        .and(session())
        .and(pending_flash())
        .then(
            |check: Arc<SpamCheck>, session: Option<SessionId>, flash: Option<Flash>| async move {
                if let Err(to_login) = gate(&check, session).await {
                    return to_login;
                }
                html(pages::predict(flash.as_ref()), flash.is_some())
            },
        );

    let predict_submit = warp::path!("predict")
        .and(warp::post())
        .and(with_check(&check))
        .and(session())
        .and(warp::body::form())
        .then(
            |check: Arc<SpamCheck>, session: Option<SessionId>, form: PredictForm| async move {
                if let Err(to_login) = gate(&check, session).await {
                    return to_login;
                }

                match form.sms.as_deref().filter(|sms| !sms.is_empty()) {
                    Some(sms) => {
                        let label = check.classify(sms);
                        html(pages::result(sms, label), false)
                    }
                    None => redirect_flash("/predict", Flash::danger("Please enter SMS!")),
                }
            },
        );

    let signup_page = warp::path!("signup")
        .and(warp::get())
        .and(pending_flash())
        .map(|flash: Option<Flash>| html(pages::signup(flash.as_ref()), flash.is_some()));

    let signup_submit = warp::path!("signup")
        .and(warp::post())
        .and(with_check(&check))
        .and(warp::body::form())
        .then(|check: Arc<SpamCheck>, form: SignupForm| async move {
            match check
                .register(&form.username, &form.email, &form.password)
                .await
            {
                Ok(()) => {
                    redirect_flash("/login", Flash::success("Signup successful! Please login."))
                }
                Err(Error::DuplicateEmail) => {
                    let flash = Flash::danger("Email already registered!");
                    html(pages::signup(Some(&flash)), false)
                }
                Err(e) => error_response(e),
            }
        });

    let login_page = warp::path!("login")
        .and(warp::get())
        .and(pending_flash())
        .map(|flash: Option<Flash>| html(pages::login(flash.as_ref()), flash.is_some()));

    let login_submit = warp::path!("login")
        .and(warp::post())
        .and(with_check(&check))
        .and(warp::body::form())
        .then(move |check: Arc<SpamCheck>, form: LoginForm| async move {
            match check.login(&form.email, &form.password).await {
                Ok(authed) => {
                    let mut res = redirect("/dashboard");
                    append_cookie(&mut res, auth::session_cookie(authed.session_id(), secure));
                    append_cookie(&mut res, Flash::success("Login successful!").into_cookie());
                    res
                }
                Err(Error::Unauthorized) => {
                    let flash = Flash::danger("Invalid Email or Password");
                    html(pages::login(Some(&flash)), false)
                }
                Err(e) => error_response(e),
            }
        });

    let dashboard = warp::path!("dashboard")
        .and(warp::get())
        .and(with_check(&check))
        .and(session())
        .and(pending_flash())
        .then(
            |check: Arc<SpamCheck>, session: Option<SessionId>, flash: Option<Flash>| async move {
                match gate(&check, session).await {
                    Ok(authed) => html(
                        pages::dashboard(authed.user(), flash.as_ref()),
                        flash.is_some(),
                    ),
                    Err(to_login) => to_login,
                }
            },
        );

    let logout = warp::path!("logout")
        .and(warp::get())
        .and(with_check(&check))
        .and(session())
        .then(|check: Arc<SpamCheck>, session: Option<SessionId>| async move {
            if let Some(session_id) = session {
                if let Ok(authed) = check.authenticate(session_id).await {
                    if let Err(e) = authed.logout().await {
                        return error_response(e);
                    }
                }
            }

            let mut res = redirect("/");
            append_cookie(&mut res, auth::clear_session_cookie());
            append_cookie(&mut res, Flash::info("Logged out successfully").into_cookie());
            res
        });

    let forgot_page = warp::path!("forgot-password")
        .and(warp::get())
        .and(pending_flash())
        .map(|flash: Option<Flash>| html(pages::forgot_password(flash.as_ref()), flash.is_some()));

    // TODO: look the email up and send an actual reset mail
    let forgot_submit = warp::path!("forgot-password")
        .and(warp::post())
        .and(warp::body::form())
        .map(|form: ForgotPasswordForm| {
            debug!("password reset requested for {:?}", form.email);

            redirect_flash(
                "/login",
                Flash::info("Password reset instructions will be sent if email exists"),
            )
        });

    index
        .or(about)
        .unify()
        .or(predict_page)
        .unify()
        .or(predict_submit)
        .unify()
        .or(signup_page)
        .unify()
        .or(signup_submit)
        .unify()
        .or(login_page)
        .unify()
        .or(login_submit)
        .unify()
        .or(dashboard)
        .unify()
        .or(logout)
        .unify()
        .or(forgot_page)
        .unify()
        .or(forgot_submit)
        .unify()
}

fn with_check(
    check: &Arc<SpamCheck>,
) -> impl Filter<Extract = (Arc<SpamCheck>,), Error = Infallible> + Clone {
    let check = Arc::clone(check);
    warp::any().map(move || Arc::clone(&check))
}

fn session() -> impl Filter<Extract = (Option<SessionId>,), Error = Infallible> + Copy {
    warp::cookie::optional::<String>(SESSION_COOKIE)
        .map(|cookie: Option<String>| cookie.and_then(|value| value.parse().ok()))
}

fn pending_flash() -> impl Filter<Extract = (Option<Flash>,), Error = Infallible> + Copy {
    warp::cookie::optional::<String>(FLASH_COOKIE)
        .map(|cookie: Option<String>| cookie.and_then(|value| Flash::from_cookie(&value)))
}

/// Resolve the session or produce the redirect-to-login every gated route
/// answers with.
async fn gate(
    check: &Arc<SpamCheck>,
    session: Option<SessionId>,
) -> Result<SpamCheckAuthed, Response> {
    let to_login = || redirect_flash("/login", Flash::warning("Please login first"));

    let Some(session_id) = session else {
        return Err(to_login());
    };

    check
        .authenticate(session_id)
        .await
        .map_err(|_| to_login())
}

/// Render a page; when it displayed a flash, tell the client to drop the
/// flash cookie so the message shows only once.
fn html(page: String, clear_flash: bool) -> Response {
    let mut res = warp::reply::html(page).into_response();
    if clear_flash {
        append_cookie(&mut res, flash::clear_cookie());
    }
    res
}

fn redirect(to: &'static str) -> Response {
    warp::redirect::see_other(Uri::from_static(to)).into_response()
}

fn redirect_flash(to: &'static str, flash: Flash) -> Response {
    let mut res = redirect(to);
    append_cookie(&mut res, flash.into_cookie());
    res
}

fn append_cookie(res: &mut Response, cookie: String) {
    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
        res.headers_mut().append(header::SET_COOKIE, value);
    }
}

fn error_response(e: Error) -> Response {
    let status: StatusCode = e.into();
    warp::reply::with_status(warp::reply::html(pages::error(status)), status).into_response()
}
