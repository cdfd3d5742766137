use std::{result, sync::Arc};

use log::{debug, error, info};
use warp::http;

use crate::auth::SessionId;
use crate::backend::{Backend, CreateError, FindError};
use crate::password;
use crate::preprocess;
use crate::user::SessionUser;

#[derive(Debug)]
pub struct SpamCheck(Backend);

/// A request whose session cookie resolved to a user.
#[derive(Debug)]
pub struct SpamCheckAuthed {
    check: Arc<SpamCheck>,
    session_id: SessionId,
    user: SessionUser,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Internal,
    Unauthorized,
    DuplicateEmail,
}

pub type Result<T> = result::Result<T, Error>;

impl Into<http::StatusCode> for Error {
    fn into(self) -> http::StatusCode {
        match self {
            Self::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail => http::StatusCode::CONFLICT,
        }
    }
}

impl SpamCheck {
    pub fn new(backend: Backend) -> Self {
        Self(backend)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let pwhash = password::hash(password).map_err(|()| Error::Internal)?;

        self.0
            .create_user(username, email, &pwhash)
            .await
            .map_err(|e| match e {
                CreateError::DuplicateEmail => {
                    info!("signup rejected, {email} already registered");
                    Error::DuplicateEmail
                }
                CreateError::Internal => Error::Internal,
            })?;

        info!("{email} signed up");
        Ok(())
    }

    pub async fn login(self: &Arc<Self>, email: &str, pass: &str) -> Result<SpamCheckAuthed> {
        let user = self.0.find_user(email).await.map_err(|e| {
            if matches!(e, FindError::NotFound) {
                error!("rejecting non-existent user {email}");
                Error::Unauthorized
            } else {
                error!("couldn't authenticate user {email}: {e:?}");
                Error::Internal
            }
        })?;

        if !password::verify(pass, &user.pwhash) {
            error!("wrong password for user {email}");
            return Err(Error::Unauthorized);
        }

        // a fresh session each login, replacing any previous one
        let session_id = SessionId::new();
        if !self
            .0
            .update_user_session(email, Some(&session_id.to_string()))
            .await
        {
            error!("couldn't login user {email}");
            return Err(Error::Internal);
        }

        info!("{email} login: new session created");
        Ok(SpamCheckAuthed {
            check: Arc::clone(self),
            session_id,
            user: SessionUser::from(&user),
        })
    }

    pub async fn authenticate(self: &Arc<Self>, session_id: SessionId) -> Result<SpamCheckAuthed> {
        let session_str = session_id.to_string();

        let users = self
            .0
            .users_with_session(&session_str)
            .await
            .map_err(|()| Error::Internal)?;

        match &users[..] {
            [] => {
                debug!("no user found for session {session_id}");
                Err(Error::Unauthorized)
            }
            [user] => {
                assert_eq!(user.session_id, Some(session_str));

                debug!("found user by session");
                Ok(SpamCheckAuthed {
                    check: Arc::clone(self),
                    session_id,
                    user: SessionUser::from(user),
                })
            }
            _ => {
                error!("multiple users found for session {session_id}");
                Err(Error::Internal)
            }
        }
    }

    /// Label a message. The preprocessor runs on every call but its output
    /// isn't fed anywhere yet; the label is fixed.
    /// TODO: vectorize the normalized text and run it through a trained model
    pub fn classify(&self, sms: &str) -> &'static str {
        let _normalized = preprocess::normalize(sms);

        "spam"
    }
}

impl SpamCheckAuthed {
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub async fn logout(&self) -> Result<()> {
        let email = &self.user.email;
        info!("{email} logout");

        self.check
            .0
            .update_user_session(email, None)
            .await
            .then(|| ())
            .ok_or(Error::Internal)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::mock;

    async fn create_spamcheck() -> Arc<SpamCheck> {
        Arc::new(SpamCheck::new(Backend(mock::create_db().await)))
    }

    #[tokio::test]
    async fn signup_then_login() {
        let check = create_spamcheck().await;

        check
            .register("rob", "rob@example.com", "hunter2")
            .await
            .unwrap();

        let authed = check.login("rob@example.com", "hunter2").await.unwrap();
        assert_eq!(authed.user().email, "rob@example.com");
        assert_eq!(authed.user().username, "rob");

        // the stored session resolves back to the same user
        let resolved = check.authenticate(*authed.session_id()).await.unwrap();
        assert_eq!(resolved.user(), authed.user());
    }

    #[tokio::test]
    async fn duplicate_signup() {
        let check = create_spamcheck().await;

        check
            .register("rob", "rob@example.com", "hunter2")
            .await
            .unwrap();

        let err = check
            .register("imposter", "rob@example.com", "other")
            .await
            .unwrap_err();
        assert_eq!(err, Error::DuplicateEmail);
    }

    #[tokio::test]
    async fn wrong_password_creates_no_session() {
        let check = create_spamcheck().await;

        check
            .register("rob", "rob@example.com", "hunter2")
            .await
            .unwrap();

        let err = check.login("rob@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, Error::Unauthorized);

        let user = check.0.find_user("rob@example.com").await.unwrap();
        assert_eq!(user.session_id, None);
    }

    #[tokio::test]
    async fn unknown_email() {
        let check = create_spamcheck().await;

        let err = check.login("nobody@example.com", "pw").await.unwrap_err();
        assert_eq!(err, Error::Unauthorized);
    }

    #[tokio::test]
    async fn unknown_session() {
        let check = create_spamcheck().await;

        let err = check.authenticate(SessionId::new()).await.unwrap_err();
        assert_eq!(err, Error::Unauthorized);
    }

    #[tokio::test]
    async fn logout_invalidates_session() {
        let check = create_spamcheck().await;

        check
            .register("rob", "rob@example.com", "hunter2")
            .await
            .unwrap();
        let authed = check.login("rob@example.com", "hunter2").await.unwrap();
        let session_id = *authed.session_id();

        authed.logout().await.unwrap();

        let err = check.authenticate(session_id).await.unwrap_err();
        assert_eq!(err, Error::Unauthorized);
    }

    #[tokio::test]
    async fn label_ignores_content() {
        let check = create_spamcheck().await;

        assert_eq!(check.classify("WINNER!! Claim your free prize now"), "spam");
        assert_eq!(check.classify("see you at dinner"), "spam");
    }
}
