use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::domain::{LoginInput, NewUser, RegisterInput, TokenOutput};
use super::errors::{AuthError, StoreError};
use super::hasher::{CredentialHasher, HashMethod};
use super::repository::UserStore;
use super::token::{TokenIssuer, DEFAULT_TOKEN_LIFETIME};
use crate::context::RequestContext;

/// Auth service configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_sign_key: String,
    /// Token lifetime; 744h when unset.
    pub jwt_expires_after: Option<Duration>,
    pub hash_method: HashMethod,
}

impl AuthConfig {
    pub fn new(jwt_sign_key: impl Into<String>) -> Self {
        Self { jwt_sign_key: jwt_sign_key.into(), jwt_expires_after: None, hash_method: HashMethod::default() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<S: UserStore + ?Sized = dyn UserStore> {
    store: Arc<S>,
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    token_lifetime: Duration,
}

impl<S: UserStore + ?Sized> AuthService<S> {
    pub fn new(store: Arc<S>, cfg: AuthConfig) -> Self {
        Self {
            store,
            hasher: CredentialHasher::new(cfg.hash_method),
            issuer: TokenIssuer::new(cfg.jwt_sign_key),
            token_lifetime: cfg.jwt_expires_after.unwrap_or(DEFAULT_TOKEN_LIFETIME),
        }
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    /// Authenticate by email and password and issue a token for the user.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, domain::LoginInput, repo::memory::InMemoryUserStore};
    /// use service::RequestContext;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(InMemoryUserStore::seeded()), AuthConfig::new("secret"));
    /// let ctx = RequestContext::background();
    /// let out = tokio_test::block_on(svc.login(&ctx, LoginInput { email: "jack@gmail.com".into(), password: "1234567".into() })).unwrap();
    /// assert!(!out.token.is_empty());
    /// ```
    #[instrument(skip(self, ctx, input), fields(email = %input.email))]
    pub async fn login(&self, ctx: &RequestContext, input: LoginInput) -> Result<TokenOutput, AuthError> {
        let Some(user) = ctx.run(self.store.find_by_email(&input.email)).await?? else {
            debug!("no user with this email");
            return Err(AuthError::InvalidCredentials);
        };

        let stored = hex::decode(&user.password_digest)
            .map_err(|e| AuthError::Internal(format!("error while decoding stored digest: {e}")))?;

        if !self.hasher.verify(input.password.as_bytes(), &stored) {
            info!(user_id = %user.id, "email and password don't match");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user.id, self.token_lifetime)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(TokenOutput { token })
    }

    /// Register a new user and return a token for it.
    ///
    /// Checks run cheapest first: password confirmation, then email, then
    /// username. A dual conflict therefore always reports `EmailTaken`.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, domain::RegisterInput, repo::memory::InMemoryUserStore};
    /// use service::RequestContext;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(InMemoryUserStore::new()), AuthConfig::new("secret"));
    /// let input = RegisterInput {
    ///     username: "gholi".into(),
    ///     email: "gholi@gmail.com".into(),
    ///     password: "1234567".into(),
    ///     repeat_password: "1234567".into(),
    /// };
    /// let out = tokio_test::block_on(svc.register(&RequestContext::background(), input)).unwrap();
    /// assert!(!out.token.is_empty());
    /// ```
    #[instrument(skip(self, ctx, input), fields(email = %input.email, username = %input.username))]
    pub async fn register(&self, ctx: &RequestContext, input: RegisterInput) -> Result<TokenOutput, AuthError> {
        if input.password != input.repeat_password {
            return Err(AuthError::PasswordMismatch);
        }
        self.check_email_available(ctx, &input.email).await?;
        self.check_username_available(ctx, &input.username).await?;

        let candidate = NewUser {
            id: None,
            username: input.username,
            email: input.email,
            password_digest: self.hasher.hash_hex(input.password.as_bytes()),
        };
        let user = ctx.run(self.store.store(candidate)).await?.map_err(|e| {
            if let StoreError::UniquenessViolation { field } = &e {
                warn!(%field, "uniqueness violation at write time");
            }
            AuthError::from(e)
        })?;
        info!(user_id = %user.id, username = %user.username, "user_registered");

        self.login(ctx, LoginInput { email: user.email, password: input.password }).await
    }

    /// `Ok(())` when no user has this email, `EmailTaken` otherwise.
    pub async fn check_email_available(&self, ctx: &RequestContext, email: &str) -> Result<(), AuthError> {
        match ctx.run(self.store.find_by_email(email)).await?? {
            Some(_) => Err(AuthError::EmailTaken),
            None => Ok(()),
        }
    }

    /// `Ok(())` when no user has this username, `UsernameTaken` otherwise.
    pub async fn check_username_available(&self, ctx: &RequestContext, username: &str) -> Result<(), AuthError> {
        match ctx.run(self.store.find_by_username(username)).await?? {
            Some(_) => Err(AuthError::UsernameTaken),
            None => Ok(()),
        }
    }
}
