//! Identity service: registration, login, caller resolution and profiles.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use shelf_core::policy::{self, Caller};
use shelf_core::validation::{
    age_on, parse_birth_date, validate_email, validate_name, validate_password,
};
use shelf_core::{NewUser, Profile, Role, User, UserId, UserPatch, UserProfile};

use super::blocking;
use crate::auth::Credentials;
use crate::error::ApiError;
use crate::state::AppState;

/// Registration body (`POST /cadastro`).
#[derive(Debug, Default, Deserialize)]
pub struct RegisterInput {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub cep: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<String>,
    pub senha: Option<String>,
}

/// Login body (`POST /login`).
#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub senha: Option<String>,
}

/// Identity service.
pub struct IdentityService {
    state: AppState,
}

impl IdentityService {
    pub fn new(state: AppState) -> Self {
        IdentityService { state }
    }

    /// Creates an ordinary account.
    ///
    /// Age is derived here, once, against today's UTC date.
    pub async fn register(&self, input: RegisterInput) -> Result<User, ApiError> {
        let birth_date = parse_birth_date(input.data_nascimento.as_deref())
            .map_err(|_| ApiError::validation("Data de nascimento inválida ou não informada"))?;

        let password = input.senha.unwrap_or_default();
        validate_password(&password).map_err(|_| ApiError::validation("Senha não informada"))?;

        let name = validate_name("nome", input.nome.as_deref().unwrap_or_default())?;
        let email = validate_email(input.email.as_deref().unwrap_or_default())?;

        let age = age_on(birth_date, Utc::now().date_naive());
        let password_hash = blocking(move || Credentials::hash(&password)).await??;

        let new_user = NewUser {
            name,
            email,
            cep: non_blank(input.cep),
            cpf: non_blank(input.cpf),
            birth_date,
            age,
            password_hash,
            role: Role::Ordinary,
        };

        let user = self
            .state
            .db()
            .users()
            .insert(&new_user)
            .await
            .map_err(|e| ApiError::persistence("Erro ao cadastrar usuário", e))?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access token.
    ///
    /// Every failure is the same generic error, and an unknown email still
    /// pays for one hash verification.
    pub async fn authenticate(&self, input: LoginInput) -> Result<(User, String), ApiError> {
        let invalid = || ApiError::Unauthenticated("E-mail ou senha inválidos".to_string());

        let email = input.email.unwrap_or_default();
        let password = input.senha.unwrap_or_default();

        let user = self
            .state
            .db()
            .users()
            .get_by_email(email.trim())
            .await
            .map_err(|e| ApiError::persistence("Erro ao autenticar", e))?;

        let state = self.state.clone();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = blocking(move || {
            state
                .credentials()
                .verify_or_dummy(&password, stored_hash.as_deref())
        })
        .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!("Login rejected");
                return Err(invalid());
            }
        };

        let token = self.state.jwt().generate_access_token(user.id, user.role)?;
        info!(user_id = %user.id, "Login succeeded");

        Ok((user, token))
    }

    /// Maps a bearer token to the stored user it names.
    ///
    /// `None` for a missing, malformed, badly signed or expired token, and for
    /// a token naming a user that no longer exists.
    pub async fn resolve_caller(&self, token: Option<&str>) -> Option<User> {
        let claims = self.state.jwt().validate_access_token(token?)?;
        let user_id = claims.user_id()?;

        match self.state.db().users().get_by_id(user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Caller lookup failed");
                None
            }
        }
    }

    /// Full profile for the owner or an admin, public projection otherwise.
    pub async fn view(&self, target_id: UserId, caller: &User) -> Result<Profile, ApiError> {
        let target = self.find(target_id).await?;
        Ok(policy::visible_profile(&Caller::from(caller), &target))
    }

    pub fn view_self(&self, caller: &User) -> UserProfile {
        caller.profile()
    }

    /// Changes name and/or email of `target_id`.
    pub async fn update(
        &self,
        target_id: UserId,
        caller: &User,
        patch: UserPatch,
    ) -> Result<User, ApiError> {
        if !policy::can_write(&Caller::from(caller), target_id) {
            warn!(caller = %caller.id, target = %target_id, "User update denied");
            return Err(ApiError::forbidden());
        }

        self.find(target_id).await?;

        let name = patch
            .name
            .as_deref()
            .map(|name| validate_name("nome", name))
            .transpose()?;
        let email = patch.email.as_deref().map(validate_email).transpose()?;

        let user = self
            .state
            .db()
            .users()
            .update(target_id, name.as_deref(), email.as_deref())
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => ApiError::not_found("Usuário não encontrado"),
                e => ApiError::persistence("Erro ao atualizar usuário", e),
            })?;

        info!(user_id = %target_id, by = %caller.id, "User updated");
        Ok(user)
    }

    async fn find(&self, id: UserId) -> Result<User, ApiError> {
        self.state
            .db()
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Usuário não encontrado"))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
