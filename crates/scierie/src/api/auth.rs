use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::input::{text, JsonBody};
use super::{with_storage, AppState};
use crate::auth::{
    clear_session_cookie, hash_password, session_cookie, token_from_headers, verify_password,
};
use crate::error::{Error, Result};
use crate::model::{NewUser, Role};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterPayload {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let (Some(name), Some(email), Some(password)) = (
        text(payload.name),
        text(payload.email.map(|e| e.trim().to_string())),
        text(payload.password),
    ) else {
        return Err(Error::missing_fields(
            "Veuillez remplir tous les champs obligatoires.",
        ));
    };
    let role = match text(payload.role) {
        Some(role) => Role::parse(&role)?,
        None => Role::default(),
    };

    let user = with_storage(&state, move |storage| {
        let password_hash = hash_password(&password)?;
        storage.create_user(&NewUser {
            name,
            email,
            password_hash,
            role,
        })
    })
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "✅ Compte créé avec succès !", "user": user })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginPayload>,
) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (
        text(payload.email.map(|e| e.trim().to_string())),
        text(payload.password),
    ) else {
        return Err(Error::missing_fields("Email et mot de passe requis"));
    };

    let user = with_storage(&state, move |storage| {
        let user = storage
            .find_user_by_email(&email)?
            .ok_or_else(|| Error::not_found("Utilisateur introuvable"))?;
        if verify_password(&password, &user.password_hash) {
            Ok(user)
        } else {
            Err(Error::unauthorized("Mot de passe incorrect"))
        }
    })
    .await?;

    let token = state.tokens.issue(&user)?;
    let cookie = session_cookie(
        &token,
        state.tokens.ttl(),
        state.config.server.secure_cookies,
    );

    tracing::info!(user_id = user.id, "user logged in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Connexion réussie", "user": user })),
    ))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.server.secure_cookies),
        )],
        Json(json!({ "message": "Déconnexion réussie" })),
    )
}

pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let token = token_from_headers(&headers).ok_or_else(|| Error::unauthorized("Non authentifié"))?;
    let claims = state
        .tokens
        .verify(&token)
        .map_err(|_| Error::unauthorized("Session invalide ou expirée"))?;

    let user = with_storage(&state, move |storage| storage.get_user(claims.sub))
        .await?
        .ok_or_else(|| Error::unauthorized("Session invalide ou expirée"))?;

    Ok(Json(json!({ "user": user })))
}
