//! Fetch-based login and game creation

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{Credential, Endpoints, login_form};
use crate::error::ClientError;
use crate::protocol::{
    CreateGameRequest, CreateGameResponse, Difficulty, TokenResponse, failure_reason,
};

/// Send a request, returning (status ok, body text)
async fn send(request: &Request) -> Result<(bool, String), ClientError> {
    let window = web_sys::window().ok_or_else(|| ClientError::Browser("no window".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(request))
        .await?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok((response.ok(), body))
}

fn post(url: &str, body: &str, content_type: &str) -> Result<Request, ClientError> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(body));
    let request = Request::new_with_str_and_init(url, &init)?;
    request.headers().set("Content-Type", content_type)?;
    Ok(request)
}

/// Exchange username/password for a bearer token
pub async fn login(
    endpoints: &Endpoints,
    username: &str,
    password: &str,
) -> Result<Credential, ClientError> {
    let request = post(
        &endpoints.token(),
        &login_form(username, password),
        "application/x-www-form-urlencoded",
    )?;
    let (ok, body) = send(&request)
        .await
        .map_err(|e| ClientError::Auth(e.to_string()))?;
    if !ok {
        return Err(ClientError::Auth(failure_reason(&body)));
    }

    let token: TokenResponse =
        serde_json::from_str(&body).map_err(|e| ClientError::Auth(e.to_string()))?;
    log::info!("Logged in as {} ({} token)", username, token.token_type);
    Ok(Credential {
        token: token.access_token,
        player_id: username.to_string(),
    })
}

/// Ask the server for a new game, returning its id
pub async fn create_game(
    endpoints: &Endpoints,
    difficulty: Difficulty,
    credential: &Credential,
) -> Result<String, ClientError> {
    let payload = serde_json::to_string(&CreateGameRequest { difficulty })?;
    let request = post(&endpoints.create_game(), &payload, "application/json")?;
    request.headers().set("Authorization", &credential.bearer())?;

    let (ok, body) = send(&request)
        .await
        .map_err(|e| ClientError::GameCreation(e.to_string()))?;
    if !ok {
        return Err(ClientError::GameCreation(failure_reason(&body)));
    }

    let created: CreateGameResponse =
        serde_json::from_str(&body).map_err(|e| ClientError::GameCreation(e.to_string()))?;
    log::info!("Created game {} ({})", created.game_id, difficulty.as_str());
    Ok(created.game_id)
}
