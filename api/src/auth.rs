use crate::error::{AuthErrorKind, Error, ErrorKind, HttpStatusError};
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parse `username:password` as passed on the command line.
    pub fn parse(input: &str) -> Result<Self, Error> {
        match input.split_once(':') {
            Some((username, password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Self {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            _ => Err(Error::new(ErrorKind::Auth(
                AuthErrorKind::InvalidCredentialFormat,
            ))),
        }
    }
}

/// Bearer token returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Log in against the Vertex auth endpoint and return the session's bearer
/// token.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<AuthToken, Error> {
    let url = format!("{base_url}/auth/login");

    let response = client
        .post(&url)
        .json(&LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        warn!("Login failed for {}: {status}", credentials.username);
        return Err(Error::with_source(
            ErrorKind::Auth(AuthErrorKind::LoginFailed(status.as_u16())),
            HttpStatusError { status, body },
        ));
    }

    let token: AuthToken = response.json().await?;
    debug!("Authenticated {} against {}", credentials.username, base_url);
    Ok(token)
}
