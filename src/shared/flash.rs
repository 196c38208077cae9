//! One-shot flash messages carried in a cookie across a redirect.
//!
//! A redirect sets the `flash` cookie; the next rendered page shows the
//! message and removes the cookie.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// `<level>:<message>`; the cookie layer percent-encodes it on the wire
    pub fn to_cookie_value(&self) -> String {
        format!("{}:{}", self.level.as_str(), self.message)
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let (level, message) = value.split_once(':')?;
        let level = FlashLevel::parse(level)?;
        Some(Self {
            level,
            message: message.to_string(),
        })
    }

    fn cookie(&self) -> Cookie<'static> {
        Cookie::build((FLASH_COOKIE, self.to_cookie_value()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }
}

/// A `303 See Other` that carries exactly one flash message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashRedirect {
    pub to: &'static str,
    pub flash: FlashMessage,
}

impl FlashRedirect {
    pub fn success(to: &'static str, message: impl Into<String>) -> Self {
        Self {
            to,
            flash: FlashMessage::success(message),
        }
    }

    pub fn error(to: &'static str, message: impl Into<String>) -> Self {
        Self {
            to,
            flash: FlashMessage::error(message),
        }
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let jar = CookieJar::new().add(self.flash.cookie());
        (jar, Redirect::to(self.to)).into_response()
    }
}

/// Flash message left by the previous response, if any
#[derive(Debug, Clone)]
pub struct IncomingFlash {
    jar: CookieJar,
    message: Option<FlashMessage>,
}

impl IncomingFlash {
    pub fn from_jar(jar: CookieJar) -> Self {
        let message = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| FlashMessage::from_cookie_value(cookie.value()));
        Self { jar, message }
    }

    pub fn message(&self) -> Option<&FlashMessage> {
        self.message.as_ref()
    }

    /// Wrap a rendered page, removing the flash cookie if one was shown
    pub fn into_page(self, html: String) -> Response {
        if self.message.is_some() {
            let jar = self.jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
            (jar, Html(html)).into_response()
        } else {
            Html(html).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        Ok(Self::from_jar(jar))
    }
}
