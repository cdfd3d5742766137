use std::fmt;

use base64_light::{base64_decode, base64_encode};
use cookie::Cookie;
use log::debug;

pub const FLASH_COOKIE: &str = "flash";

/// A one-shot message shown on the next page render, carried across a
/// redirect in a cookie and cleared once displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Danger,
    Warning,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        };
        write!(fmt, "{s}")
    }
}

impl Level {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "success" => Some(Self::Success),
            "danger" => Some(Self::Danger),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl Flash {
    pub fn success(message: &str) -> Self {
        Self::new(Level::Success, message)
    }

    pub fn danger(message: &str) -> Self {
        Self::new(Level::Danger, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(Level::Info, message)
    }

    fn new(level: Level, message: &str) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Serialise as a `Set-Cookie` value. The payload is base64ed so the
    /// message can contain characters cookie values can't.
    pub fn into_cookie(self) -> String {
        let payload = base64_encode(&format!("{}:{}", self.level, self.message));

        Cookie::build((FLASH_COOKIE, payload))
            .path("/")
            .build()
            .to_string()
    }

    pub fn from_cookie(value: &str) -> Option<Self> {
        let bytes = base64_decode(value);
        let payload = std::str::from_utf8(&bytes)
            .map_err(|e| {
                debug!("non-utf8 flash cookie: {e:?}");
            })
            .ok()?;

        let (tag, message) = payload.split_once(':')?;
        let level = Level::from_tag(tag)?;

        Some(Self::new(level, message))
    }
}

pub fn clear_cookie() -> String {
    Cookie::build((FLASH_COOKIE, ""))
        .path("/")
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}
