//! Explicit runtime configuration
//!
//! The core never reads the process environment. `main` builds a [`Config`]
//! once and hands it to the [`Repository`](crate::areas::repository::Repository).

use crate::artifacts::objects::commit::Author;
use crate::errors::TwigError;

const AUTHOR_NAME_VAR: &str = "GIT_AUTHOR_NAME";
const AUTHOR_EMAIL_VAR: &str = "GIT_AUTHOR_EMAIL";
const AUTHOR_DATE_VAR: &str = "GIT_AUTHOR_DATE";
const NO_PAGER_VAR: &str = "NO_PAGER";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub use_pager: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let author_date = std::env::var(AUTHOR_DATE_VAR)
            .ok()
            .and_then(|date| Self::parse_date(&date));

        Config {
            author_name: std::env::var(AUTHOR_NAME_VAR).ok(),
            author_email: std::env::var(AUTHOR_EMAIL_VAR).ok(),
            author_date,
            use_pager: std::env::var_os(NO_PAGER_VAR).is_none(),
        }
    }

    /// Accepts RFC 2822 dates and `%Y-%m-%d %H:%M:%S %z`
    pub fn parse_date(date: &str) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        chrono::DateTime::parse_from_rfc2822(date)
            .or_else(|_| chrono::DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
            .ok()
    }

    /// Build the commit author, stamped with the configured date or the current time
    pub fn author(&self) -> anyhow::Result<Author> {
        match (&self.author_name, &self.author_email) {
            (Some(name), Some(email)) => {
                let timestamp = self
                    .author_date
                    .unwrap_or_else(|| chrono::Local::now().fixed_offset());
                Ok(Author::new(name.clone(), email.clone(), timestamp))
            }
            _ => Err(TwigError::MissingAuthor.into()),
        }
    }
}
