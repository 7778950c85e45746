//! Authenticated HTTP client for the nosh member pages.
//!
//! The dashboard has no public API; everything the run needs is read from
//! the rendered member pages behind a cookie session. Login is a plain
//! form post; the landing URL after the redirect chain carries the
//! account id, which every member-page URL embeds.

use anyhow::{Context, Result, bail};
use log::debug;
use std::time::Duration;
use url::Url;

use crate::run::Dashboard;

pub const BASE_URL: &str = "https://nosh.jp";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the nosh member pages.
pub struct Nosh {
    http: reqwest::Client,
    base_url: String,
}

/// An authenticated session. The cookies live in the client's jar; only
/// the account id needs carrying around.
pub struct NoshSession {
    pub account_id: i64,
}

impl Nosh {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different host (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Nosh {
            http,
            base_url: base_url.into(),
        })
    }

    async fn get_html(&self, url: String) -> Result<String> {
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("GET {url} returned {status}");
        }

        response
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))
    }
}

impl Dashboard for Nosh {
    type Session = NoshSession;

    async fn login(&self, email: &str, password: &str) -> Result<NoshSession> {
        let login_url = format!("{}/login", self.base_url);
        let response = self
            .http
            .post(&login_url)
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .context("login request failed")?;

        // Rejected credentials land back on the login page, which fails
        // the landing-shape check below.
        let account_id = account_id_from_landing(response.url())
            .context("login did not reach the dashboard")?;
        debug!("logged in as account {account_id}");

        Ok(NoshSession { account_id })
    }

    async fn calendar_html(&self, session: &NoshSession, year: i32, month: u32) -> Result<String> {
        self.get_html(format!(
            "{}/mypage/subscription/{}?month={}-{:02}",
            self.base_url, session.account_id, year, month
        ))
        .await
    }

    async fn menu_html(&self, session: &NoshSession, schedule_id: i64) -> Result<String> {
        self.get_html(format!(
            "{}/mypage/{}/{}/menu",
            self.base_url, session.account_id, schedule_id
        ))
        .await
    }
}

/// Extract the account id from the post-login landing URL, expected to
/// look like `https://nosh.jp/mypage/{account_id}/dashboard`.
fn account_id_from_landing(url: &Url) -> Result<i64> {
    let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();

    match segments.as_slice() {
        ["mypage", id, "dashboard"] => id
            .parse()
            .with_context(|| format!("account id {id:?} is not numeric")),
        _ => bail!("unexpected landing page path: {}", url.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landing(path: &str) -> Url {
        Url::parse(&format!("https://nosh.jp{path}")).unwrap()
    }

    #[test]
    fn account_id_from_dashboard_path() {
        assert_eq!(
            account_id_from_landing(&landing("/mypage/12345/dashboard")).unwrap(),
            12345
        );
    }

    #[test]
    fn rejects_login_page_shape() {
        assert!(account_id_from_landing(&landing("/login")).is_err());
    }

    #[test]
    fn rejects_non_numeric_account() {
        assert!(account_id_from_landing(&landing("/mypage/me/dashboard")).is_err());
    }

    #[test]
    fn rejects_extra_segments() {
        assert!(account_id_from_landing(&landing("/mypage/12345/dashboard/extra")).is_err());
    }
}
