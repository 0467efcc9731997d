//! Network access for the audit pipeline.
//!
//! [`guard`] rejects private targets before any request is issued; [`fetch`]
//! retrieves the raw HTML with bounded size, per-attempt timeouts and linear
//! backoff. Both share one `reqwest` client built by [`build_client`].

pub mod fetch;
pub mod guard;

use reqwest::redirect::Policy;
use reqwest::Client;

use crate::error::{Error, FetchError, Result};
use crate::options::AuditOptions;

pub use fetch::{fetch_html, FetchedPage};
pub use guard::{guard_url, is_private_ip, literal_ip};

const MAX_REDIRECTS: usize = 10;

/// Build the HTTP client used for page, robots.txt and sitemap requests.
///
/// Redirects to literal private addresses are refused unless
/// `allow_private_networks` is set; hostnames are checked by [`guard_url`]
/// only for the initial target.
pub fn build_client(options: &AuditOptions) -> Result<Client> {
    let allow_private = options.allow_private_networks;
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let private_hop = literal_ip(attempt.url()).is_some_and(is_private_ip);
        if private_hop && !allow_private {
            return attempt.error("redirect to a private address");
        }
        attempt.follow()
    });

    Client::builder()
        .user_agent(options.user_agent.clone())
        .redirect(policy)
        .connect_timeout(options.request_timeout)
        .build()
        .map_err(|e| Error::FetchFailed(FetchError::Transport(e.to_string())))
}
