// API client module: a small blocking HTTP client for the Mixcloud API.
// It exchanges OAuth codes for tokens, fetches the current user and
// submits the multipart upload. Everything is synchronous: the program
// does one request at a time.

use crate::response::UploadResponse;
use crate::upload::MultipartBody;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};

/// Redirect URI registered for the OAuth application.
pub const OAUTH_REDIRECT_URI: &str = "https://test.icedream.tech";

const DEFAULT_API_URL: &str = "https://api.mixcloud.com";
const DEFAULT_OAUTH_URL: &str = "https://www.mixcloud.com";

/// The authenticated account as returned by `/me`. Only `is_pro` drives
/// behaviour; unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_pro: bool,
}

/// OAuth application credentials.
#[derive(Debug, Clone, Default)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthApp {
    /// Read `MIXCLOUD_CLIENT_ID` / `MIXCLOUD_CLIENT_SECRET`, falling back to
    /// the values baked in at build time.
    pub fn from_env() -> Self {
        let var = |name: &str, baked: Option<&str>| {
            std::env::var(name)
                .ok()
                .or_else(|| baked.map(str::to_string))
                .unwrap_or_default()
        };
        OAuthApp {
            client_id: var("MIXCLOUD_CLIENT_ID", option_env!("MIXCLOUD_CLIENT_ID")),
            client_secret: var("MIXCLOUD_CLIENT_SECRET", option_env!("MIXCLOUD_CLIENT_SECRET")),
        }
    }
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Blocking client holding the reqwest client, the API and OAuth base
/// URLs, and the OAuth application credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    oauth_url: String,
    app: OAuthApp,
}

impl ApiClient {
    /// Create a client for explicit base URLs (no trailing slash needed).
    pub fn new(api_url: &str, oauth_url: &str, app: OAuthApp) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(format!("Mixcloud CLI Uploader v{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            // uploads can take as long as they take
            .timeout(None)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            oauth_url: oauth_url.trim_end_matches('/').to_string(),
            app,
        })
    }

    /// Create a client configured from `MIXCLOUD_API_URL` and
    /// `MIXCLOUD_OAUTH_URL`, defaulting to the public Mixcloud hosts.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("MIXCLOUD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let oauth_url =
            std::env::var("MIXCLOUD_OAUTH_URL").unwrap_or_else(|_| DEFAULT_OAUTH_URL.into());
        Self::new(&api_url, &oauth_url, OAuthApp::from_env())
    }

    /// URL the user opens in a browser to obtain an authorization code.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/oauth/authorize?client_id={}&redirect_uri={}",
            self.oauth_url,
            urlencoding::encode(&self.app.client_id),
            urlencoding::encode(OAUTH_REDIRECT_URI)
        )
    }

    /// Exchange an authorization code for an access token. A response
    /// without `access_token` yields an empty string; transport and decode
    /// failures are errors.
    pub fn exchange_code_for_token(&self, code: &str) -> Result<String> {
        let url = format!("{}/oauth/access_token", &self.oauth_url);
        log::debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .query(&[
                ("client_id", self.app.client_id.as_str()),
                ("redirect_uri", OAUTH_REDIRECT_URI),
                ("client_secret", self.app.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .context("Error fetching Access Code")?;
        log::debug!("token exchange answered {}", res.status());
        let resp: TokenResponse = res
            .json()
            .context("Error decoding response from API")?;
        Ok(resp.access_token.unwrap_or_default())
    }

    /// Fetch the profile of the user owning `access_token`.
    pub fn fetch_current_user(&self, access_token: &str) -> Result<User> {
        let url = format!("{}/me", &self.api_url);
        log::debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .query(&[("access_token", access_token)])
            .send()
            .context("Error fetching your profile data")?;
        log::debug!("profile request answered {}", res.status());
        let user: User = res.json().context("Error decoding response from API")?;
        Ok(user)
    }

    /// POST the multipart form to the upload endpoint. The file parts were
    /// wrapped by `progress` when the form was built, so the bar follows the
    /// bytes as the transport reads them. Error statuses still carry a JSON
    /// body, so the status is not checked here and the decoded response is
    /// left to the caller to reconcile.
    pub fn upload(
        &self,
        access_token: &str,
        body: MultipartBody,
        progress: &ProgressBar,
    ) -> Result<UploadResponse> {
        let url = format!("{}/upload/", &self.api_url);
        log::debug!("POST {} ({} bytes of files)", url, body.file_bytes());

        let res = self
            .client
            .post(&url)
            .query(&[("access_token", access_token)])
            .multipart(body.into_form())
            .send()
            .context("Error sending upload request")?;
        progress.finish();
        log::debug!("upload answered {}", res.status());

        let resp: UploadResponse = res.json().context("Error decoding response from API")?;
        Ok(resp)
    }
}
