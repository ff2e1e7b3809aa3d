use serde::{Deserialize, Serialize};

#[derive(Deserialize, Default)]
pub struct CallbackQueryParameters {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Deserialize, Default)]
pub struct TeamMembership {
    pub state: Option<String>,
}

impl TeamMembership {
    /// Pending invitations do not count.
    pub fn is_active(&self) -> bool {
        self.state.as_deref() == Some("active")
    }
}

#[derive(Serialize)]
pub struct ExchangePayload<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
}

#[derive(Serialize)]
pub struct AuthCodePayload<'a> {
    pub client_id: &'a str,
    pub scope: &'a str,
    pub redirect_uri: &'a str,
    pub state: &'a str,
}
