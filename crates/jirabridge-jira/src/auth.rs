//! JIRA authentication

use jirabridge_core::models::JiraConfig;

/// Credentials sent with every request.
pub enum JiraAuth {
    /// Jira Cloud: account email plus API token.
    Basic { username: String, api_token: String },
    /// Jira Server / Data Center personal access token.
    Bearer { token: String },
}

impl JiraAuth {
    pub fn new(username: String, api_token: String) -> Self {
        Self::Basic {
            username,
            api_token,
        }
    }

    pub fn from_config(config: &JiraConfig) -> Self {
        if config.uses_basic_auth() {
            Self::new(config.username.trim().to_string(), config.api_token.clone())
        } else {
            Self::Bearer {
                token: config.api_token.clone(),
            }
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        match self {
            Self::Basic {
                username,
                api_token,
            } => {
                use base64::Engine;
                let credentials = format!("{}:{}", username, api_token);
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(credentials)
                )
            }
            Self::Bearer { token } => format!("Bearer {}", token),
        }
    }
}
