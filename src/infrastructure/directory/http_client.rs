//! HTTP directory client for a Grafana-compatible team API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::domain::directory::{
    DeleteOutcome, DirectoryClient, RemoteTeam, RemovalOutcome, UserRecord,
};
use crate::domain::team::{MemberId, MemberList, TeamId};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
enum Auth {
    None,
    Bearer(String),
    Basic { user: String, password: String },
}

#[derive(Debug, Deserialize)]
struct TeamResponse {
    id: i64,
    name: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamMemberResponse {
    user_id: i64,
    #[serde(default)]
    email: String,
    #[serde(default)]
    login: String,
}

impl TeamMemberResponse {
    /// Members are identified by email, or by login when no email is set
    fn identifier(&self) -> &str {
        if self.email.is_empty() {
            &self.login
        } else {
            &self.email
        }
    }

    fn matches(&self, member: &MemberId) -> bool {
        self.email == member.as_str() || self.login == member.as_str()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTeamResponse {
    team_id: i64,
}

#[derive(Debug, Serialize)]
struct TeamBody<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddMemberBody {
    user_id: i64,
}

/// Directory client over the remote REST API
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base_url: String,
    auth: Auth,
    org_id: Option<i64>,
}

impl HttpDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        let auth = match (&config.token, &config.basic_auth) {
            (Some(token), _) => Auth::Bearer(token.clone()),
            (None, Some(basic)) => {
                let (user, password) = basic.split_once(':').ok_or_else(|| {
                    DomainError::configuration("basic_auth must have the form 'user:password'")
                })?;
                Auth::Basic {
                    user: user.to_string(),
                    password: password.to_string(),
                }
            }
            (None, None) => Auth::None,
        };

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            auth,
            org_id: config.org_id,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));

        request = match &self.auth {
            Auth::None => request,
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Basic { user, password } => request.basic_auth(user, Some(password)),
        };

        if let Some(org_id) = self.org_id {
            request = request.header("X-Grafana-Org-Id", org_id.to_string());
        }

        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        request
            .send()
            .await
            .map_err(|e| DomainError::remote_unavailable(format!("Request failed: {}", e)))
    }

    /// Send and require a 2xx response, classifying anything else
    async fn send_ok(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        let response = self.send(request).await?;

        if response.status().is_success() {
            return Ok(response);
        }

        Err(error_from_response(response).await)
    }

    async fn list_members(&self, id: TeamId) -> Result<Vec<TeamMemberResponse>, DomainError> {
        let response = self
            .send_ok(self.request(Method::GET, &format!("/api/teams/{}/members", id)))
            .await?;

        parse_json(response).await
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    response
        .json()
        .await
        .map_err(|e| DomainError::remote_unavailable(format!("Failed to parse response: {}", e)))
}

async fn error_from_response(response: Response) -> DomainError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify(status, body)
}

fn classify(status: StatusCode, body: String) -> DomainError {
    match status {
        StatusCode::NOT_FOUND => DomainError::not_found(body),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DomainError::remote_unavailable(format!("HTTP {}: {}", status, body))
        }
        s if s.is_server_error() => {
            DomainError::remote_unavailable(format!("HTTP {}: {}", status, body))
        }
        s => DomainError::remote(s.as_u16(), body),
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn get_team(&self, id: TeamId) -> Result<Option<RemoteTeam>, DomainError> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/teams/{}", id)))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let team: TeamResponse = parse_json(response).await?;
        let members = self
            .list_members(id)
            .await?
            .iter()
            .map(|m| MemberId::new(m.identifier()))
            .collect::<Result<MemberList, _>>()?;

        Ok(Some(RemoteTeam {
            id: TeamId::new(team.id)?,
            name: team.name,
            email: team.email,
            members,
        }))
    }

    async fn create_team(&self, name: &str, email: &str) -> Result<TeamId, DomainError> {
        let response = self
            .send_ok(
                self.request(Method::POST, "/api/teams")
                    .json(&TeamBody { name, email }),
            )
            .await?;

        let created: CreateTeamResponse = parse_json(response).await?;
        Ok(TeamId::new(created.team_id)?)
    }

    async fn update_team(&self, id: TeamId, name: &str, email: &str) -> Result<(), DomainError> {
        self.send_ok(
            self.request(Method::PUT, &format!("/api/teams/{}", id))
                .json(&TeamBody { name, email }),
        )
        .await?;

        Ok(())
    }

    async fn delete_team(&self, id: TeamId) -> Result<DeleteOutcome, DomainError> {
        match self
            .send_ok(self.request(Method::DELETE, &format!("/api/teams/{}", id)))
            .await
        {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(DomainError::NotFound { .. }) => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }

    async fn add_team_member(&self, id: TeamId, member: &MemberId) -> Result<(), DomainError> {
        let user = self
            .resolve_user(member)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", member)))?;

        self.send_ok(
            self.request(Method::POST, &format!("/api/teams/{}/members", id))
                .json(&AddMemberBody { user_id: user.id }),
        )
        .await?;

        Ok(())
    }

    async fn remove_team_member(
        &self,
        id: TeamId,
        member: &MemberId,
    ) -> Result<RemovalOutcome, DomainError> {
        let members = self.list_members(id).await?;

        let Some(user_id) = members.iter().find(|m| m.matches(member)).map(|m| m.user_id) else {
            debug!(team_id = %id, member = %member, "Member not listed on team");
            return Ok(RemovalOutcome::AlreadyAbsent);
        };

        match self
            .send_ok(self.request(
                Method::DELETE,
                &format!("/api/teams/{}/members/{}", id, user_id),
            ))
            .await
        {
            Ok(_) => Ok(RemovalOutcome::Removed),
            Err(DomainError::NotFound { .. }) => Ok(RemovalOutcome::AlreadyAbsent),
            Err(e) => Err(e),
        }
    }

    async fn resolve_user(&self, identifier: &MemberId) -> Result<Option<UserRecord>, DomainError> {
        let response = self
            .send(
                self.request(Method::GET, "/api/users/lookup")
                    .query(&[("loginOrEmail", identifier.as_str())]),
            )
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(Some(parse_json(response).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_statuses() {
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "Team not found".to_string()),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, String::new()),
            DomainError::RemoteUnavailable { .. }
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, String::new()),
            DomainError::RemoteUnavailable { .. }
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "bad".to_string()),
            DomainError::Remote { status: 400, .. }
        ));
    }

    #[test]
    fn test_member_identifier_falls_back_to_login() {
        let member = TeamMemberResponse {
            user_id: 1,
            email: String::new(),
            login: "admin".to_string(),
        };
        assert_eq!(member.identifier(), "admin");
        assert!(member.matches(&MemberId::new("admin").unwrap()));
    }

    #[test]
    fn test_invalid_basic_auth() {
        let config = DirectoryConfig {
            basic_auth: Some("no-colon".to_string()),
            ..DirectoryConfig::default()
        };

        let result = HttpDirectoryClient::new(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = DirectoryConfig {
            url: "http://grafana.local/".to_string(),
            ..DirectoryConfig::default()
        };

        let client = HttpDirectoryClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://grafana.local");
    }
}
