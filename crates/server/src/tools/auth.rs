//! auth_login and auth_signup tools.

use super::json_result;
use krishi_client::{LoginRequest, Network, SignupRequest, WorkerRegistry, auth};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters for the auth_login tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoginParams {
    pub phone: String,
    pub password: String,
}

/// Parameters for the auth_signup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SignupParams {
    pub full_name: String,
    pub phone: String,
    pub password: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub dob: String,
}

/// Returns the `{success, message, user}` envelope, including rejections.
pub async fn login_impl<N: Network>(
    registry: &WorkerRegistry<N>, origin: &Url, params: LoginParams,
) -> Result<CallToolResult, McpError> {
    let request = LoginRequest { phone: params.phone, password: params.password };
    let envelope = auth::login(registry, origin, &request).await?;
    json_result(&envelope)
}

pub async fn signup_impl<N: Network>(
    registry: &WorkerRegistry<N>, origin: &Url, params: SignupParams,
) -> Result<CallToolResult, McpError> {
    let request =
        SignupRequest { full_name: params.full_name, phone: params.phone, password: params.password, dob: params.dob };
    let envelope = auth::signup(registry, origin, &request).await?;
    json_result(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ORIGIN, StubNetwork, decode};
    use krishi_client::AuthResponse;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_returns_envelope() {
        let network = Arc::new(StubNetwork::default());
        network.serve("/login", r#"{"success":true,"message":"Login Succesfully!","user":"Asha"}"#);
        let registry = WorkerRegistry::new(network);
        let origin = Url::parse(ORIGIN).unwrap();

        let params = LoginParams { phone: "9800000000".into(), password: "secret".into() };
        let envelope: AuthResponse = decode(&login_impl(&registry, &origin, params).await.unwrap());

        assert!(envelope.success);
        assert_eq!(envelope.user.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn test_signup_rejection_is_not_an_error() {
        let network = Arc::new(StubNetwork::default());
        network.serve_status("/signup", 409, r#"{"success":false,"message":"Phone already registered"}"#);
        let registry = WorkerRegistry::new(network);
        let origin = Url::parse(ORIGIN).unwrap();

        let params = SignupParams {
            full_name: "Asha Patil".into(),
            phone: "9800000000".into(),
            password: "secret".into(),
            dob: "1990-04-01".into(),
        };
        let envelope: AuthResponse = decode(&signup_impl(&registry, &origin, params).await.unwrap());

        assert!(!envelope.success);
        assert_eq!(envelope.message, "Phone already registered");
    }

    #[tokio::test]
    async fn test_login_offline_fails() {
        let network = Arc::new(StubNetwork::default());
        network.set_offline(true);
        let registry = WorkerRegistry::new(network);
        let origin = Url::parse(ORIGIN).unwrap();

        let params = LoginParams { phone: "9800000000".into(), password: "secret".into() };
        assert!(login_impl(&registry, &origin, params).await.is_err());
    }
}
