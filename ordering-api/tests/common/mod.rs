use std::sync::Arc;

use auth::Authenticator;
use auth::KeyAlgorithm;
use auth::KeyRing;
use auth::KeyStore;
use auth::SigningKey;
use auth::TokenSettings;
use ordering_api::credentials::models::UserRecord;
use ordering_api::domain::credentials::service::LoginService;
use ordering_api::inbound::http::router::create_router;
use ordering_api::outbound::InMemoryUserDirectory;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ADMIN_PASSWORD: &str = "pass_word!";
pub const CLERK_PASSWORD: &str = "clerk_pass!";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(authenticator(TEST_SECRET));

        let users = vec![
            UserRecord {
                id: "u42".to_string(),
                username: "admin".to_string(),
                password_hash: authenticator.hash_password(ADMIN_PASSWORD).unwrap(),
                roles: vec!["Admin".to_string()],
            },
            UserRecord {
                id: "u7".to_string(),
                username: "clerk".to_string(),
                password_hash: authenticator.hash_password(CLERK_PASSWORD).unwrap(),
                roles: vec!["Clerk".to_string()],
            },
        ];
        let directory =
            Arc::new(InMemoryUserDirectory::new(users).expect("Failed to seed user directory"));
        let login_service = Arc::new(LoginService::new(directory, Arc::clone(&authenticator)));

        let router = create_router(login_service, Arc::clone(&authenticator));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
        }
    }

    /// Log in through the API and return the access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .post("/api/auth/login")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");

        body["data"]["token"]
            .as_str()
            .expect("Login response has no token")
            .to_string()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }
}

/// Authenticator with the deployment's issuer and audience and an HS256 key
pub fn authenticator(secret: &[u8]) -> Authenticator {
    let settings = TokenSettings::new("ordering-api", "ordering-client", 60, 300).unwrap();
    let key = SigningKey::from_secret("primary", secret, KeyAlgorithm::Hs256).unwrap();

    Authenticator::new(settings, KeyStore::new(KeyRing::signing(key)))
}
