//! Shared fixtures for app integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use soybean_api::{ApiClient, ApiError, ApiRequest, ApiResponse, ApiTransport, Method};
use soybean_app::ViewController;
use soybean_core::ImageUpload;

#[allow(dead_code)]
pub const TOKEN_BODY: &str = r#"{"access_token":"tok-123","token_type":"bearer"}"#;
#[allow(dead_code)]
pub const USER_BODY: &str = r#"{"id":1,"name":"Ada","email":"ada@example.test","created_at":"2025-01-01T00:00:00"}"#;
#[allow(dead_code)]
pub const PREDICTION_BODY: &str = r#"{"id":42,"user_id":1,"image_url":"uploads/leaf.jpg","predicted_label":"frogeye_leaf_spot","confidence":0.934,"model_version":"v1","created_at":"2025-02-01T09:30:00"}"#;
#[allow(dead_code)]
pub const PREDICTIONS_BODY: &str = r#"[{"id":42,"user_id":1,"image_url":"uploads/leaf.jpg","predicted_label":"frogeye_leaf_spot","confidence":0.934,"model_version":"v1","created_at":"2025-02-01T09:30:00"}]"#;
#[allow(dead_code)]
pub const FEEDBACK_BODY: &str = r#"[{"id":7,"user_id":1,"prediction_id":42,"rating":4,"is_correct":true,"comment":null,"created_at":"2025-02-01T09:31:00"}]"#;

/// Canned reply for one endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, String),
    Fail(String),
}

/// Transport answering from a fixed route table and recording every request.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(&'static str, String), Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .expect("route lock should work")
            .insert((method_key(method), path.to_string()), Reply::Respond(status, body.to_string()));
    }

    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.routes
            .lock()
            .expect("route lock should work")
            .insert((method_key(method), path.to_string()), Reply::Fail(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("request lock should work").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request lock should work").len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.path)
            .collect()
    }
}

impl ApiTransport for ScriptedTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .expect("request lock should work")
            .push(request.clone());

        let reply = self
            .routes
            .lock()
            .expect("route lock should work")
            .get(&(method_key(request.method), request.path.clone()))
            .cloned();

        match reply {
            Some(Reply::Respond(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Reply::Fail(reason)) => Err(ApiError::Transport(reason)),
            None => Ok(ApiResponse::new(404, r#"{"detail":"Not Found"}"#)),
        }
    }
}

fn method_key(method: Method) -> &'static str {
    match method {
        Method::Get => "GET",
        Method::Post => "POST",
    }
}

/// Controller over `transport`.
#[allow(dead_code)]
pub fn controller(transport: &Arc<ScriptedTransport>) -> ViewController {
    ViewController::new(ApiClient::new(transport.clone()))
}

/// Transport with working login routes.
#[allow(dead_code)]
pub fn login_transport() -> Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    transport.respond(Method::Post, "/login", 200, TOKEN_BODY);
    transport.respond(Method::Get, "/me", 200, USER_BODY);
    transport
}

/// Controller already logged in as Ada.
#[allow(dead_code)]
pub fn logged_in_controller(transport: &Arc<ScriptedTransport>) -> ViewController {
    let mut controller = controller(transport);
    controller.login_form_mut().email = "ada@example.test".to_string();
    controller.login_form_mut().password = "pw".to_string();
    controller.log_in().expect("fixture login should succeed");
    controller
}

/// Small image fixture.
#[allow(dead_code)]
pub fn fixture_image() -> ImageUpload {
    ImageUpload::new("leaf.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0]).expect("image fixture should build")
}
