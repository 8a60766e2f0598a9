//! Local HTTP server standing in for Jenkins in client tests

use axum::Router;
use tokio::net::TcpListener;

use crate::JenkinsClient;

pub const PLAIN_JOB: &str = r#"{"name": "myjob", "inQueue": false, "property": []}"#;

pub const QUEUED_JOB: &str = r#"{"name": "myjob", "inQueue": true, "property": []}"#;

pub const PARAMETERIZED_JOB: &str = r#"{
    "name": "myjob",
    "inQueue": false,
    "property": [{
        "_class": "hudson.model.ParametersDefinitionProperty",
        "parameterDefinitions": [{"name": "BRANCH"}]
    }]
}"#;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str) -> JenkinsClient {
    JenkinsClient::new(base_url).with_credentials("admin", "token")
}
