//! LMS endpoint helpers
//!
//! Thin typed wrappers over [`AuthClient`]. Paths are relative to the
//! proxy prefix and keep the backend's trailing slashes. Payloads stay
//! opaque JSON except the user profile.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::Method;
use serde_json::{Value, json};

use crate::application::client::AuthClient;
use crate::domain::profile::UserProfile;
use crate::domain::transport::HttpTransport;
use crate::error::ClientResult;

pub struct LmsApi<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    client: Arc<AuthClient<T>>,
}

impl<T> Clone for LmsApi<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<T> LmsApi<T>
where
    T: HttpTransport + Send + Sync + 'static,
{
    pub fn new(client: Arc<AuthClient<T>>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthClient<T> {
        &self.client
    }

    async fn get(&self, path: &str) -> ClientResult<Value> {
        self.client.get_json(path).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        self.client.send_json(Method::POST, path, body).await
    }

    // ========================================================================
    // Auth (through the proxy)
    // ========================================================================

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Value> {
        let body = json!({ "username": username, "password": password });
        self.post("auth/login/", Some(&body)).await
    }

    pub async fn register(&self, payload: &Value) -> ClientResult<Value> {
        self.post("auth/register/", Some(payload)).await
    }

    pub async fn logout(&self) -> ClientResult<Value> {
        self.post("auth/logout/", None).await
    }

    pub async fn refresh(&self) -> ClientResult<Value> {
        self.post("auth/refresh/", None).await
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub async fn profile(&self) -> ClientResult<UserProfile> {
        self.client.get_json(&self.client.config().profile_path).await
    }

    pub async fn update_profile(&self, payload: &Value) -> ClientResult<UserProfile> {
        let path = self.client.config().profile_path.clone();
        self.client.send_json(Method::PUT, &path, Some(payload)).await
    }

    pub async fn change_password(&self, payload: &Value) -> ClientResult<Value> {
        self.post("users/me/change_password/", Some(payload)).await
    }

    // ========================================================================
    // Courses
    // ========================================================================

    pub async fn courses(&self) -> ClientResult<Value> {
        self.get("courses/").await
    }

    pub async fn course(&self, id: impl Display) -> ClientResult<Value> {
        self.get(&format!("courses/{id}/")).await
    }

    pub async fn enroll(&self, course_id: impl Display) -> ClientResult<Value> {
        self.post(&format!("courses/{course_id}/enroll/"), None).await
    }

    // ========================================================================
    // Assignments and submissions
    // ========================================================================

    pub async fn assignments(&self) -> ClientResult<Value> {
        self.get("assignments/").await
    }

    pub async fn submit_assignment(&self, payload: &Value) -> ClientResult<Value> {
        self.post("submissions/", Some(payload)).await
    }

    pub async fn submissions(
        &self,
        course_id: impl Display,
        assignment_id: impl Display,
    ) -> ClientResult<Value> {
        self.get(&format!("courses/{course_id}/assignments/{assignment_id}/submissions/"))
            .await
    }

    pub async fn submit_submission(
        &self,
        course_id: impl Display,
        assignment_id: impl Display,
        payload: &Value,
    ) -> ClientResult<Value> {
        self.post(
            &format!("courses/{course_id}/assignments/{assignment_id}/submissions/"),
            Some(payload),
        )
        .await
    }

    // ========================================================================
    // Lessons and resources
    // ========================================================================

    pub async fn lessons(&self, course_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("courses/{course_id}/lessons/")).await
    }

    pub async fn lesson(&self, course_id: impl Display, lesson_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("courses/{course_id}/lessons/{lesson_id}/")).await
    }

    pub async fn lesson_resources(&self, lesson_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("lessons/{lesson_id}/resources/")).await
    }

    // ========================================================================
    // Quizzes and attempts
    // ========================================================================

    pub async fn quizzes(&self, course_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("courses/{course_id}/quizzes/")).await
    }

    pub async fn quiz(&self, quiz_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("quizzes/{quiz_id}/")).await
    }

    pub async fn attempts(&self, quiz_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("quizzes/{quiz_id}/attempts/")).await
    }

    pub async fn attempt(&self, attempt_id: impl Display) -> ClientResult<Value> {
        self.get(&format!("attempts/{attempt_id}/")).await
    }

    pub async fn start_attempt(&self, quiz_id: impl Display) -> ClientResult<Value> {
        self.post(&format!("quizzes/{quiz_id}/attempts/start/"), None).await
    }

    pub async fn submit_attempt(&self, attempt_id: impl Display, payload: &Value) -> ClientResult<Value> {
        self.post(&format!("attempts/{attempt_id}/submit/"), Some(payload)).await
    }

    // ========================================================================
    // Messages and notifications
    // ========================================================================

    pub async fn messages(&self) -> ClientResult<Value> {
        self.get("messages/").await
    }

    pub async fn send_message(&self, payload: &Value) -> ClientResult<Value> {
        self.post("messages/", Some(payload)).await
    }

    pub async fn notifications(&self) -> ClientResult<Value> {
        self.get("notifications/").await
    }

    pub async fn mark_notification_read(&self, id: impl Display) -> ClientResult<Value> {
        self.post(&format!("notifications/{id}/mark_read/"), None).await
    }
}
