//! Scripted in-process `AuthApi` for driving the controller in tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use authsession_core::{AccessToken, AuthApi, Credentials, Error, Result, TokenPair, UserProfile};

pub const EMAIL: &str = "test@test.com";
pub const PASSWORD: &str = "password123";

/// Accepts `EMAIL`/`PASSWORD`, issuing `login_token`. Tokens listed in
/// `valid` are accepted by `fetch_current_user`.
pub struct FakeApi {
    login_token: Mutex<String>,
    login_error: Mutex<Option<Error>>,
    refresh_result: Mutex<Result<TokenPair>>,
    user_error: Mutex<Option<Error>>,
    valid: Mutex<HashSet<String>>,
    unrenewable: Mutex<HashSet<String>>,
    refreshed: Mutex<Vec<String>>,
    delay: Duration,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            login_token: Mutex::new("tok-1".to_string()),
            login_error: Mutex::new(None),
            refresh_result: Mutex::new(Ok(TokenPair::bearer("tok-2"))),
            user_error: Mutex::new(None),
            valid: Mutex::new(HashSet::from(["tok-1".to_string()])),
            unrenewable: Mutex::new(HashSet::new()),
            refreshed: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            user_calls: AtomicUsize::new(0),
        }
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn issue(&self, token: &str) {
        *self.login_token.lock().unwrap() = token.to_string();
        self.valid.lock().unwrap().insert(token.to_string());
    }

    pub fn fail_login(&self, err: Error) {
        *self.login_error.lock().unwrap() = Some(err);
    }

    pub fn fail_user(&self, err: Error) {
        *self.user_error.lock().unwrap() = Some(err);
    }

    pub fn refresh_with(&self, result: Result<TokenPair>) {
        *self.refresh_result.lock().unwrap() = result;
    }

    /// Refreshing `token` fails with `RefreshRejected`.
    pub fn reject_refresh_of(&self, token: &str) {
        self.unrenewable.lock().unwrap().insert(token.to_string());
    }

    /// Tokens passed to `refresh`, in call order.
    pub fn refreshed_tokens(&self) -> Vec<String> {
        self.refreshed.lock().unwrap().clone()
    }

    pub fn revoke(&self, token: &str) {
        self.valid.lock().unwrap().remove(token);
    }

    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn user_fetches(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if let Some(err) = self.login_error.lock().unwrap().clone() {
            return Err(err);
        }
        if credentials.identifier() != EMAIL || credentials.secret() != PASSWORD {
            return Err(Error::InvalidCredentials);
        }
        Ok(TokenPair::bearer(self.login_token.lock().unwrap().clone()))
    }

    async fn refresh(&self, current: &TokenPair) -> Result<TokenPair> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let token = current.access_token().as_str().to_string();
        self.refreshed.lock().unwrap().push(token.clone());
        self.pause().await;

        if self.unrenewable.lock().unwrap().contains(&token) {
            return Err(Error::RefreshRejected);
        }

        let result = self.refresh_result.lock().unwrap().clone();
        if let Ok(pair) = &result {
            self.valid
                .lock()
                .unwrap()
                .insert(pair.access_token().as_str().to_string());
        }
        result
    }

    async fn fetch_current_user(&self, token: &AccessToken) -> Result<UserProfile> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.user_error.lock().unwrap().clone() {
            return Err(err);
        }
        if !self.valid.lock().unwrap().contains(token.as_str()) {
            return Err(Error::Unauthorized);
        }
        Ok(UserProfile {
            id: 1,
            email: EMAIL.to_string(),
            display_name: Some("Test User".to_string()),
            is_active: true,
            is_superuser: false,
        })
    }
}
