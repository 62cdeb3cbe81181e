//! HTTP transport seam for push dispatch.
//!
//! Routers talk to provider APIs through the [`PushTransport`] trait so the
//! dispatch logic can be exercised in tests without a network. The production
//! implementation posts through the global pooled client.

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;

/// A raw HTTP reply: status code plus body text.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Trait for issuing push API POST requests
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// An `Err` means no response was obtained at all (transport failure);
/// non-2xx statuses come back as `Ok` replies for the caller to interpret.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// POST a form-encoded body.
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> AppResult<HttpReply>;

    /// POST a JSON body.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> AppResult<HttpReply>;
}

/// Production transport backed by the global `HTTP_CLIENT`.
pub struct ReqwestTransport;

#[async_trait]
impl PushTransport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: &[(String, String)]) -> AppResult<HttpReply> {
        let response = HTTP_CLIENT
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(HttpReply { status, body })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> AppResult<HttpReply> {
        let response = HTTP_CLIENT
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        Ok(HttpReply {
            status,
            body: text,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording transport fake for router tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One request captured by the fake.
    #[derive(Debug, Clone)]
    pub enum Recorded {
        Form {
            url: String,
            form: Vec<(String, String)>,
        },
        Json {
            url: String,
            body: serde_json::Value,
        },
    }

    /// Scripted reply: either a reply or a transport failure message.
    type Scripted = Result<HttpReply, String>;

    /// Transport fake that records every request and replays scripted replies.
    ///
    /// When the script queue is empty, the fallback reply is returned, so most
    /// tests only set the fallback once.
    pub struct RecordingTransport {
        script: Mutex<VecDeque<Scripted>>,
        fallback: Scripted,
        requests: Mutex<Vec<Recorded>>,
    }

    impl RecordingTransport {
        /// A transport that always replies with the given status and body.
        pub fn replying(status: u16, body: &str) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Ok(HttpReply {
                    status,
                    body: body.to_string(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A transport where every request fails without a response.
        pub fn failing(message: &str) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue one scripted reply ahead of the fallback.
        pub fn push_reply(&self, status: u16, body: &str) {
            self.script.lock().unwrap().push_back(Ok(HttpReply {
                status,
                body: body.to_string(),
            }));
        }

        /// All requests seen so far.
        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn next_reply(&self) -> AppResult<HttpReply> {
            let scripted = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            scripted.map_err(|message| AppError::Transport { message })
        }
    }

    #[async_trait]
    impl PushTransport for RecordingTransport {
        async fn post_form(&self, url: &str, form: &[(String, String)]) -> AppResult<HttpReply> {
            self.requests.lock().unwrap().push(Recorded::Form {
                url: url.to_string(),
                form: form.to_vec(),
            });
            self.next_reply()
        }

        async fn post_json(&self, url: &str, body: &serde_json::Value) -> AppResult<HttpReply> {
            self.requests.lock().unwrap().push(Recorded::Json {
                url: url.to_string(),
                body: body.clone(),
            });
            self.next_reply()
        }
    }
}
