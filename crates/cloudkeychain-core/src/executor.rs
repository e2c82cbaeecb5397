//! Async access through a dedicated secure-storage thread
//!
//! Provider calls block. `SerialExecutor` moves them onto one worker thread
//! so async callers never block their runtime, and every provider access in
//! the process runs in submission order.

use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use futures::channel::oneshot;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::secrets::SecretStore;

type Job = Box<dyn FnOnce(&SecretStore) + Send>;

/// Errors from the executor itself, never from the provider
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to spawn secure-storage worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Secure-storage worker has stopped")]
    Stopped,
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Async counterpart of the store's boolean/optional API
#[async_trait]
pub trait AsyncSecretStore: Send + Sync {
    async fn store(&self, payload: &str, account: &str, service_name: &str) -> bool;

    async fn retrieve(&self, account: &str) -> Option<String>;

    async fn delete(&self, account: &str, service_name: &str) -> bool;
}

/// Handle to the worker thread owning a `SecretStore`
///
/// Cloning the handle shares the worker. The worker exits once every handle
/// is dropped and the queue has drained.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cloudkeychain_core::config::KeychainConfig;
/// use cloudkeychain_core::executor::{AsyncSecretStore, SerialExecutor};
/// use cloudkeychain_core::providers::MemoryProvider;
/// use cloudkeychain_core::secrets::SecretStore;
///
/// let config = KeychainConfig::new("group", "com.example.App").unwrap();
/// let store = SecretStore::new(config, Arc::new(MemoryProvider::new()));
/// let executor = SerialExecutor::spawn(Arc::new(store)).unwrap();
///
/// futures::executor::block_on(async {
///     assert!(executor.store("sk-test", "alice", "openai").await);
///     assert_eq!(executor.retrieve("alice").await, Some("sk-test".to_string()));
/// });
/// ```
#[derive(Clone)]
pub struct SerialExecutor {
    sender: mpsc::UnboundedSender<Job>,
}

impl SerialExecutor {
    /// Start the worker thread for `store`
    pub fn spawn(store: Arc<SecretStore>) -> ExecutorResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        thread::Builder::new()
            .name("cloudkeychain-io".to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    job(&store);
                }
            })?;
        Ok(Self { sender })
    }

    /// Run `f` on the worker and await its result
    pub async fn run<R, F>(&self, f: F) -> ExecutorResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&SecretStore) -> R + Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        self.sender
            .send(Box::new(move |store| {
                let _ = reply.send(f(store));
            }))
            .map_err(|_| ExecutorError::Stopped)?;
        result.await.map_err(|_| ExecutorError::Stopped)
    }

    /// Whether the worker still accepts jobs
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl std::fmt::Debug for SerialExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialExecutor")
            .field("running", &self.is_running())
            .finish()
    }
}

#[async_trait]
impl AsyncSecretStore for SerialExecutor {
    async fn store(&self, payload: &str, account: &str, service_name: &str) -> bool {
        let (payload, account, service_name) =
            (payload.to_string(), account.to_string(), service_name.to_string());
        self.run(move |store| store.store(&payload, &account, &service_name))
            .await
            .unwrap_or(false)
    }

    async fn retrieve(&self, account: &str) -> Option<String> {
        let account = account.to_string();
        self.run(move |store| store.retrieve(&account))
            .await
            .ok()
            .flatten()
    }

    async fn delete(&self, account: &str, service_name: &str) -> bool {
        let (account, service_name) = (account.to_string(), service_name.to_string());
        self.run(move |store| store.delete(&account, &service_name))
            .await
            .unwrap_or(false)
    }
}
