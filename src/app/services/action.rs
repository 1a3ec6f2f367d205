#[cfg(test)]
#[path = "action_test.rs"]
mod tests;

use std::sync::Arc;

use crate::backend::ArcBackend;
use crate::config::load_api_key;
use crate::models::{
    Action, ArcEventTx, Event, GenerationOutcome, GenerationRequest, NoticeMessage,
};
use eyre::Result;
use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;

/// Runs the remote calls off the interactive loop. Every result comes back
/// to the loop as an [`Event`].
pub struct ActionService<'a> {
    event_tx: ArcEventTx,
    action_rx: &'a mut mpsc::UnboundedReceiver<Action>,
    cancel_token: CancellationToken,
    backend: ArcBackend,
}

impl ActionService<'_> {
    pub fn new(
        event_tx: ArcEventTx,
        action_rx: &'_ mut mpsc::UnboundedReceiver<Action>,
        backend: ArcBackend,
        cancel_token: CancellationToken,
    ) -> ActionService<'_> {
        ActionService {
            cancel_token,
            event_tx,
            action_rx,
            backend,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        let mut workers: JoinSet<Result<()>> = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    log::debug!("Action service cancelled");
                    workers.shutdown().await;
                    return Ok(());
                }

                Some(res) = workers.join_next(), if !workers.is_empty() => {
                    match res {
                        Ok(Err(err)) => log::error!("Worker failed: {}", err),
                        Err(err) => log::error!("Worker panicked: {}", err),
                        Ok(Ok(_)) => {}
                    }
                }

                action = self.action_rx.recv() => {
                    let Some(action) = action else {
                        log::debug!("Action channel closed");
                        return Ok(());
                    };

                    match action {
                        Action::Generate(req) => {
                            let backend = Arc::clone(&self.backend);
                            let worker_tx = Arc::clone(&self.event_tx);
                            workers.spawn(async move {
                                let outcome = generate(&backend, req).await;
                                worker_tx.send(Event::GenerationCompleted(outcome)).await?;
                                Ok(())
                            });
                        }

                        Action::ReloadCredential(path) => {
                            self.reload_credential(&path).await;
                        }
                    }
                }
            }
        }
    }

    async fn reload_credential(&self, path: &str) {
        let notice = match load_api_key(path) {
            Ok(key) => {
                self.backend.set_api_key(&key).await;
                NoticeMessage::info(format!("API key reloaded from {}", path))
            }
            Err(err) => {
                log::error!("Failed to reload API key: {}", err);
                NoticeMessage::error(format!("Failed to reload API key: {}", err))
            }
        };
        self.send_notice(notice).await;
    }

    async fn send_notice(&self, notice: NoticeMessage) {
        self.event_tx
            .send(Event::Notice(notice))
            .await
            .unwrap_or_else(|err| {
                log::error!("Failed to send notice: {}", err);
            });
    }
}

/// Points the backend at the requested model and instruction, then asks
/// for the reply. Never fails: errors travel inside the outcome.
pub async fn generate(backend: &ArcBackend, req: GenerationRequest) -> GenerationOutcome {
    let GenerationRequest {
        conversation_id,
        history,
        prompt,
        system_instruction,
        params,
    } = req;

    backend
        .configure(params.model(), Some(system_instruction))
        .await;

    log::debug!(
        "Generating reply for conversation {} with {}",
        conversation_id,
        params
    );
    let result = backend
        .generate(&history, &prompt, params.temperature(), params.top_p())
        .await;
    if let Err(err) = &result {
        log::error!("Generation failed for conversation {}: {}", conversation_id, err);
    }

    GenerationOutcome {
        conversation_id,
        result,
    }
}
