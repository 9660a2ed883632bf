#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Exchange;
use super::Pipeline;
use crate::domain::models::Action;
use crate::domain::models::Event;

fn send_event(tx: &mpsc::UnboundedSender<Event>, event: Event) {
    if tx.send(event).is_err() {
        tracing::debug!("UI has gone away, dropping event");
    }
}

/// Runs remote work requested by the UI and reports back through events.
/// Each session has at most one request in flight, tracked so that closing
/// the session can cancel it.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        exchange: Exchange,
        pipeline: Pipeline,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let mut workers: HashMap<String, JoinHandle<()>> = HashMap::new();

        while let Some(action) = rx.recv().await {
            workers.retain(|_, worker| return !worker.is_finished());

            let worker_tx = tx.clone();
            match action {
                Action::AbandonSession(id) => {
                    if let Some(worker) = workers.remove(&id) {
                        tracing::debug!(id = id, "Abandoning in-flight request");
                        worker.abort();
                    }
                }
                Action::LoadAvailableYears() => {
                    let pipeline = pipeline.clone();
                    tokio::spawn(async move {
                        let years = pipeline.available_years().await;
                        send_event(&worker_tx, Event::AvailableYears(years));
                    });
                }
                Action::LoadParticipants(id, epoch, year) => {
                    let pipeline = pipeline.clone();
                    tokio::spawn(async move {
                        let participants = pipeline.participants(year).await;
                        send_event(&worker_tx, Event::Participants(id, epoch, participants));
                    });
                }
                Action::RequestProcessing() => {
                    let pipeline = pipeline.clone();
                    tokio::spawn(async move {
                        let res = pipeline
                            .request_processing()
                            .await
                            .map_err(|err| return err.to_string());
                        send_event(&worker_tx, Event::ProcessingFinished(res));
                    });
                }
                Action::BindIdentities(pending) => {
                    let exchange = exchange.clone();
                    let id = pending.session_id.to_string();
                    let worker = tokio::spawn(async move {
                        let refusal = exchange.notify_binding(&pending).await;
                        send_event(&worker_tx, Event::IdentitiesBound(pending, refusal));
                    });
                    workers.insert(id, worker);
                }
                Action::StartSession(turn) => {
                    let exchange = exchange.clone();
                    let id = turn.session_id.to_string();
                    let worker = tokio::spawn(async move {
                        let failure = exchange.prepare(&turn).await;
                        send_event(&worker_tx, Event::SessionStarted(turn, failure));
                    });
                    workers.insert(id, worker);
                }
                Action::SendMessage(turn) => {
                    let exchange = exchange.clone();
                    let id = turn.session_id.to_string();
                    let worker = tokio::spawn(async move {
                        let reply = exchange.round_trip(&turn).await;
                        send_event(&worker_tx, Event::ChatReply(turn, reply));
                    });
                    workers.insert(id, worker);
                }
            }
        }

        for (_, worker) in workers {
            worker.abort();
        }

        return Ok(());
    }
}
