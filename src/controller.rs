//! Run controller: bridges UI commands to the backend client.
//!
//! Holds at most one in-flight check and emits the resolved outcome back to the
//! presentation layer. The session's gate keeps a second submit from arriving
//! while one is unresolved; a command that slips through anyway is dropped.

use crate::client::MentionClient;
use crate::model::{AppEvent, Outcome, UiCommand, CONNECTIVITY_ERROR};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub async fn run_controller(
    client: MentionClient,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: Option<JoinHandle<Outcome>> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(req)) => {
                        if in_flight.is_some() {
                            tracing::debug!("submit command dropped: check already in flight");
                            continue;
                        }
                        tracing::debug!(brand = %req.brand, "starting check");
                        let client = client.clone();
                        in_flight =
                            Some(tokio::spawn(async move { client.check(&req).await }));
                    }
                    // Quit does not wait for an unresolved check: there is no
                    // cancellation protocol, so the request is simply abandoned
                    // with the process.
                    Some(UiCommand::Quit) | None => break,
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it
            // can be dropped if another select branch is chosen, and we'll
            // never observe completion.
            maybe_done = async {
                match in_flight.as_mut() {
                    Some(handle) => Some(handle.await),
                    None => futures::future::pending().await,
                }
            } => {
                if let Some(join_res) = maybe_done {
                    in_flight = None;
                    let outcome = match join_res {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::warn!(error = %e, "check task failed to join");
                            Outcome::TransportFailure {
                                message: CONNECTIVITY_ERROR.to_string(),
                            }
                        }
                    };
                    let _ = event_tx.send(AppEvent::Resolved(outcome));
                }
            }
        }
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckRequest;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// One-shot backend answering any request with a fixed success body.
    async fn spawn_backend() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 16 * 1024];
            let mut read_total = 0;
            loop {
                if read_total == buf.len() {
                    buf.resize(buf.len() * 2, 0);
                }
                match sock.read(&mut buf[read_total..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => read_total += n,
                }
                let Some(header_end) = buf[..read_total]
                    .windows(4)
                    .position(|w| w == b"\r\n\r\n")
                else {
                    continue;
                };
                let headers = String::from_utf8_lossy(&buf[..header_end]);
                let content_length = headers
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if read_total >= header_end + 4 + content_length {
                    break;
                }
            }
            let body = r#"{"prompt":"p","brand":"b","mentioned":true,"position":1}"#;
            let resp = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_submit_command_round_trips_to_resolved_event() {
        let base_url = spawn_backend().await;
        let client = MentionClient::new(&crate::model::RunConfig {
            base_url,
            user_agent: "brand-mention-cli/test".to_string(),
            export_csv: None,
            initial_brand: None,
        })
        .expect("client");

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let controller = tokio::spawn(run_controller(client, event_tx, cmd_rx));

        cmd_tx
            .send(UiCommand::Submit(CheckRequest {
                prompt: "p".into(),
                brand: "b".into(),
            }))
            .expect("send submit");

        let ev = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("event within deadline")
            .expect("channel open");
        let AppEvent::Resolved(outcome) = ev;
        assert!(matches!(outcome, Outcome::Success { .. }));

        cmd_tx.send(UiCommand::Quit).expect("send quit");
        tokio::time::timeout(Duration::from_secs(5), controller)
            .await
            .expect("controller exits")
            .expect("join")
            .expect("controller result");
    }

    #[tokio::test]
    async fn test_closed_command_channel_stops_controller() {
        let client = MentionClient::new(&crate::model::RunConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            user_agent: "brand-mention-cli/test".to_string(),
            export_csv: None,
            initial_brand: None,
        })
        .expect("client");

        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
        let controller = tokio::spawn(run_controller(client, event_tx, cmd_rx));
        drop(cmd_tx);

        tokio::time::timeout(Duration::from_secs(5), controller)
            .await
            .expect("controller exits")
            .expect("join")
            .expect("controller result");
    }
}
