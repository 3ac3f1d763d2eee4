// crewline/server/src/web/handlers/ws_handlers.rs

//! WebSocket chat endpoint.
//!
//! Each connection gets three tasks: the receive loop (this handler's spawned
//! task), a writer that owns outbound delivery, and a worker that runs queued
//! requests one at a time. The receive loop never awaits a pipeline, so it
//! keeps acknowledging messages and answering pings while a run is active.
//! Requests that arrive during a run wait in a bounded FIFO queue; when the
//! queue is full the request is refused with an error frame.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use crewline::{Crew, StageHooks};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{InboundMessage, OutboundFrame};
use crate::state::AppState;

pub type FrameSender = mpsc::UnboundedSender<OutboundFrame>;

pub async fn ws_handler(
  req: HttpRequest,
  body: web::Payload,
  app_state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
  let (response, session, msg_stream) = actix_ws::handle(&req, body)?;

  let peer = req.peer_addr().map(|addr| addr.to_string());
  let connection_id = app_state.connections.register(peer);
  let span = info_span!("ws_connection", %connection_id);
  actix_web::rt::spawn(serve_connection(app_state.get_ref().clone(), connection_id, session, msg_stream).instrument(span));

  Ok(response)
}

async fn serve_connection(state: AppState, connection_id: Uuid, session: Session, mut msg_stream: MessageStream) {
  let (frames_tx, frames_rx) = mpsc::unbounded_channel::<OutboundFrame>();
  let writer = actix_web::rt::spawn(write_frames(session.clone(), frames_rx).in_current_span());

  let (requests_tx, requests_rx) = mpsc::channel::<String>(state.config.max_queued_requests);
  actix_web::rt::spawn(run_requests(state.crew.clone(), requests_rx, frames_tx.clone()).in_current_span());

  let _ = frames_tx.send(OutboundFrame::connected());

  let mut session = session;
  while let Some(msg) = msg_stream.next().await {
    match msg {
      Ok(Message::Text(text)) => {
        debug!(len = text.len(), "Received WebSocket message.");
        accept_text(&text, &requests_tx, &frames_tx);
      }
      Ok(Message::Ping(bytes)) => {
        if session.pong(&bytes).await.is_err() {
          break;
        }
      }
      Ok(Message::Close(reason)) => {
        debug!(?reason, "Client closed the connection.");
        break;
      }
      Ok(Message::Binary(_)) => {
        let _ = frames_tx.send(OutboundFrame::error("Invalid message format"));
      }
      Ok(_) => {}
      Err(e) => {
        warn!(error = %e, "WebSocket protocol error.");
        break;
      }
    }
  }

  // Closing the queue lets the worker exit after its in-flight run; stopping
  // the writer makes it discard that run's result.
  drop(requests_tx);
  writer.abort();
  state.connections.unregister(&connection_id);
  let _ = session.close(None).await;
}

/// Validates one inbound text frame and queues it. Always answers with exactly
/// one frame: an ack when the request was queued, an error otherwise.
pub fn accept_text(raw: &str, requests: &mpsc::Sender<String>, frames: &FrameSender) {
  let text = match InboundMessage::parse(raw) {
    Ok(text) => text,
    Err(e) => {
      debug!(error = %e, "Rejected inbound message.");
      let _ = frames.send(OutboundFrame::error(client_text(&e)));
      return;
    }
  };

  match requests.try_reserve() {
    Ok(permit) => {
      // Ack first, so it precedes every frame the run produces.
      let _ = frames.send(OutboundFrame::ack());
      permit.send(text);
    }
    Err(TrySendError::Full(())) => {
      warn!("Request queue full; refusing message.");
      let _ = frames.send(OutboundFrame::error(
        "Too many messages are waiting; please wait for the current answer.",
      ));
    }
    Err(TrySendError::Closed(())) => {
      let _ = frames.send(OutboundFrame::error("The connection is shutting down."));
    }
  }
}

fn client_text(err: &AppError) -> String {
  match err {
    AppError::Validation(m) => m.clone(),
    AppError::MalformedMessage(_) => "Invalid message format".to_string(),
    other => format!("Error processing message: {}", other),
  }
}

/// Runs queued requests one at a time until the queue closes. A run whose
/// connection has gone away still completes; its answer is dropped.
pub async fn run_requests(crew: Arc<Crew>, mut requests: mpsc::Receiver<String>, frames: FrameSender) {
  while let Some(text) = requests.recv().await {
    if frames.is_closed() {
      debug!("Connection gone; skipping queued request.");
      break;
    }

    let mut hooks = StageHooks::new();
    let before = frames.clone();
    let after = frames.clone();
    hooks
      .before_stage(move |event| {
        let _ = before.send(OutboundFrame::progress(event));
      })
      .after_stage(move |event| {
        let _ = after.send(OutboundFrame::progress(event));
      });

    let frame = match crew.dispatch(text, hooks).await {
      Ok(run) => {
        info!(run_id = run.id(), state = %run.state(), "Run answered.");
        OutboundFrame::from_run(&run)
      }
      Err(e) => {
        error!(error = %e, "Pipeline task did not complete.");
        OutboundFrame::error(format!("Error processing message: {}", e))
      }
    };
    if frames.send(frame).is_err() {
      debug!("Connection gone; discarding run result.");
    }
  }
  debug!("Request worker finished.");
}

async fn write_frames(mut session: Session, mut frames: mpsc::UnboundedReceiver<OutboundFrame>) {
  while let Some(frame) = frames.recv().await {
    if let Err(e) = session.text(frame.to_json()).await {
      debug!(error = ?e, "Session closed; writer stopping.");
      break;
    }
  }
}
