use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::api::events::LiveFrame;
use crate::api::models::Message;
use crate::error::ClientError;

/// Fixed delay between a dropped socket and the next connection attempt.
/// No backoff, no jitter, no retry cap.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle for the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Terminal: no connection and none scheduled.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Frames flowing.
    Open,
    /// Socket dropped; the retry timer is running.
    RetryScheduled,
}

/// Everything that can move the link between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    HandshakeOk,
    HandshakeFailed,
    SocketDropped,
    /// The retry timer fired; authentication is re-read at this moment,
    /// not captured when the timer was armed.
    RetryTick { authed: bool },
    Teardown,
}

impl LinkState {
    /// Pure transition function; the I/O loop in [`run`] drives it.
    pub fn advance(self, event: LinkEvent) -> Self {
        match (self, event) {
            (Self::Connecting, LinkEvent::HandshakeOk) => Self::Open,
            (Self::Connecting, LinkEvent::HandshakeFailed) => Self::RetryScheduled,
            (Self::Open, LinkEvent::SocketDropped) => Self::RetryScheduled,
            (Self::RetryScheduled, LinkEvent::RetryTick { authed: true }) => Self::Connecting,
            (Self::RetryScheduled, LinkEvent::RetryTick { authed: false }) => Self::Disconnected,
            (_, LinkEvent::Teardown) => Self::Disconnected,
            (state, _) => state,
        }
    }
}

/// Why a live frame was not delivered. Only visible through the diagnostic
/// hook; behavior stays a silent drop either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDrop {
    /// Parsed fine but was not a message event for the active room.
    Filtered,
    /// Not valid JSON for a live frame.
    Malformed,
}

/// Optional observer for dropped frames, for tests and debugging.
pub type DropHook = Arc<dyn Fn(FrameDrop) + Send + Sync>;

/// Parameters for one subscription: where, as whom, which room.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub ws_base: String,
    pub token: String,
    pub room: String,
}

impl Subscription {
    /// The upgrade endpoint, with token and room carried as encoded query
    /// parameters.
    fn endpoint(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/ws", self.ws_base))?;
        url.query_pairs_mut()
            .append_pair("token", &self.token)
            .append_pair("room", &self.room);
        Ok(url)
    }
}

/// Handle to a running subscription. Exactly one exists per client; closing
/// it (room switch, logout, shutdown) is the only way the loop ends besides
/// the authentication recheck.
pub struct LiveHandle {
    task: JoinHandle<()>,
}

impl LiveHandle {
    /// Tears the connection down. Aborting the task drops the socket, which
    /// closes it; no further retry is scheduled.
    pub fn close(self) {
        self.task.abort();
    }
}

/// Opens the live feed for a room and spawns the reconnect loop.
///
/// Accepted frames are pushed into `events` ready for the history append;
/// `authed` is re-read at every retry tick so a logout during the delay ends
/// the loop instead of reconnecting.
pub fn subscribe(
    sub: &Subscription,
    authed: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<Message>,
    hook: Option<DropHook>,
) -> Result<LiveHandle, ClientError> {
    let endpoint = sub.endpoint()?;
    let room = sub.room.clone();
    let task = tokio::spawn(run(endpoint, room, authed, events, hook));
    Ok(LiveHandle { task })
}

async fn run(
    endpoint: Url,
    room: String,
    authed: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<Message>,
    hook: Option<DropHook>,
) {
    let mut state = LinkState::Connecting;
    loop {
        state = match state {
            LinkState::Connecting => match connect_async(endpoint.as_str()).await {
                Ok((stream, _)) => {
                    log::info!("live feed open for #{room}");
                    let opened = state.advance(LinkEvent::HandshakeOk);
                    opened.advance(drive(stream, &room, &events, hook.as_ref()).await)
                }
                Err(e) => {
                    log::debug!("live feed connect failed: {e}");
                    state.advance(LinkEvent::HandshakeFailed)
                }
            },
            LinkState::RetryScheduled => {
                tokio::time::sleep(RETRY_DELAY).await;
                state.advance(LinkEvent::RetryTick { authed: *authed.borrow() })
            }
            LinkState::Open | LinkState::Disconnected => break,
        };
    }
    log::debug!("live feed stopped for #{room}");
}

/// The Open state: reads frames until the socket closes or errors, returning
/// the event that ends it. Socket errors never surface to the user; they
/// only feed the reconnect machine.
async fn drive(
    mut stream: WsStream,
    room: &str,
    events: &mpsc::UnboundedSender<Message>,
    hook: Option<&DropHook>,
) -> LinkEvent {
    while let Some(next) = stream.next().await {
        match next {
            Ok(WsMessage::Text(text)) => match LiveFrame::parse(&text) {
                Ok(frame) if frame.accepts(room) => {
                    if events.send(frame.into_message()).is_err() {
                        // Receiver gone: the frontend has shut down.
                        return LinkEvent::Teardown;
                    }
                }
                Ok(frame) => {
                    log::debug!("dropping {} frame for #{}", frame.kind, frame.room);
                    notify(hook, FrameDrop::Filtered);
                }
                Err(e) => {
                    log::debug!("dropping malformed frame: {e}");
                    notify(hook, FrameDrop::Malformed);
                }
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                log::debug!("live feed error: {e}");
                break;
            }
        }
    }
    LinkEvent::SocketDropped
}

fn notify(hook: Option<&DropHook>, drop: FrameDrop) {
    if let Some(hook) = hook {
        hook(drop);
    }
}
