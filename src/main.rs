mod api;
mod app;
mod config;
mod error;
mod live;
mod session;
mod utils;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use crate::api::{ApiClient, DEFAULT_LIMIT, Message};
use crate::app::AppState;
use crate::config::Config;
use crate::live::{LiveHandle, Subscription};
use crate::session::{ChatState, Session};

const DEFAULT_ROOM: &str = "global";

/// Line-oriented frontend: stdin commands in, messages and the transient
/// error line out. All state changes go through `SessionClient`-shaped calls
/// on `ApiClient`, `Session` and `ChatState`.
struct Frontend {
    config: Config,
    app: AppState,
    session: Session,
    chat: ChatState,
    api: ApiClient,
    authed: watch::Sender<bool>,
    events_tx: mpsc::UnboundedSender<Message>,
    live: Option<LiveHandle>,
}

impl Frontend {
    async fn run(mut self, mut events_rx: mpsc::UnboundedReceiver<Message>) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if !self.handle_line(line).await {
                            break;
                        }
                    }
                    Ok(None) | Err(_) => break,
                },
                Some(message) = events_rx.recv() => self.deliver(message),
            }
        }
        // Unmount: the one live connection goes down with the frontend.
        if let Some(live) = self.live.take() {
            live.close();
        }
    }

    /// Returns false when the user asked to quit.
    async fn handle_line(&mut self, line: String) -> bool {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            match parts.next() {
                Some("register") => match (parts.next(), parts.next(), parts.next()) {
                    (Some(user), Some(email), Some(pass)) => {
                        self.register(user, email, pass).await;
                    }
                    _ => println!("usage: /register <username> <email> <password>"),
                },
                Some("login") => match (parts.next(), parts.next()) {
                    (Some(user), Some(pass)) => self.login(user, pass, false).await,
                    _ => println!("usage: /login <username> <password>"),
                },
                Some("room") => match parts.next() {
                    Some(room) => self.enter_room(room).await,
                    None => println!("usage: /room <name>"),
                },
                Some("logout") => self.logout(),
                Some("quit") => return false,
                Some("help") | None => self.print_help(),
                Some(other) => println!("unknown command: /{other}"),
            }
        } else {
            self.send(line).await;
        }
        true
    }

    async fn register(&mut self, username: &str, email: &str, password: &str) {
        self.chat.clear_error();
        match self.api.register(username, email, password).await {
            // Fresh accounts go straight to a silent login with the same
            // credentials.
            Ok(()) => self.login(username, password, true).await,
            Err(e) => self.show_error(e.to_string()),
        }
    }

    async fn login(&mut self, username: &str, password: &str, silent: bool) {
        if !silent {
            self.chat.clear_error();
        }
        match self.api.login(username, password).await {
            Ok(token) => {
                if let Err(e) = self.app.store_token(token.clone()) {
                    log::warn!("could not persist token: {e}");
                }
                self.session.set_token(token);
                let _ = self.authed.send(true);
                self.chat.clear_error();
                println!("logged in as {username}");
                let room = self.chat.room().to_string();
                self.enter_room(&room).await;
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    fn logout(&mut self) {
        if let Some(live) = self.live.take() {
            live.close();
        }
        let _ = self.authed.send(false);
        if let Err(e) = self.app.clear_token() {
            log::warn!("could not clear token slot: {e}");
        }
        self.session.clear();
        self.chat.reset();
        println!("logged out");
    }

    /// Tears down the old subscription, loads history, resubscribes. History
    /// fetch and the live feed are not ordered against each other; the room
    /// gate on append keeps both paths consistent.
    async fn enter_room(&mut self, room: &str) {
        if let Some(live) = self.live.take() {
            live.close();
        }
        self.chat.switch_room(room);
        println!("-- #{room} --");
        match self.api.fetch_messages(room, DEFAULT_LIMIT).await {
            Ok(messages) => {
                self.chat.replace_history(room, messages);
                for message in self.chat.messages() {
                    Self::render(message);
                }
            }
            Err(e) => self.show_error(e.to_string()),
        }
        if let Some(token) = self.session.token() {
            let sub = Subscription {
                ws_base: self.config.ws_base.clone(),
                token: token.to_string(),
                room: room.to_string(),
            };
            match live::subscribe(&sub, self.authed.subscribe(), self.events_tx.clone(), None) {
                Ok(handle) => self.live = Some(handle),
                Err(e) => self.show_error(e.to_string()),
            }
        }
    }

    async fn send(&mut self, content: String) {
        let Some(token) = self.session.token().map(str::to_string) else {
            println!("log in first: /login <username> <password>");
            return;
        };
        if !self.chat.stage_draft(content) {
            // Whitespace-only input never reaches the network.
            return;
        }
        let room = self.chat.room().to_string();
        match self.api.send_message(&token, &room, self.chat.draft()).await {
            Ok(message) => {
                self.chat.clear_draft();
                self.deliver(message);
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    fn deliver(&mut self, message: Message) {
        if self.chat.append(message) {
            if let Some(last) = self.chat.messages().last() {
                Self::render(last);
            }
        }
    }

    fn render(message: &Message) {
        println!("[{}] <{}> {}", message.created_at, message.user_id, message.content);
    }

    fn show_error(&mut self, message: String) {
        self.chat.set_error(message);
        if let Some(error) = self.chat.error() {
            println!("! {error}");
        }
    }

    fn print_help(&self) {
        println!(
            "commands: /register <user> <email> <pass>, /login <user> <pass>, /room <name>, /logout, /quit"
        );
        println!("anything else is sent to #{}", self.chat.room());
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env();
    println!("chatline - api {} - ws {}", config.api_base, config.ws_base);

    let app = AppState::load();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (authed, _) = watch::channel(app.token.is_some());

    let session = Session::new(app.token.clone());
    let api = ApiClient::new(config.api_base.clone());
    let mut frontend = Frontend {
        config,
        app,
        session,
        chat: ChatState::new(DEFAULT_ROOM),
        api,
        authed,
        events_tx,
        live: None,
    };

    frontend.print_help();
    if frontend.session.authenticated() {
        frontend.enter_room(DEFAULT_ROOM).await;
    }
    frontend.run(events_rx).await;
}
