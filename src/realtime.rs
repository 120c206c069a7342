//! Push Channel Driver
//!
//! Owns the WebSocket and feeds its lifecycle into a `RealtimeSession`.
//! Reconnects are scheduled with gloo timers; jitter comes from
//! `Math.random`.

use std::cell::RefCell;
use std::rc::Rc;

use board_sync::{BoardConfig, ConnectionState, FrameOutcome, PresenceSink, RealtimeSession, Retry};
use leptos::task::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::context::BoardEngine;
use crate::store::{store_set_connection, AppStore};

pub struct RealtimeDriver {
    url: String,
    session: RefCell<RealtimeSession>,
    socket: RefCell<Option<WebSocket>>,
    engine: Rc<BoardEngine>,
    app: AppStore,
}

impl RealtimeDriver {
    pub fn new(
        config: &BoardConfig,
        engine: Rc<BoardEngine>,
        presence: Rc<dyn PresenceSink>,
        app: AppStore,
    ) -> Rc<Self> {
        let session = RealtimeSession::new(engine.reconciler(presence), config.backoff.clone());
        Rc::new(Self {
            url: config.realtime_url.clone(),
            session: RefCell::new(session),
            socket: RefCell::new(None),
            engine,
            app,
        })
    }

    pub fn start(self: &Rc<Self>) {
        self.publish_state();
        self.open_socket();
    }

    /// User-requested reconnect (badge button)
    pub fn reconnect(self: &Rc<Self>) {
        let requested = self.session.borrow_mut().request_reconnect();
        match requested {
            Ok(()) => {
                self.publish_state();
                self.open_socket();
            }
            Err(err) => log::debug!("reconnect ignored: {err}"),
        }
    }

    /// Close for good (board closed, page unloading)
    pub fn shutdown(&self) {
        self.session.borrow_mut().disconnect();
        self.publish_state();
        if let Some(socket) = self.socket.borrow_mut().take() {
            detach(&socket);
            let _ = socket.close();
        }
    }

    // ========================
    // Socket Lifecycle
    // ========================

    fn open_socket(self: &Rc<Self>) {
        if let Some(old) = self.socket.borrow_mut().take() {
            detach(&old);
            let _ = old.close();
        }

        let socket = match WebSocket::new(&self.url) {
            Ok(socket) => socket,
            Err(err) => {
                log::warn!("cannot open push channel: {err:?}");
                self.handle_failure();
                return;
            }
        };

        let this = Rc::clone(self);
        let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| this.handle_open());
        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let this = Rc::clone(self);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            match ev.data().as_string() {
                Some(text) => this.handle_frame(&text),
                None => log::warn!("ignoring non-text push frame"),
            }
        });
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        on_message.forget();

        let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            log::debug!("push channel error; close follows");
        });
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();

        let this = Rc::clone(self);
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
            log::info!("push channel closed (code {})", ev.code());
            this.handle_failure();
        });
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        *self.socket.borrow_mut() = Some(socket);
    }

    fn handle_open(self: &Rc<Self>) {
        let opened = self.session.borrow_mut().on_open();
        self.publish_state();
        match opened {
            Ok(true) => {
                log::info!("push channel back; resyncing board");
                let engine = Rc::clone(&self.engine);
                spawn_local(async move {
                    if let Err(err) = engine.load().await {
                        log::warn!("resync failed: {err}");
                    }
                });
            }
            Ok(false) => {}
            Err(err) => log::warn!("unexpected open: {err}"),
        }
    }

    fn handle_frame(&self, text: &str) {
        let outcome = self.session.borrow_mut().on_frame(text);
        if outcome == FrameOutcome::Dropped {
            log::debug!("frame dropped while {}", self.session.borrow().state());
        }
    }

    fn handle_failure(self: &Rc<Self>) {
        let retry = self.session.borrow_mut().on_failure(js_sys::Math::random());
        self.publish_state();
        match retry {
            Retry::After { attempt, delay } => {
                log::debug!("reconnect attempt {attempt} scheduled");
                let this = Rc::clone(self);
                spawn_local(async move {
                    gloo_timers::future::sleep(delay).await;
                    // A shutdown or manual reconnect may have happened meanwhile
                    if this.session.borrow().state() == ConnectionState::Reconnecting {
                        this.open_socket();
                    }
                });
            }
            Retry::GiveUp => {
                if let Some(socket) = self.socket.borrow_mut().take() {
                    detach(&socket);
                }
            }
            Retry::Idle => {}
        }
    }

    fn publish_state(&self) {
        let state = self.session.borrow().state();
        store_set_connection(&self.app, state);
    }
}

/// Drop handlers so a socket being replaced cannot report into the session
fn detach(socket: &WebSocket) {
    socket.set_onopen(None);
    socket.set_onmessage(None);
    socket.set_onerror(None);
    socket.set_onclose(None);
}
