//! Task Board App
//!
//! Builds the engine, wires it to the reactive store and lays out the board.

use std::rc::Rc;

use board_sync::{BoardConfig, BoardSync, StoreSignal, ToastSink};
use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use crate::commands::BridgeClient;
use crate::components::{BoardView, CardDetail, ConnectionBadge, ToastStack};
use crate::context::AppContext;
use crate::realtime::RealtimeDriver;
use crate::store::{
    store_push_toast, store_sync_board, AppState, AppStateStoreFields, StorePresence, StoreToasts,
};

#[component]
pub fn App(config: BoardConfig) -> impl IntoView {
    let app_store = Store::new(AppState::default());
    provide_context(app_store);

    let toasts: Rc<dyn ToastSink> = Rc::new(StoreToasts(app_store));
    let engine = Rc::new(BoardSync::new(BridgeClient::new(config.board_id.clone()), toasts));

    // One-way projection of the engine state
    let board = engine.store().clone();
    engine.store().subscribe(move |signal| match signal {
        StoreSignal::Changed => board.read(|state| store_sync_board(&app_store, state)),
        StoreSignal::OpenCardRemoved(id) => {
            log::info!("open card {id} removed");
            app_store.open_card().set(None);
            store_push_toast(&app_store, "The card you had open no longer exists");
        }
    });

    let realtime = RealtimeDriver::new(&config, engine.clone(), Rc::new(StorePresence(app_store)), app_store);
    provide_context(AppContext::new(engine.clone(), realtime.clone(), app_store));

    realtime.start();
    spawn_local(async move {
        // Failure already surfaced as a toast
        let _ = engine.load().await;
    });

    // Clean leave on unload
    let on_pagehide = Closure::<dyn FnMut()>::new(move || realtime.shutdown());
    let _ = window().add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref());
    on_pagehide.forget();

    view! {
        <div class="board-app">
            <header class="board-header">
                <h1>{config.board_id.clone()}</h1>
                <ConnectionBadge />
            </header>
            <BoardView />
            <CardDetail />
            <ToastStack />
        </div>
    }
}
