//! Application Context
//!
//! Shared handles provided via Leptos Context API.

use std::rc::Rc;

use board_sync::{BoardSync, EntityId};
use leptos::prelude::*;

use crate::commands::BridgeClient;
use crate::realtime::RealtimeDriver;
use crate::store::{AppStateStoreFields, AppStore};

pub type BoardEngine = BoardSync<BridgeClient>;

/// Engine and push channel, reachable from any component
#[derive(Clone, Copy)]
pub struct AppContext {
    engine: StoredValue<Rc<BoardEngine>, LocalStorage>,
    realtime: StoredValue<Rc<RealtimeDriver>, LocalStorage>,
    app: AppStore,
}

impl AppContext {
    pub fn new(engine: Rc<BoardEngine>, realtime: Rc<RealtimeDriver>, app: AppStore) -> Self {
        Self {
            engine: StoredValue::new_local(engine),
            realtime: StoredValue::new_local(realtime),
            app,
        }
    }

    pub fn engine(&self) -> Rc<BoardEngine> {
        self.engine.get_value()
    }

    pub fn realtime(&self) -> Rc<RealtimeDriver> {
        self.realtime.get_value()
    }

    /// Open (or close, with `None`) the card detail panel
    pub fn set_open_card(&self, id: Option<EntityId>) {
        self.engine().set_open_card(id.clone());
        self.app.open_card().set(id);
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
