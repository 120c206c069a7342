//! UI Components
//!
//! Leptos components for the board. All writes go through the engine; the
//! components only read the reactive projection.

mod board_view;
mod card_detail;
mod card_item;
mod connection_badge;
mod delete_confirm_button;
mod list_column;
mod new_card_form;
mod toast_stack;

pub use board_view::BoardView;
pub use card_detail::CardDetail;
pub use card_item::CardItem;
pub use connection_badge::ConnectionBadge;
pub use delete_confirm_button::DeleteConfirmButton;
pub use list_column::ListColumn;
pub use new_card_form::{NewCardForm, NewListForm};
pub use toast_stack::ToastStack;
