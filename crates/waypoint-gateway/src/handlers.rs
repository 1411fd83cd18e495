pub mod entries;
pub mod health;
pub mod redirect;
pub mod sign_in;

pub use entries::{create_entry_handler, list_entries_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use sign_in::{auth_callback_handler, sign_in_handler};
