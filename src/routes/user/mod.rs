mod handler;

pub use handler::{create_users, delete_users, get_user, list_users, update_users};
