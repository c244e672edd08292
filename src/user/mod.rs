//! Users of the app: the domain types, database queries and the admin pages
//! for managing the members of the family.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_user_endpoint, get_new_user_page};
pub use db::{
    count_users, create_user, create_user_table, delete_user, get_all_users, get_user_by_email,
    get_user_by_id, update_password, update_user,
};
pub use delete::delete_user_endpoint;
pub use domain::{Email, NewUser, User, UserID, normalize_full_name};
pub use edit::{get_edit_user_page, update_user_endpoint};
pub use list::get_users_page;
