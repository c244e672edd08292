//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The route for downloading the filtered transactions as a CSV file.
pub const TRANSACTIONS_CSV: &str = "/transactions/export.csv";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for listing the users in the family.
pub const USERS_VIEW: &str = "/users";
/// The page for creating a new user.
pub const NEW_USER_VIEW: &str = "/users/new";
/// The page for editing an existing user.
pub const EDIT_USER_VIEW: &str = "/users/{user_id}/edit";
/// The page for downloading data as CSV files.
pub const EXPORT_VIEW: &str = "/export";
/// The route for downloading all transactions as a CSV file.
pub const EXPORT_TRANSACTIONS_CSV: &str = "/export/transactions.csv";
/// The route for downloading all categories as a CSV file.
pub const EXPORT_CATEGORIES_CSV: &str = "/export/categories.csv";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for registering the first user.
pub const REGISTER_API: &str = "/api/register";
/// The route to create users.
pub const USERS_API: &str = "/api/users";
/// The route to update or delete a user.
pub const USER: &str = "/api/users/{user_id}";
/// The route to create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// Fill in the `{name}` parameter of `endpoint_path` with `id`, e.g.
/// `format_endpoint(EDIT_USER_VIEW, 3)` gives "/users/3/edit".
///
/// Paths without a parameter are returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((before, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };
    let after = rest.split_once('}').map_or("", |(_, after)| after);

    format!("{before}{id}{after}")
}
