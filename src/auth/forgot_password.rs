//! The page explaining how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base},
};

const CODE_STYLE: &str = "block p-3 rounded bg-gray-100 dark:bg-gray-900 \
    font-mono text-sm overflow-x-auto";

fn forgot_password_template() -> Markup {
    let content = html! {
        div
            class="flex flex-col items-center justify-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            a
                href=(endpoints::LOG_IN_VIEW)
                class="flex items-center mb-6 text-2xl font-semibold"
            {
                img
                    src="/static/favicon-128x128.png"
                    alt="logo"
                    class="w-8 h-8 mr-2";
                "Family Finance"
            }

            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold md:text-2xl"
                    {
                        "Forgot your password?"
                    }

                    p class="text-justify"
                    {
                        "Passwords are reset by whoever runs the server. On the
                        machine hosting Family Finance, run the "
                        code { "reset_password" }
                        " program with the path to the database file and the
                        email address of the account:"
                    }

                    code class=(CODE_STYLE)
                    {
                        "reset_password --db-path family.db --email you@example.com"
                    }

                    p class="text-justify"
                    {
                        "You will be prompted to enter and confirm a new password.
                        Once it has been changed you can "
                        a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "log in" }
                        " again."
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn page_explains_reset_password_program() {
        let response = get_forgot_password_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let code = document
            .select(&Selector::parse("code").unwrap())
            .map(|element| element.text().collect::<String>())
            .collect::<Vec<_>>();
        assert!(
            code.iter().any(|text| text.contains("reset_password --db-path")),
            "want a command example, got {code:?}"
        );
    }
}
