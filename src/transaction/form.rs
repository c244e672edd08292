//! The form shared by the new and edit transaction pages.

use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryId},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
    transaction::{Amount, Transaction, TransactionBuilder, TransactionType},
    user::UserID,
};

/// The form data for creating or updating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// The value of the transaction in dollars, e.g. "12.50".
    pub amount: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    pub description: String,
    /// The category of the transaction, empty for uncategorized.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionForm {
    /// Validate the form and build a transaction owned by `user_id`.
    ///
    /// The date is not checked here since that depends on the local timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not valid, see [Amount], or if the
    /// description is empty.
    pub fn to_builder(&self, user_id: UserID) -> Result<TransactionBuilder, Error> {
        let amount: Amount = self.amount.parse()?;
        let description = self.description.trim();

        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        Ok(
            Transaction::build(amount, self.type_, self.date, description, user_id)
                .category_id(self.category_id),
        )
    }

    /// The values to fill the form with when showing it again.
    pub fn defaults(&self, max_date: Date) -> TransactionFormDefaults<'_> {
        TransactionFormDefaults {
            transaction_type: self.type_,
            amount: Some(&self.amount),
            date: self.date,
            description: Some(&self.description),
            category_id: self.category_id,
            max_date,
        }
    }
}

/// The initial values for the transaction form.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<&'a str>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub category_id: Option<CategoryId>,
    /// The latest date that can be picked, i.e. today in the local timezone.
    pub max_date: Date,
}

impl<'a> TransactionFormDefaults<'a> {
    /// An empty expense dated today.
    pub fn new(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: None,
            date: today,
            description: None,
            category_id: None,
            max_date: today,
        }
    }
}

/// Where the form is submitted to.
#[derive(Debug, Clone, Copy)]
pub enum FormAction<'a> {
    /// POST to the create endpoint.
    Create,
    /// PUT to the given update endpoint.
    Update(&'a str),
}

/// Render the whole transaction form.
///
/// `error_message` is shown above the submit button when it is not empty.
pub fn transaction_form_view(
    action: FormAction<'_>,
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        FormAction::Create => (
            Some(crate::endpoints::TRANSACTIONS_API),
            None,
            "Create Transaction",
        ),
        FormAction::Update(endpoint) => (None, Some(endpoint), "Update Transaction"),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            (transaction_form_fields(defaults, categories))

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (button_text) }
        }
    }
}

/// The inputs for a transaction, without the surrounding form.
pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type_"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    min="0"
                    required
                    value=[defaults.amount]
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                max=(defaults.max_date)
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="category_id"
                class=(FORM_LABEL_STYLE)
            {
                "Category"
            }

            select
                name="category_id"
                id="category_id"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Uncategorized" }

                @for category in categories {
                    option value=(category.id) selected[Some(category.id) == defaults.category_id]
                    {
                        (category.name)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, CategoryColor, CategoryName},
        transaction::TransactionType,
        user::UserID,
    };

    use super::{TransactionForm, TransactionFormDefaults, transaction_form_fields};

    fn form(amount: &str, description: &str) -> TransactionForm {
        TransactionForm {
            type_: TransactionType::Income,
            amount: amount.to_owned(),
            date: date!(2024 - 01 - 15),
            description: description.to_owned(),
            category_id: Some(2),
        }
    }

    #[test]
    fn builds_transaction() {
        let builder = form("12.50", " Pay ").to_builder(UserID::new(1)).unwrap();

        assert_eq!(builder.amount.as_decimal(), dec!(12.5));
        assert_eq!(builder.description, "Pay");
        assert_eq!(builder.transaction_type, TransactionType::Income);
        assert_eq!(builder.category_id, Some(2));
        assert_eq!(builder.user_id, UserID::new(1));
    }

    #[test]
    fn rejects_invalid_fields() {
        assert_eq!(
            form("-1", "Pay").to_builder(UserID::new(1)),
            Err(Error::NegativeAmount)
        );
        assert_eq!(
            form("1", "  ").to_builder(UserID::new(1)),
            Err(Error::EmptyDescription)
        );
    }

    #[test]
    fn transaction_form_fields_checks_selected_type() {
        let cases = [
            (TransactionType::Expense, "expense"),
            (TransactionType::Income, "income"),
        ];

        for (transaction_type, expected) in cases {
            let html = render_fields(transaction_type, None);
            assert_checked_value(&html, expected);
        }
    }

    #[test]
    fn transaction_form_fields_selects_category() {
        let html = render_fields(TransactionType::Expense, Some(7));
        let selector = Selector::parse("select[name=category_id] option").unwrap();
        let options = html.select(&selector).collect::<Vec<_>>();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value().attr("value"), Some(""));
        assert_eq!(options[1].value().attr("value"), Some("7"));
        assert!(options[1].value().attr("selected").is_some());
    }

    fn render_fields(transaction_type: TransactionType, category_id: Option<i64>) -> Html {
        let today = date!(2024 - 01 - 31);
        let categories = [Category {
            id: 7,
            name: CategoryName::new_unchecked("Food"),
            color: CategoryColor::default(),
            user_id: UserID::new(1),
        }];
        let fields = transaction_form_fields(
            &TransactionFormDefaults {
                transaction_type,
                category_id,
                ..TransactionFormDefaults::new(today)
            },
            &categories,
        );
        let markup = maud::html! { form { (fields) } };
        Html::parse_document(&markup.into_string())
    }

    fn assert_checked_value(document: &Html, expected: &str) {
        let selector = Selector::parse("input[type=radio][name=type_]").unwrap();
        let inputs = document.select(&selector).collect::<Vec<_>>();
        assert_eq!(
            inputs.len(),
            2,
            "want 2 transaction type inputs, got {}",
            inputs.len()
        );

        let checked = inputs
            .iter()
            .find(|input| input.value().attr("checked").is_some())
            .and_then(|input| input.value().attr("value"));
        assert_eq!(
            checked,
            Some(expected),
            "want checked transaction type to be {expected}, got {checked:?}"
        );
    }
}
