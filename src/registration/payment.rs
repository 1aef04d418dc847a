use chrono::{Datelike, Utc};
use serde::Serialize;

use super::domain::PaymentMethod;

/// Rendered card numbers cap at 16 digits plus 3 grouping spaces.
pub const CARD_NUMBER_MAX_LEN: usize = 19;

/// Expiry years offered: the current year through current + 14.
pub const EXPIRY_YEAR_SPAN: i32 = 15;

/// One conditional input the payment panel should render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputKind {
    Phone {
        placeholder: &'static str,
    },
    Text {
        placeholder: &'static str,
    },
    CardNumber {
        placeholder: &'static str,
        max_len: usize,
    },
    MonthSelect {
        options: Vec<String>,
    },
    YearSelect {
        from: i32,
        to: i32,
    },
    Cvc {
        max_len: usize,
    },
    FileUpload {
        accept: &'static str,
    },
}

const fn mobile_placeholder(method: PaymentMethod) -> (&'static str, &'static str) {
    match method {
        PaymentMethod::Mtn => ("+260961234567", "096XXXXXXX"),
        PaymentMethod::Airtel => ("+260971234567", "097XXXXXXX"),
        PaymentMethod::Zamtel => ("+260951234567", "095XXXXXXX"),
        PaymentMethod::Visa | PaymentMethod::Bank => ("", ""),
    }
}

/// Wall-clock year anchoring the expiry-year range. [`render_fields`] takes
/// the year as an argument so tests stay deterministic.
pub fn current_year() -> i32 {
    Utc::now().year()
}

pub fn expiry_months() -> Vec<String> {
    (1..=12).map(|month| format!("{month:02}")).collect()
}

pub fn expiry_years(current_year: i32) -> Vec<i32> {
    (current_year..current_year + EXPIRY_YEAR_SPAN).collect()
}

/// Conditional input set for the chosen payment method. Re-invocation fully
/// replaces the previous set; no method means no fields.
pub fn render_fields(method: Option<PaymentMethod>, current_year: i32) -> Vec<FieldDescriptor> {
    let Some(method) = method else {
        return Vec::new();
    };

    match method {
        PaymentMethod::Mtn | PaymentMethod::Airtel | PaymentMethod::Zamtel => {
            let (placeholder, example) = mobile_placeholder(method);
            vec![
                FieldDescriptor {
                    name: "mobile_phone",
                    label: "Mobile wallet phone number",
                    input: InputKind::Phone { placeholder },
                    hint: Some(format!(
                        "Enter your {} number (e.g., {example})",
                        method.key().to_uppercase()
                    )),
                },
                FieldDescriptor {
                    name: "mobile_reference",
                    label: "Payment reference (optional)",
                    input: InputKind::Text {
                        placeholder: "Optional reference",
                    },
                    hint: None,
                },
            ]
        }
        PaymentMethod::Visa => vec![
            FieldDescriptor {
                name: "card_number",
                label: "Card number",
                input: InputKind::CardNumber {
                    placeholder: "1234 5678 9012 3456",
                    max_len: CARD_NUMBER_MAX_LEN,
                },
                hint: None,
            },
            FieldDescriptor {
                name: "card_exp_month",
                label: "Month",
                input: InputKind::MonthSelect {
                    options: expiry_months(),
                },
                hint: None,
            },
            FieldDescriptor {
                name: "card_exp_year",
                label: "Year",
                input: InputKind::YearSelect {
                    from: current_year,
                    to: current_year + EXPIRY_YEAR_SPAN - 1,
                },
                hint: None,
            },
            FieldDescriptor {
                name: "card_cvc",
                label: "CVC",
                input: InputKind::Cvc { max_len: 3 },
                hint: None,
            },
            FieldDescriptor {
                name: "card_name",
                label: "Name on card",
                input: InputKind::Text {
                    placeholder: "Jane Doe",
                },
                hint: None,
            },
        ],
        PaymentMethod::Bank => vec![FieldDescriptor {
            name: "bank_receipt",
            label: "Upload bank deposit receipt",
            input: InputKind::FileUpload {
                accept: ".pdf,.jpg,.png",
            },
            hint: None,
        }],
    }
}

/// Group raw card input into blocks of four digits, capped at the rendered
/// length.
pub fn group_card_digits(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();

    let mut grouped = String::new();
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && index % 4 == 0 {
            grouped.push(' ');
        }
        grouped.push(*digit);
    }

    grouped.chars().take(CARD_NUMBER_MAX_LEN).collect()
}
