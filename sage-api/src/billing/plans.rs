//! Plan catalog and money formatting

use serde::Serialize;

/// A subscription plan offered on the billing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingPlan {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in major units per interval
    pub price: f64,
    pub currency: &'static str,
    pub interval: &'static str,
    pub features: &'static [&'static str],
}

impl PricingPlan {
    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }

    pub fn display_price(&self) -> String {
        format_amount_for_display(self.price, self.currency)
    }

    /// Price in the provider's minor units
    pub fn unit_amount(&self) -> i64 {
        amount_to_minor_units(self.price, self.currency)
    }

    pub fn listing(&'static self) -> PlanListing {
        PlanListing {
            plan: self,
            display_price: self.display_price(),
            unit_amount: self.unit_amount(),
        }
    }
}

/// A plan as served to the billing page, with its formatted price
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanListing {
    #[serde(flatten)]
    pub plan: &'static PricingPlan,
    pub display_price: String,
    pub unit_amount: i64,
}

pub const PRICING_PLANS: &[PricingPlan] = &[
    PricingPlan {
        id: "free",
        name: "Free",
        price: 0.0,
        currency: "usd",
        interval: "month",
        features: &[
            "10 AI-generated replies per month",
            "Basic email management",
            "Standard support",
        ],
    },
    PricingPlan {
        id: "pro",
        name: "Pro",
        price: 9.99,
        currency: "usd",
        interval: "month",
        features: &[
            "Unlimited AI-generated replies",
            "Advanced email management",
            "Priority support",
            "Custom reply templates",
        ],
    },
    PricingPlan {
        id: "enterprise",
        name: "Enterprise",
        price: 29.99,
        currency: "usd",
        interval: "month",
        features: &[
            "Everything in Pro",
            "Team collaboration",
            "Advanced analytics",
            "Custom integrations",
            "Dedicated support",
        ],
    },
];

pub fn plan_by_id(id: &str) -> Option<&'static PricingPlan> {
    PRICING_PLANS.iter().find(|plan| plan.id == id)
}

/// Currencies the payment provider charges in whole units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

pub fn is_zero_decimal(currency: &str) -> bool {
    let currency = currency.to_ascii_lowercase();
    ZERO_DECIMAL_CURRENCIES.contains(&currency.as_str())
}

fn currency_symbol(currency: &str) -> String {
    match currency.to_ascii_lowercase().as_str() {
        "usd" => "$".to_string(),
        "eur" => "€".to_string(),
        "gbp" => "£".to_string(),
        "jpy" => "¥".to_string(),
        "inr" => "₹".to_string(),
        "krw" => "₩".to_string(),
        "cad" => "CA$".to_string(),
        "aud" => "A$".to_string(),
        other => format!("{} ", other.to_ascii_uppercase()),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an amount in major units, e.g. `9.99, "usd"` -> `$9.99`
pub fn format_amount_for_display(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let symbol = currency_symbol(currency);
    let abs = amount.abs();

    if is_zero_decimal(currency) {
        let whole = format!("{:.0}", abs.round());
        return format!("{}{}{}", sign, symbol, group_thousands(&whole));
    }

    let fixed = format!("{:.2}", abs);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}{}{}.{}", sign, symbol, group_thousands(whole), fraction)
}

/// Convert major units to the provider's minor units (cents); zero-decimal
/// currencies are passed through unchanged
pub fn amount_to_minor_units(amount: f64, currency: &str) -> i64 {
    if is_zero_decimal(currency) {
        amount.round() as i64
    } else {
        (amount * 100.0).round() as i64
    }
}
