use mongodb::bson::{doc, Bson, DateTime, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A price or amount as clients send it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Reads an amount out of a request body. Anything that is neither a
    /// number nor a string counts as missing.
    pub fn from_json(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Number(n) => n.as_f64().map(Amount::Number),
            Value::String(s) => Some(Amount::Text(s.clone())),
            _ => None,
        }
    }

    /// The numeric value, if the whole amount is a finite number.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Integer read from the start of the amount, ignoring anything after the
    /// digits: `1.99` and `"1 USD"` both give `1`.
    pub fn leading_integer(&self) -> Option<i64> {
        match self {
            Amount::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Amount::Number(_) => None,
            Amount::Text(s) => {
                let s = s.trim_start();
                let (sign, digits) = match s.strip_prefix('-') {
                    Some(rest) => (-1, rest),
                    None => (1, s.strip_prefix('+').unwrap_or(s)),
                };
                let end = digits
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(digits.len());
                digits[..end].parse::<i64>().ok().map(|n| sign * n)
            }
        }
    }
}

/// Receipt of a wallet top-up, stored in the `payment` collection: the body
/// the client posted, plus the coins credited and the time of the credit.
pub fn payment_receipt(email: &str, mut body: Document, coins: i64) -> Document {
    body.remove("_id");
    body.remove("email");

    let mut receipt = doc! { "email": email };
    receipt.extend(body);
    receipt.insert("creditedCoins", Bson::Int64(coins));
    receipt.insert("createdAt", Bson::DateTime(DateTime::now()));
    receipt
}
