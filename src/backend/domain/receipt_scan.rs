//! Token extraction from recognized receipt text.
//!
//! The text-recognition collaborator hands back the raw recognized text of
//! a receipt photo; this module pulls the tokens the add-expense form can
//! prefill. Extraction is best-effort: any token that does not match stays
//! `None` and the form keeps its current value.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

/// Tokens extracted from one receipt's recognized text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptScan {
    /// First amount-looking token, e.g. `12,34` or `12.34`
    pub amount: Option<Decimal>,
    /// First date-looking token, `dd.mm.yyyy` with `.`, `/` or `-`
    pub date: Option<NaiveDate>,
    /// Value of a labeled location line, e.g. `Ort: Berlin`
    pub location: Option<String>,
}

pub struct ReceiptScanner {
    amount_pattern: Regex,
    date_pattern: Regex,
    location_pattern: Regex,
}

impl ReceiptScanner {
    pub fn new() -> Self {
        Self {
            amount_pattern: Regex::new(r"\b\d+[,.]\d{2}\b").expect("amount pattern compiles"),
            date_pattern: Regex::new(r"\b\d{2}[./-]\d{2}[./-]\d{2,4}\b")
                .expect("date pattern compiles"),
            location_pattern: Regex::new(r"(?:Ort|Location|Adresse|Street):\s*(\w+)")
                .expect("location pattern compiles"),
        }
    }

    /// Scan recognized receipt text for amount, date and location tokens
    pub fn scan(&self, text: &str) -> ReceiptScan {
        ReceiptScan {
            amount: self.extract_amount(text),
            date: self.extract_date(text),
            location: self.extract_location(text),
        }
    }

    fn extract_amount(&self, text: &str) -> Option<Decimal> {
        let token = self.amount_pattern.find(text)?.as_str();
        // Receipts in decimal-comma locales print `12,34`.
        token.replace(',', ".").parse().ok()
    }

    fn extract_date(&self, text: &str) -> Option<NaiveDate> {
        let token = self.date_pattern.find(text)?.as_str();
        let normalized = token.replace(['/', '-'], ".");
        NaiveDate::parse_from_str(&normalized, "%d.%m.%Y")
            .or_else(|_| NaiveDate::parse_from_str(&normalized, "%d.%m.%y"))
            .ok()
    }

    fn extract_location(&self, text: &str) -> Option<String> {
        self.location_pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for ReceiptScanner {
    fn default() -> Self {
        Self::new()
    }
}
