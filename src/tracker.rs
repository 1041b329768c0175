//! The in-memory expense collection and its two mutations.

use crate::models::{is_valid_amount, Category, Expense};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Raw values of the add-expense form, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    Missing(&'static str),
    InvalidAmount(String),
    UnknownCategory(String),
    InvalidDate(String),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing(field) => write!(f, "{field} is required"),
            FormError::InvalidAmount(raw) => {
                write!(f, "amount '{raw}' is not a positive number within range")
            }
            FormError::UnknownCategory(raw) => write!(f, "category '{raw}' is not recognised"),
            FormError::InvalidDate(raw) => write!(f, "date '{raw}' is not YYYY-MM-DD"),
        }
    }
}

impl std::error::Error for FormError {}

impl ExpenseForm {
    fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
        let value = value.trim();
        if value.is_empty() {
            Err(FormError::Missing(field))
        } else {
            Ok(value)
        }
    }

    /// Checks every field; the first failure wins.
    pub fn parse(&self) -> Result<(String, Decimal, Category, NaiveDate), FormError> {
        let description = Self::required(&self.description, "description")?;
        let amount_raw = Self::required(&self.amount, "amount")?;
        let category_raw = Self::required(&self.category, "category")?;
        let date_raw = Self::required(&self.date, "date")?;

        let amount = Decimal::from_str(amount_raw)
            .ok()
            .filter(|amount| is_valid_amount(*amount))
            .ok_or_else(|| FormError::InvalidAmount(amount_raw.to_string()))?;
        let category = Category::from_str(category_raw)
            .map_err(|_| FormError::UnknownCategory(category_raw.to_string()))?;
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(date_raw.to_string()))?;

        Ok((description.to_string(), amount, category, date))
    }
}

/// Sole owner of the session's expense collection.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    expenses: Vec<Expense>,
}

impl Tracker {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    /// Appends a record built from `form`. On error the collection is untouched.
    pub fn add(&mut self, form: &ExpenseForm) -> Result<&Expense, FormError> {
        let (description, amount, category, date) = form.parse()?;
        let id = self.fresh_id();
        self.expenses.push(Expense {
            id,
            description,
            amount,
            category,
            date,
        });
        // Non-empty: the record was pushed just above.
        Ok(self.expenses.last().expect("collection holds the pushed record"))
    }

    /// Removes the record with identifier `id`, if any.
    pub fn delete(&mut self, id: &str) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(index))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
