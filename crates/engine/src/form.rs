//! The purchase form: field values, suggestions, validation, preview and the
//! submit/close flows. Rendering and key handling live in the terminal crate.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    Amount, Commodity, EngineError, JournalSnapshot, Preferences, ResultEngine, TransactionRecord,
    journal,
};

pub const SAVED_MESSAGE: &str = "Purchase saved";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Description,
    Amount,
    Expense,
    Date,
    Clearing,
    ClearingDate,
    Asset,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Description,
        Field::Amount,
        Field::Expense,
        Field::Date,
        Field::Clearing,
        Field::ClearingDate,
        Field::Asset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "Items purchased",
            Self::Amount => "Amount",
            Self::Expense => "Expense account",
            Self::Date => "Date of purchase",
            Self::Clearing => "Date of clearing",
            Self::ClearingDate => "Clearing date",
            Self::Asset => "Source account",
        }
    }

    pub fn is_account(self) -> bool {
        matches!(self, Self::Expense | Self::Asset)
    }
}

/// The first rule a form breaks, and the field to focus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Where submitted purchases and closing preferences go.
pub trait PurchaseSink {
    fn save_transaction(&mut self, text: &str) -> ResultEngine<()>;
    fn save_preferences(&mut self, preferences: &Preferences) -> ResultEngine<()>;
}

/// Appends to the journal and writes the preferences file.
#[derive(Debug, Clone)]
pub struct JournalSink {
    journal_path: PathBuf,
    preferences_path: PathBuf,
}

impl JournalSink {
    pub fn new(journal_path: &Path, preferences_path: &Path) -> Self {
        Self {
            journal_path: journal_path.to_path_buf(),
            preferences_path: preferences_path.to_path_buf(),
        }
    }
}

impl PurchaseSink for JournalSink {
    fn save_transaction(&mut self, text: &str) -> ResultEngine<()> {
        journal::append_to_file(&self.journal_path, text)
    }

    fn save_preferences(&mut self, preferences: &Preferences) -> ResultEngine<()> {
        preferences.persist(&self.preferences_path)
    }
}

/// Touches nothing on disk; logs what would have been written.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSink;

impl PurchaseSink for DryRunSink {
    fn save_transaction(&mut self, text: &str) -> ResultEngine<()> {
        tracing::info!("Transaction not being saved:\n{text}");
        Ok(())
    }

    fn save_preferences(&mut self, _preferences: &Preferences) -> ResultEngine<()> {
        tracing::info!("Skipping save of preferences");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseForm {
    description: String,
    amount: String,
    default_commodity: Option<Commodity>,
    expense: String,
    expense_suggested: bool,
    asset: String,
    date: NaiveDate,
    clearing: bool,
    clearing_date: NaiveDate,
    accounts: Vec<String>,
    commodities: HashMap<String, Commodity>,
    preferences: Preferences,
    loaded: bool,
    status: Option<String>,
}

impl PurchaseForm {
    /// A blank form starting from the saved preferences: clearing toggle,
    /// last purchase date (or `today`) and last source account.
    pub fn new(preferences: Preferences, today: NaiveDate) -> Self {
        let date = preferences.start_date(today);
        Self {
            description: String::new(),
            amount: String::new(),
            default_commodity: None,
            expense: String::new(),
            expense_suggested: false,
            asset: preferences.last_asset_account.clone().unwrap_or_default(),
            date,
            clearing: preferences.default_to_clearing,
            clearing_date: date,
            accounts: Vec::new(),
            commodities: HashMap::new(),
            preferences,
            loaded: false,
            status: None,
        }
    }

    /// Installs the journal data loaded in the background and, when given,
    /// the description passed on the command line.
    ///
    /// Returns the field that should get focus.
    pub fn apply_snapshot(
        &mut self,
        snapshot: JournalSnapshot,
        initial_description: Option<&str>,
    ) -> Field {
        self.accounts = snapshot.accounts;
        self.commodities = snapshot.commodities;
        self.loaded = true;
        tracing::debug!(
            accounts = self.accounts.len(),
            commodities = self.commodities.len(),
            "journal snapshot applied"
        );

        let focus = match initial_description.map(str::trim) {
            Some(description) if !description.is_empty() => {
                self.set_text(Field::Description, description.to_string());
                Field::Amount
            }
            _ => Field::Description,
        };
        self.refresh();
        focus
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn default_commodity(&self) -> Option<&Commodity> {
        self.default_commodity.as_ref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn clearing(&self) -> bool {
        self.clearing
    }

    pub fn clearing_date(&self) -> NaiveDate {
        self.clearing_date
    }

    /// The text of a text field; `None` for date and toggle fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Description => Some(&self.description),
            Field::Amount => Some(&self.amount),
            Field::Expense => Some(&self.expense),
            Field::Asset => Some(&self.asset),
            Field::Date | Field::Clearing | Field::ClearingDate => None,
        }
    }

    /// Replaces a text field and runs its change reactions: a new
    /// description may suggest an expense account, a new expense account may
    /// change the amount's default commodity.
    pub fn set_text(&mut self, field: Field, value: String) {
        match field {
            Field::Description => {
                self.description = value;
                self.suggest_expense_account();
            }
            Field::Amount => self.amount = value,
            Field::Expense => {
                self.expense = value;
                self.expense_suggested = false;
                self.update_amount_commodity();
            }
            Field::Asset => self.asset = value,
            Field::Date | Field::Clearing | Field::ClearingDate => return,
        }
        self.refresh();
    }

    /// Sets the purchase date; the clearing date follows it.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.clearing_date = date;
        self.refresh();
    }

    pub fn set_clearing_date(&mut self, date: NaiveDate) {
        self.clearing_date = date;
        self.refresh();
    }

    pub fn set_clearing(&mut self, clearing: bool) {
        self.clearing = clearing;
        self.refresh();
    }

    fn suggest_expense_account(&mut self) {
        if !self.loaded || self.description.trim().is_empty() {
            return;
        }
        if !self.expense.trim().is_empty() && !self.expense_suggested {
            return;
        }
        if let Some(suggestion) = self.preferences.suggester.suggest(&self.description) {
            self.expense = suggestion.to_string();
            self.expense_suggested = true;
            self.update_amount_commodity();
        }
    }

    fn update_amount_commodity(&mut self) {
        let expense = self.expense.trim();
        if !self.loaded || expense.is_empty() {
            return;
        }
        if let Some(commodity) = self.commodities.get(expense) {
            self.default_commodity = Some(commodity.clone());
        }
    }

    /// The amount as entered: `Ok(None)` when blank, an error when it does
    /// not parse.
    pub fn amount(&self) -> ResultEngine<Option<Amount>> {
        Amount::parse_input(&self.amount, self.default_commodity.as_ref())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::new(
                Field::Description,
                "Items purchased cannot be empty",
            ));
        }
        if self.description.chars().any(char::is_control) {
            return Err(ValidationError::new(
                Field::Description,
                "Items purchased must fit on one line",
            ));
        }
        match self.amount() {
            Ok(Some(amount)) if amount.is_zero() => {
                return Err(ValidationError::new(
                    Field::Amount,
                    "Enter a non-zero amount",
                ));
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => {
                return Err(ValidationError::new(Field::Amount, "Enter a valid amount"));
            }
        }
        if self.expense.trim().is_empty() {
            return Err(ValidationError::new(
                Field::Expense,
                "Enter an expense account",
            ));
        }
        if !is_valid_account(&self.expense) {
            return Err(ValidationError::new(
                Field::Expense,
                "Expense account cannot contain tabs or double spaces",
            ));
        }
        if self.asset.trim().is_empty() {
            return Err(ValidationError::new(Field::Asset, "Enter an asset account"));
        }
        if !is_valid_account(&self.asset) {
            return Err(ValidationError::new(
                Field::Asset,
                "Source account cannot contain tabs or double spaces",
            ));
        }
        Ok(())
    }

    fn refresh(&mut self) {
        if !self.loaded {
            return;
        }
        self.status = self.validate().err().map(|err| err.message.to_string());
    }

    /// The transaction as it would be written now. An amount that is blank or
    /// does not parse yields bare postings.
    pub fn record(&self) -> TransactionRecord {
        let amount = self.amount().ok().flatten();
        TransactionRecord::purchase(
            self.date,
            self.clearing.then_some(self.clearing_date),
            self.description.trim(),
            amount.as_ref(),
            self.expense.trim(),
            self.asset.trim(),
        )
    }

    pub fn preview(&self) -> String {
        self.record().to_string()
    }

    /// Validates, learns the description/expense pair, hands the text to the
    /// sink and resets the per-purchase fields. Asset account, dates and the
    /// clearing toggle are kept for the next purchase.
    pub fn submit(&mut self, sink: &mut dyn PurchaseSink) -> Result<(), SubmitError> {
        if let Err(err) = self.validate() {
            self.status = Some(err.message.to_string());
            return Err(err.into());
        }

        let text = self.preview();
        ensure_parses(&text)?;

        let description = self.description.trim().to_string();
        let expense = self.expense.trim().to_string();
        self.preferences.suggester.associate(&description, &expense);
        sink.save_transaction(&text)?;

        if let Ok(Some(amount)) = self.amount()
            && let Some(commodity) = amount.commodity
        {
            self.commodities.insert(expense.clone(), commodity);
        }
        tracing::info!(%description, %expense, "purchase recorded");

        self.description.clear();
        self.expense.clear();
        self.expense_suggested = false;
        self.amount.clear();
        self.status = Some(SAVED_MESSAGE.to_string());
        Ok(())
    }

    /// Folds the form's state into the preferences and hands them to the
    /// sink. A purchase date equal to `today` is dropped so the next start
    /// opens on its own current day.
    pub fn close(&mut self, sink: &mut dyn PurchaseSink, today: NaiveDate) -> ResultEngine<()> {
        let prefs = &mut self.preferences;
        prefs.default_to_clearing = self.clearing;
        prefs.last_date = (self.date != today).then_some(self.date);

        let asset = self.asset.trim();
        prefs.last_asset_account = (!asset.is_empty()).then(|| asset.to_string());

        let description = self.description.trim();
        let expense = self.expense.trim();
        if !description.is_empty() && !expense.is_empty() {
            prefs.suggester.associate(description, expense);
        }

        sink.save_preferences(&self.preferences)
    }
}

/// A ledger account ends at two spaces or a tab, and cannot span lines.
fn is_valid_account(account: &str) -> bool {
    let account = account.trim();
    !account.contains("  ") && !account.chars().any(char::is_control)
}

/// Refuses text the journal parser would reject, so an append can never
/// leave the journal unreadable.
fn ensure_parses(text: &str) -> ResultEngine<()> {
    ledger_parser::parse(text)
        .map(|_| ())
        .map_err(|err| EngineError::InvalidTransaction(err.to_string()))
}
