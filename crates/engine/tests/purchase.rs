use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use engine::{
    DryRunSink, Field, Journal, JournalSink, Preferences, PurchaseForm, SAVED_MESSAGE,
    SubmitError,
};
use tempfile::TempDir;

const SEED: &str = "\
2023/12/30 bakery
    Expenses:Food:Bread        2.40 EUR
    Assets:Cash

2023/12/31 groceries
    Expenses:Groceries         12.00 USD
    Assets:Checking           -12.00 USD
";

struct Books {
    _dir: TempDir,
    journal: PathBuf,
    preferences: PathBuf,
}

fn books() -> Books {
    let dir = tempfile::tempdir().unwrap();
    let journal = dir.path().join("main.ledger");
    fs::write(&journal, SEED).unwrap();
    let preferences = dir.path().join("prefs.json");
    Books {
        _dir: dir,
        journal,
        preferences,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loaded_form(books: &Books, today: NaiveDate) -> PurchaseForm {
    let journal = Journal::from_file(&books.journal, None).unwrap();
    let prefs = Preferences::load_or_defaults(&books.preferences).unwrap();
    let mut form = PurchaseForm::new(prefs, today);
    form.apply_snapshot(journal.snapshot(), None);
    form
}

fn fill(form: &mut PurchaseForm, description: &str, amount: &str, expense: &str, asset: &str) {
    form.set_text(Field::Description, description.to_string());
    form.set_text(Field::Amount, amount.to_string());
    form.set_text(Field::Expense, expense.to_string());
    form.set_text(Field::Asset, asset.to_string());
}

fn words(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

#[test]
fn snapshot_lists_accounts_and_last_commodities() {
    let books = books();
    let journal = Journal::from_file(&books.journal, None).unwrap();
    let snapshot = journal.snapshot();

    assert_eq!(
        snapshot.accounts,
        vec![
            "Assets:Cash",
            "Assets:Checking",
            "Expenses:Food:Bread",
            "Expenses:Groceries"
        ]
    );
    assert_eq!(snapshot.commodities["Expenses:Groceries"].name, "USD");
    assert_eq!(snapshot.commodities["Expenses:Food:Bread"].name, "EUR");
    assert!(!snapshot.commodities.contains_key("Assets:Cash"));
}

#[test]
fn unparseable_journal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ledger");
    fs::write(&path, "this is not a journal entry\n").unwrap();
    assert!(Journal::from_file(&path, None).is_err());
    assert!(Journal::from_file(&dir.path().join("missing.ledger"), None).is_err());
}

#[test]
fn missing_price_file_means_no_prices() {
    let books = books();
    let missing = books.journal.with_file_name("prices.db");
    let journal = Journal::from_file(&books.journal, Some(missing.as_path())).unwrap();
    assert!(journal.prices().is_empty());
}

#[test]
fn milk_preview_matches_ledger_layout() {
    let books = books();
    let mut form = loaded_form(&books, date(2024, 1, 5));
    form.set_clearing(false);
    fill(&mut form, "milk", "3.50 USD", "Expenses:Groceries", "Assets:Cash");

    let preview = form.preview();
    let lines: Vec<&str> = preview.lines().collect();
    assert_eq!(lines[0], "2024/01/05 milk");
    assert_eq!(words(lines[1]), ["Assets:Cash", "-3.50", "USD"]);
    assert_eq!(words(lines[2]), ["Expenses:Groceries", "3.50", "USD"]);
}

#[test]
fn submission_appends_and_clears_purchase_fields() {
    let books = books();
    let mut form = loaded_form(&books, date(2024, 1, 5));
    form.set_clearing(false);
    fill(&mut form, "milk", "3.50", "Expenses:Groceries", "Assets:Cash");

    let mut sink = JournalSink::new(&books.journal, &books.preferences);
    form.submit(&mut sink).unwrap();

    let content = fs::read_to_string(&books.journal).unwrap();
    assert!(content.starts_with(SEED));
    let appended: Vec<&str> = content[SEED.len()..].lines().collect();
    assert_eq!(appended[0], "");
    assert_eq!(appended[1], "2024/01/05 milk");
    // The bare number picked up the account's last commodity.
    assert_eq!(words(appended[2]), ["Assets:Cash", "-3.50", "USD"]);
    assert_eq!(words(appended[3]), ["Expenses:Groceries", "3.50", "USD"]);

    assert_eq!(form.text(Field::Description), Some(""));
    assert_eq!(form.text(Field::Expense), Some(""));
    assert_eq!(form.text(Field::Amount), Some(""));
    assert_eq!(form.text(Field::Asset), Some("Assets:Cash"));
    assert_eq!(form.date(), date(2024, 1, 5));
    assert_eq!(form.status(), Some(SAVED_MESSAGE));

    // The appended journal still parses.
    let reread = Journal::from_file(&books.journal, None).unwrap();
    assert_eq!(reread.snapshot().accounts.len(), 4);
}

#[test]
fn incomplete_submissions_leave_the_journal_alone() {
    let books = books();
    let cases = [
        ("", "1", "Expenses:Groceries", "Assets:Cash", Field::Description),
        ("milk", "", "Expenses:Groceries", "Assets:Cash", Field::Amount),
        ("milk", "1", "", "Assets:Cash", Field::Expense),
        ("milk", "1", "Expenses:Groceries", "", Field::Asset),
    ];

    for (description, amount, expense, asset, field) in cases {
        let mut form = loaded_form(&books, date(2024, 1, 5));
        fill(&mut form, description, amount, expense, asset);
        let mut sink = JournalSink::new(&books.journal, &books.preferences);

        match form.submit(&mut sink) {
            Err(SubmitError::Invalid(err)) => assert_eq!(err.field, field),
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(!form.status().unwrap_or_default().is_empty());
        assert_eq!(fs::read_to_string(&books.journal).unwrap(), SEED);
    }
}

#[test]
fn learned_description_is_suggested_again() {
    let books = books();
    let mut form = loaded_form(&books, date(2024, 1, 5));
    fill(&mut form, "coffee", "2", "Expenses:Food", "Assets:Cash");
    form.submit(&mut DryRunSink).unwrap();

    form.set_text(Field::Description, "coffee".to_string());
    assert_eq!(form.text(Field::Expense), Some("Expenses:Food"));
}

#[test]
fn preferences_round_trip_keeps_clearing_and_drops_today() {
    let books = books();
    let today = date(2024, 1, 5);

    let mut form = loaded_form(&books, today);
    form.set_clearing(false);
    form.set_text(Field::Asset, "Assets:Checking".to_string());
    form.set_text(Field::Description, "coffee".to_string());
    form.set_text(Field::Expense, "Expenses:Food".to_string());
    let mut sink = JournalSink::new(&books.journal, &books.preferences);
    form.close(&mut sink, today).unwrap();

    let prefs = Preferences::load_or_defaults(&books.preferences).unwrap();
    assert!(!prefs.default_to_clearing);
    assert_eq!(prefs.last_date, None);
    assert_eq!(prefs.last_asset_account.as_deref(), Some("Assets:Checking"));
    assert_eq!(prefs.suggester.suggest("coffee"), Some("Expenses:Food"));

    // A later day starts on that day, not on the saved one.
    let tomorrow = date(2024, 1, 6);
    assert_eq!(PurchaseForm::new(prefs, tomorrow).date(), tomorrow);
}

#[test]
fn past_purchase_date_and_blank_asset_are_remembered_as_such() {
    let books = books();
    let today = date(2024, 1, 5);
    let mut prefs = Preferences::default();
    prefs.last_asset_account = Some("Assets:Cash".to_string());
    prefs.persist(&books.preferences).unwrap();

    let mut form = loaded_form(&books, today);
    form.set_date(date(2024, 1, 2));
    form.set_text(Field::Asset, String::new());
    let mut sink = JournalSink::new(&books.journal, &books.preferences);
    form.close(&mut sink, today).unwrap();

    let prefs = Preferences::load_or_defaults(&books.preferences).unwrap();
    assert_eq!(prefs.last_date, Some(date(2024, 1, 2)));
    assert_eq!(prefs.last_asset_account, None);
    assert!(prefs.default_to_clearing);
}

#[test]
fn dry_run_writes_nothing() {
    let books = books();
    let today = date(2024, 1, 5);
    let mut form = loaded_form(&books, today);
    fill(&mut form, "milk", "3.50 USD", "Expenses:Groceries", "Assets:Cash");

    form.submit(&mut DryRunSink).unwrap();
    form.close(&mut DryRunSink, today).unwrap();

    assert_eq!(fs::read_to_string(&books.journal).unwrap(), SEED);
    assert!(!books.preferences.exists());
}

#[test]
fn entries_that_would_break_the_journal_are_refused() {
    let books = books();
    let cases = [
        ("milk", "3 USD", "Expenses:Food  extra", Field::Expense),
        ("milk\nand eggs", "3 USD", "Expenses:Food", Field::Description),
    ];

    for (description, amount, expense, field) in cases {
        let mut form = loaded_form(&books, date(2024, 1, 5));
        fill(&mut form, description, amount, expense, "Assets:Cash");
        let mut sink = JournalSink::new(&books.journal, &books.preferences);

        match form.submit(&mut sink) {
            Err(SubmitError::Invalid(err)) => assert_eq!(err.field, field),
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&books.journal).unwrap(), SEED);
        assert!(Journal::from_file(&books.journal, None).is_ok());
    }
}

#[test]
fn unusual_commodities_survive_a_reread() {
    let books = books();
    for amount in ["$-3.50", "USD3.50", "2 \"M&M\""] {
        let mut form = loaded_form(&books, date(2024, 1, 5));
        fill(&mut form, "snacks", amount, "Expenses:Food", "Assets:Cash");
        let mut sink = JournalSink::new(&books.journal, &books.preferences);
        form.submit(&mut sink).unwrap();
    }
    let reread = Journal::from_file(&books.journal, None).unwrap();
    assert!(reread.snapshot().accounts.contains(&"Expenses:Food".to_string()));
}

#[test]
fn submitted_commodity_becomes_the_accounts_default() {
    let books = books();
    let mut form = loaded_form(&books, date(2024, 1, 5));
    fill(&mut form, "tea", "3 GBP", "Expenses:Groceries", "Assets:Cash");
    form.submit(&mut DryRunSink).unwrap();

    form.set_text(Field::Expense, "Expenses:Groceries".to_string());
    assert_eq!(
        form.default_commodity().map(|c| c.name.as_str()),
        Some("GBP")
    );
}
