//! Purchase recording for plain-text ledger journals.
//!
//! The crate holds everything the `buy` form needs that is not terminal
//! code: amounts and commodities, the transaction text written to the
//! journal, journal loading and appending, ledger file discovery, the
//! description → account suggester, persisted preferences and the form
//! model itself.

pub use amount::{Amount, Commodity, CommodityPosition};
pub use completion::complete;
pub use error::EngineError;
pub use form::{
    DryRunSink, Field, JournalSink, PurchaseForm, PurchaseSink, SAVED_MESSAGE, SubmitError,
    ValidationError,
};
pub use journal::{Journal, JournalSnapshot, Price, append_to_file};
pub use locate::{find_ledger_file, find_price_file};
pub use preferences::Preferences;
pub use record::{DATE_FORMAT, Posting, TransactionRecord};
pub use suggest::Suggester;

mod amount;
mod completion;
mod error;
mod form;
mod journal;
mod locate;
mod preferences;
mod record;
mod suggest;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;
