pub mod date;
pub mod money;
pub mod record;

pub use date::{DateError, DateFormat, DateParser, DateValue};
pub use money::{parse_amount, AmountError, Money};
pub use record::{MatchOutcome, MatchResult, ReconcileError, Record, RecordId};
