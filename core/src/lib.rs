pub mod error;
pub mod intent;
pub mod isoweek;
pub mod query;
pub mod scope;
pub mod thread;
pub mod time;
pub mod weekday;

pub use error::ParseError;
pub use isoweek::IsoWeek;
pub use scope::{ResolvedScope, ScopeMode};
pub use time::TimeWindow;
pub use weekday::Weekday;
