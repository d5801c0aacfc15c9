pub mod aggregator;
pub mod dispatcher;
pub mod error;
pub mod phone;
pub mod report;

pub use aggregator::OutcomeAggregator;
pub use dispatcher::{DispatchSettings, ReportDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use phone::normalize_phone;
pub use report::{ReportSegments, TemplateVariables};
