//! ABSA Annotator Common Library
//!
//! CLIと将来のUIで共有される型とセッションロジック

pub mod error;
pub mod export;
pub mod item;
pub mod ledger;
pub mod session;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
pub use export::{export, ExportBundle};
pub use item::{Item, ItemStore, SourceTable};
pub use ledger::LabelLedger;
pub use session::{apply, Intent, ItemStatus, Outcome, SessionContext, SessionState, Snapshot};
pub use stats::Summary;
pub use types::{AnnotationRecord, LabelEntry, RecordRow, Sentiment, Vocabulary};
