//! Admin console core.
//!
//! Drives a metadata-described admin backend: list queries with paging,
//! sorting and filters, row selection and actions, create and edit forms.
//! All network access goes through the [`Transport`] trait; [`Console`]
//! owns the state of one console session.

pub mod batch;
pub mod console;
pub mod error;
pub mod hooks;
pub mod notice;
pub mod object;
pub mod query;
pub mod session;
pub mod transport;

pub use batch::{BatchReport, Progress, run_action};
pub use console::{Console, ConsoleOptions, PendingAction};
pub use error::{ConsoleError, Result};
pub use hooks::{NoHooks, ObjectHooks};
pub use notice::{Notice, NoticeLevel, Notices};
pub use object::{ActionOutcome, Download, META_PATH, ObjectApi, foreign_options, load_meta};
pub use query::{Attach, Column, QueryState, Row, Ticket};
pub use session::{EditMode, EditSession, FieldSnapshot, Payload};
pub use transport::{ApiRequest, ApiResponse, Transport};
