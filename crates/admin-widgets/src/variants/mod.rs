//! The built-in widget variants.

mod base;
mod boolean;
mod datetime;
mod foreign;
mod password;
mod select;
mod structured;
mod textarea;

pub use base::{BaseWidget, width_class};
pub use boolean::BooleanWidget;
pub use datetime::{DateTimeWidget, parse_datetime_input};
pub use foreign::ForeignKeyWidget;
pub use password::{PASSWORD_MASK, PasswordWidget};
pub use select::SelectWidget;
pub use structured::StructWidget;
pub use textarea::TextareaWidget;
