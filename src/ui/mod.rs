//! UI core: controller, form state, timers and view models.
//!
//! Nothing here draws anything. A renderer reads [`ListView`] and
//! [`FormView`] and sends user events back as [`Action`]s.

pub mod controller;
pub mod form;
pub mod rich_text;
pub mod session;
pub mod timer;
pub mod view;

pub use controller::{Action, Command, Controller, ControllerConfig, ControllerState, Mode};
pub use form::{FieldEdit, FormInstance, FormState, SaveStatus};
pub use rich_text::RichText;
pub use session::Session;
pub use timer::{TimerKind, TimerSlot, Timers};
pub use view::{FormView, ListView, PaginationView, RowView};
