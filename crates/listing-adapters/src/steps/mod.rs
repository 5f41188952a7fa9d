//! Steps del pipeline de listings.
//!
//! Extract -> Transfer -> AwaitVisible -> SelectLatest -> Load. Cada step
//! traduce los errores de su adapter a la taxonomía `FlowError`.

mod await_visible;
mod extract;
mod load;
mod select;
mod transfer;

pub use await_visible::AwaitVisibleStep;
pub use extract::ExtractStep;
pub use load::LoadStep;
pub use select::SelectLatestStep;
pub use transfer::TransferStep;

pub const EXTRACT: &str = "extract";
pub const TRANSFER: &str = "transfer";
pub const AWAIT_VISIBLE: &str = "await_visible";
pub const SELECT_LATEST: &str = "select_latest";
pub const LOAD: &str = "load";
