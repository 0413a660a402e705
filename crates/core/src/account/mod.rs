//! Account opening.
//!
//! Every new account receives a codec-composed number and a zero balance in
//! the same unit of work.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::AccountError;
pub use service::{AccountService, MAX_NUMBER_ATTEMPTS};
pub use store::AccountStore;
pub use types::{Account, AccountWithBalance, NewAccount};
