pub mod admin;
pub mod catalog;
pub mod common;
pub mod file;
pub mod order;
pub mod pagination;
pub mod platform;
pub mod referral;
pub mod support;
pub mod user;

pub use admin::*;
pub use catalog::*;
pub use common::*;
pub use file::*;
pub use order::*;
pub use pagination::*;
pub use platform::*;
pub use referral::*;
pub use support::*;
pub use user::*;
