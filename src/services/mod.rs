pub mod admin_service;
pub mod catalog_service;
pub mod commission_service;
pub mod config_service;
pub mod consultation_service;
pub mod file_service;
pub mod kefu_service;
pub mod order_service;
pub mod order_timeout_service;
pub mod referral_service;
pub mod sse_service;
pub mod user_service;

pub use admin_service::*;
pub use catalog_service::*;
pub use commission_service::*;
pub use config_service::*;
pub use consultation_service::*;
pub use file_service::*;
pub use kefu_service::*;
pub use order_service::*;
pub use order_timeout_service::*;
pub use referral_service::*;
pub use sse_service::*;
pub use user_service::*;
