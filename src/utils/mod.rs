pub mod appointment;
pub mod code_generator;
pub mod geo;
pub mod id_card;
pub mod id_generator;
pub mod jwt;
pub mod money;
pub mod password;
pub mod phone;
pub mod promoter_code;

pub use code_generator::{generate_nonce_str, generate_order_no, generate_transaction_id};
pub use id_generator::{generate_user_id, is_valid_user_id};
pub use jwt::*;
pub use money::round2;
pub use password::*;
pub use phone::validate_cn_phone;
pub use promoter_code::{
    format_promoter_code, generate_unique_promoter_code, validate_promoter_code,
};
