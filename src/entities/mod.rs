pub mod admin_login_logs;
pub mod banners;
pub mod cashouts;
pub mod commissions;
pub mod configs;
pub mod consultation_messages;
pub mod consultation_notifications;
pub mod consultations;
pub mod faqs;
pub mod files;
pub mod home_services;
pub mod hospitals;
pub mod kefu_messages;
pub mod navigations;
pub mod orders;
pub mod patients;
pub mod referrals;
pub mod service_items;
pub mod user_addresses;
pub mod users;

pub use admin_login_logs as admin_login_log_entity;
pub use banners as banner_entity;
pub use cashouts as cashout_entity;
pub use commissions as commission_entity;
pub use configs as config_entity;
pub use consultation_messages as consultation_message_entity;
pub use consultation_notifications as consultation_notification_entity;
pub use consultations as consultation_entity;
pub use faqs as faq_entity;
pub use files as file_entity;
pub use home_services as home_service_entity;
pub use hospitals as hospital_entity;
pub use kefu_messages as kefu_message_entity;
pub use navigations as navigation_entity;
pub use orders as order_entity;
pub use patients as patient_entity;
pub use referrals as referral_entity;
pub use service_items as service_item_entity;
pub use user_addresses as user_address_entity;
pub use users as user_entity;

pub use cashouts::{CashoutMethod, CashoutStatus};
pub use commissions::CommissionStatus;
pub use consultation_messages::SenderType;
pub use consultations::ConsultationStatus;
pub use orders::{OrderStatus, PayStatus, RefundStatus};
