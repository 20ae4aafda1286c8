pub mod wechat;

pub use wechat::*;
