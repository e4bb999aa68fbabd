pub mod affiliate_click;
pub mod affiliate_commission;
pub mod affiliate_profile;
pub mod affiliate_withdraw_request;

pub use affiliate_click as click;
pub use affiliate_commission as commission;
pub use affiliate_commission::CommissionStatus;
pub use affiliate_profile as profile;
pub use affiliate_profile::ProfileStatus;
pub use affiliate_withdraw_request as withdraw_request;
pub use affiliate_withdraw_request::WithdrawStatus;
