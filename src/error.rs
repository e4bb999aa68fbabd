use sea_orm::DbErr;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("affiliate program is disabled")]
  ProgramDisabled,
  #[error("invalid amount")]
  InvalidAmount,
  #[error("amount is below the minimum withdrawal of {min} cents")]
  BelowMinimum { min: i64 },
  #[error("payout channel `{0}` is not allowed")]
  InvalidChannel(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("status conflict: {0}")]
  StatusConflict(String),

  #[error("affiliate profile not found")]
  ProfileNotFound,
  #[error("affiliate profile is disabled")]
  ProfileDisabled,
  #[error("withdraw request not found")]
  WithdrawNotFound,
  #[error("order {0} not found")]
  OrderNotFound(i64),
  #[error("user is disabled")]
  UserDisabled,

  #[error("insufficient funds: requested {requested}, available {available}")]
  InsufficientFunds { requested: i64, available: i64 },
  #[error("failed to generate a unique referral code")]
  CodeGeneration,
  #[error("withdraw request {id}: attached {attached}, requested {requested}")]
  AllocationMismatch { id: i64, attached: i64, requested: i64 },

  #[error(transparent)]
  Db(#[from] DbErr),
}

impl Error {
  /// Caller mistakes that can be fixed by changing the request.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Error::ProgramDisabled
        | Error::InvalidAmount
        | Error::BelowMinimum { .. }
        | Error::InvalidChannel(_)
        | Error::InvalidArgs(_)
        | Error::StatusConflict(_)
    )
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Error::ProfileNotFound
        | Error::WithdrawNotFound
        | Error::OrderNotFound(_)
    )
  }

  /// Message safe to show to an end user. Storage errors never leak.
  pub fn user_message(&self) -> String {
    match self {
      Error::ProgramDisabled => "The affiliate program is not available".into(),
      Error::InvalidAmount => "Enter a positive amount".into(),
      Error::BelowMinimum { min } => format!(
        "The minimum withdrawal is {}",
        crate::sv::money::format(*min)
      ),
      Error::InvalidChannel(channel) => {
        format!("Payout channel `{channel}` is not supported")
      }
      Error::InvalidArgs(msg) => msg.clone(),
      Error::StatusConflict(_) => {
        "This request has already been processed".into()
      }
      Error::ProfileNotFound => "Affiliate profile not found".into(),
      Error::ProfileDisabled => "Your affiliate profile is disabled".into(),
      Error::WithdrawNotFound => "Withdraw request not found".into(),
      Error::OrderNotFound(_) => "Order not found".into(),
      Error::UserDisabled => "Your account is disabled".into(),
      Error::InsufficientFunds { available, .. } => format!(
        "Insufficient balance, available: {}",
        crate::sv::money::format(*available)
      ),
      Error::CodeGeneration | Error::AllocationMismatch { .. } | Error::Db(_) => {
        "Something went wrong, try again later".into()
      }
    }
  }
}
