/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 지갑/투자 도메인 모델
**/

pub mod model;

pub use model::{
  Account,
  AccountStatus,
  Balance,
  Investment,
  InvestmentPlan,
  InvestmentStatus,
  KycStatus,
  Referral,
  ReferredProfile,
  Session,
  Transaction,
  TransactionStatus,
  TransactionType,
};
