use thiserror::Error;

use crate::bank::BankError;
use crate::model::AccountError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
