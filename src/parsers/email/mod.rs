//! Email-based extraction strategies, one per institution. Each strategy
//! scans decoded message bodies line by line, carrying its transient
//! state explicitly between iterations.

mod csob;
mod equa;
mod mbank;
mod raiffeisen;

pub use csob::{CsobMail, CsobScan};
pub use equa::EquaMail;
pub use mbank::MbankMail;
pub use raiffeisen::{RaiffeisenMail, RaiffeisenScan};
