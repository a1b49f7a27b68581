//! Export-based extraction strategies: fixed-column mappings over
//! already-split rows, stateless apart from the header-marker skip.

mod equa;
mod mbank;
mod unicredit;
mod zuno;

pub use equa::EquaExport;
pub use mbank::MbankExport;
pub use unicredit::{UCB_BANK_CODE, UnicreditExport};
pub use zuno::ZunoExport;
