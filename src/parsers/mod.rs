pub mod email;
pub mod export;
pub mod traits;

pub(crate) mod util;

pub mod prelude {
    pub use super::email::{CsobMail, CsobScan, EquaMail, MbankMail, RaiffeisenMail, RaiffeisenScan};
    pub use super::export::{EquaExport, MbankExport, UnicreditExport, ZunoExport};
    pub use super::traits::Extractor;
}
