/// Capability contract shared by every extraction strategy.
///
/// A strategy yields Payment records, or Balance records, or neither —
/// never both. Orchestration consults the flags to route output; the
/// `parse` entry points themselves are inherent, since email strategies
/// consume a message source while export strategies consume split rows.
pub trait Extractor {
    /// Institution label used in log output
    const SOURCE: &'static str;

    const HAS_PAYMENTS: bool = false;
    const HAS_BALANCE: bool = false;
}
