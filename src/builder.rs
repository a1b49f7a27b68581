use std::fs;

use csv::StringRecord;

use crate::errors::{ExtractError, ExtractResult};
use crate::parsers::prelude::*;
use crate::source::{Dialect, MessageSource};
use crate::types::{Balance, Payment};

/// Known export file layouts, one per institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Equa,
    Zuno,
    Mbank,
    Unicredit,
}

impl ExportFormat {
    /// Dialect the file-opening collaborator needs to split this format.
    pub fn dialect(&self) -> Dialect {
        match self {
            ExportFormat::Equa => EquaExport::DIALECT,
            ExportFormat::Zuno => ZunoExport::DIALECT,
            ExportFormat::Mbank => MbankExport::DIALECT,
            ExportFormat::Unicredit => UnicreditExport::DIALECT,
        }
    }

    /// Best-effort recognition by the institutions' header markers. All
    /// four banks hand out `.csv` files, so the extension decides
    /// nothing; ambiguous content should set the format explicitly.
    pub fn detect(content: &[u8]) -> ExtractResult<Self> {
        if content
            .windows(b"#Datum".len())
            .any(|window| window == b"#Datum")
        {
            return Ok(ExportFormat::Mbank);
        }

        let text = String::from_utf8_lossy(content);
        if text.lines().any(|line| line.starts_with("Účet")) {
            return Ok(ExportFormat::Unicredit);
        }

        match text.lines().next() {
            Some(first) if first.contains(';') => Ok(ExportFormat::Equa),
            Some(first) if first.contains(',') => Ok(ExportFormat::Zuno),
            _ => Err(ExtractError::UnsupportedFormat),
        }
    }

    /// Decodes, splits and runs the strategy over raw export content.
    pub fn parse_bytes(&self, content: &[u8]) -> ExtractResult<Vec<Payment>> {
        let rows: Vec<StringRecord> = self.dialect().read_rows(content)?;
        match self {
            ExportFormat::Equa => EquaExport::parse(rows).collect(),
            ExportFormat::Zuno => ZunoExport::parse(rows).collect(),
            ExportFormat::Mbank => MbankExport::parse(rows).collect(),
            ExportFormat::Unicredit => UnicreditExport::parse(rows).collect(),
        }
    }
}

/// Convenience entry point for export files: resolves the format, opens
/// and decodes the content per the format's dialect and collects the
/// normalized payments.
///
/// ```rust,ignore
/// use bank_notify_rs::ExportBuilder;
///
/// let payments = ExportBuilder::new()
///     .path("vypis.csv")
///     .parse()?;
/// ```
#[derive(Default)]
pub struct ExportBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: Option<ExportFormat>,
}

impl ExportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn path(mut self, filepath: &str) -> Self {
        self.filepath = Some(filepath.to_string());
        self
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn parse(self) -> ExtractResult<Vec<Payment>> {
        let content = match (self.content, self.filepath) {
            (Some(content), _) => content,
            (None, Some(path)) => fs::read(path)?,
            (None, None) => return Err(ExtractError::MissingContentAndPath),
        };

        let format = match self.format {
            Some(format) => format,
            None => ExportFormat::detect(&content)?,
        };

        format.parse_bytes(&content)
    }
}

/// Known mailbox notification layouts, one per institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailFormat {
    Csob,
    Raiffeisen,
    Equa,
    Mbank,
}

impl MailFormat {
    pub fn has_payments(&self) -> bool {
        match self {
            MailFormat::Csob => CsobMail::HAS_PAYMENTS,
            MailFormat::Raiffeisen => RaiffeisenMail::HAS_PAYMENTS,
            MailFormat::Equa => EquaMail::HAS_PAYMENTS,
            MailFormat::Mbank => MbankMail::HAS_PAYMENTS,
        }
    }

    pub fn has_balance(&self) -> bool {
        match self {
            MailFormat::Csob => CsobMail::HAS_BALANCE,
            MailFormat::Raiffeisen => RaiffeisenMail::HAS_BALANCE,
            MailFormat::Equa => EquaMail::HAS_BALANCE,
            MailFormat::Mbank => MbankMail::HAS_BALANCE,
        }
    }

    /// Runs the payments pass of this institution's strategy over an
    /// already-fetched batch.
    pub fn collect_payments<S: MessageSource>(
        &self,
        source: &mut S,
    ) -> ExtractResult<Vec<Payment>> {
        if !self.has_payments() {
            return Err(ExtractError::UnsupportedPass("payment"));
        }
        match self {
            MailFormat::Csob => CsobMail::parse(source)?.collect(),
            MailFormat::Raiffeisen => RaiffeisenMail::parse(source)?.collect(),
            _ => Err(ExtractError::UnsupportedPass("payment")),
        }
    }

    /// Runs the balance pass of this institution's strategy over an
    /// already-fetched batch.
    pub fn collect_balances<S: MessageSource>(
        &self,
        source: &mut S,
    ) -> ExtractResult<Vec<Balance>> {
        if !self.has_balance() {
            return Err(ExtractError::UnsupportedPass("balance"));
        }
        match self {
            MailFormat::Equa => EquaMail::parse(source),
            MailFormat::Mbank => MbankMail::parse(source),
            _ => Err(ExtractError::UnsupportedPass("balance")),
        }
    }
}
