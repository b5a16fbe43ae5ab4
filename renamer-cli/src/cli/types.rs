use clap::ValueEnum;
use renamer_core::{CasePolicy, NumberPosition, Preview};
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PreviewArg {
    Table,
    Summary,
    None,
}

impl PreviewArg {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "summary" => Some(Self::Summary),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl From<PreviewArg> for Preview {
    fn from(arg: PreviewArg) -> Self {
        match arg {
            PreviewArg::Table => Self::Table,
            PreviewArg::Summary => Self::Summary,
            PreviewArg::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl From<OutputFormat> for renamer_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// How to decide whether the target filesystem folds case
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CasePolicyArg {
    /// Platform convention (insensitive on Windows and macOS)
    Host,
    /// Test the target directory itself
    Probe,
    Sensitive,
    Insensitive,
}

impl CasePolicyArg {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "host" => Some(Self::Host),
            "probe" => Some(Self::Probe),
            "sensitive" => Some(Self::Sensitive),
            "insensitive" => Some(Self::Insensitive),
            _ => None,
        }
    }

    pub fn resolve(self, target_dir: &Path) -> CasePolicy {
        match self {
            Self::Host => CasePolicy::host(),
            Self::Probe => CasePolicy::probe(target_dir),
            Self::Sensitive => CasePolicy::CaseSensitive,
            Self::Insensitive => CasePolicy::CaseInsensitive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum NumberPositionArg {
    Prefix,
    Suffix,
}

impl From<NumberPositionArg> for NumberPosition {
    fn from(arg: NumberPositionArg) -> Self {
        match arg {
            NumberPositionArg::Prefix => Self::Prefix,
            NumberPositionArg::Suffix => Self::Suffix,
        }
    }
}
