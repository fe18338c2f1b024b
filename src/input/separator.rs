//! Line separators and the fixed selection sets for the serial panel
//!
//! Baud rate and separator choices are validated against ordered
//! enumerations. Each session owns its own pickers.

use crate::error::{PlotterError, Result};
use std::fmt;
use std::str::FromStr;

/// Byte sequence that terminates one telemetry line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LineSeparator {
    /// `\n`
    #[default]
    Nl,
    /// `\r`
    Cr,
    /// `\n\r`
    NlCr,
    /// `\r\n`
    CrNl,
    /// Any other non-empty literal
    Custom(Vec<u8>),
}

impl LineSeparator {
    /// Build a separator from raw bytes, normalizing the well-known sequences
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(match bytes {
            [] => return Err(PlotterError::InvalidSeparator(String::new())),
            b"\n" => LineSeparator::Nl,
            b"\r" => LineSeparator::Cr,
            b"\n\r" => LineSeparator::NlCr,
            b"\r\n" => LineSeparator::CrNl,
            other => LineSeparator::Custom(other.to_vec()),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LineSeparator::Nl => b"\n",
            LineSeparator::Cr => b"\r",
            LineSeparator::NlCr => b"\n\r",
            LineSeparator::CrNl => b"\r\n",
            LineSeparator::Custom(bytes) => bytes,
        }
    }

    /// Escaped form for display, e.g. `\r\n`
    pub fn escaped(&self) -> String {
        let mut out = String::new();
        for &b in self.as_bytes() {
            match b {
                b'\n' => out.push_str("\\n"),
                b'\r' => out.push_str("\\r"),
                b'\t' => out.push_str("\\t"),
                b'\\' => out.push_str("\\\\"),
                0x20..=0x7e => out.push(b as char),
                _ => out.push_str(&format!("\\x{:02x}", b)),
            }
        }
        out
    }
}

impl fmt::Display for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.escaped())
    }
}

impl FromStr for LineSeparator {
    type Err = PlotterError;

    /// Accepts `nl`, `cr`, `nlcr`, `crnl` or a literal with `\n`, `\r`,
    /// `\t`, `\\` and `\xNN` escapes
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nl" => Ok(LineSeparator::Nl),
            "cr" => Ok(LineSeparator::Cr),
            "nlcr" => Ok(LineSeparator::NlCr),
            "crnl" => Ok(LineSeparator::CrNl),
            literal => {
                let bytes = unescape(literal)?;
                LineSeparator::from_bytes(&bytes)
                    .map_err(|_| PlotterError::InvalidSeparator(literal.to_string()))
            }
        }
    }
}

fn unescape(literal: &str) -> Result<Vec<u8>> {
    let invalid = || PlotterError::InvalidSeparator(literal.to_string());
    let mut out = Vec::with_capacity(literal.len());
    let mut bytes = literal.bytes();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next().ok_or_else(invalid)? {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'\\' => out.push(b'\\'),
            b'x' => {
                let hi = bytes.next().ok_or_else(invalid)?;
                let lo = bytes.next().ok_or_else(invalid)?;
                let hex = [hi, lo];
                let hex = std::str::from_utf8(&hex).map_err(|_| invalid())?;
                out.push(u8::from_str_radix(hex, 16).map_err(|_| invalid())?);
            }
            _ => return Err(invalid()),
        }
    }

    Ok(out)
}

// ==================== Pickers ====================

/// Ordered set of supported baud rates
#[derive(Debug, Clone, Default)]
pub struct BaudRatePicker {
    selection: usize,
}

impl BaudRatePicker {
    pub const RATES: [u32; 15] = [
        300, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 76800, 115200, 230400, 250000, 500000,
        1000000, 2000000,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Select `rate`, failing if it is not in [`Self::RATES`]
    pub fn set_selection(&mut self, rate: u32) -> Result<()> {
        let index = Self::RATES
            .iter()
            .position(|&r| r == rate)
            .ok_or(PlotterError::InvalidBaudRate(rate))?;
        self.selection = index;
        Ok(())
    }

    /// Select by combo index; out-of-range indices are ignored
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < Self::RATES.len() {
            self.selection = index;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> u32 {
        Self::RATES[self.selection]
    }

    pub fn index(&self) -> usize {
        self.selection
    }

    pub fn labels(&self) -> Vec<String> {
        Self::RATES.iter().map(|r| r.to_string()).collect()
    }
}

/// Separators offered by the picker, in display order
pub static STANDARD_SEPARATORS: [LineSeparator; 4] = [
    LineSeparator::NlCr,
    LineSeparator::CrNl,
    LineSeparator::Nl,
    LineSeparator::Cr,
];

/// Ordered set of line separators with an optional custom slot
#[derive(Debug, Clone, Default)]
pub struct SeparatorPicker {
    selection: usize,
    custom: Option<LineSeparator>,
}

impl SeparatorPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `separator`; a literal outside the standard set takes the custom slot
    pub fn set_selection(&mut self, separator: &LineSeparator) -> Result<()> {
        if separator.as_bytes().is_empty() {
            return Err(PlotterError::InvalidSeparator(String::new()));
        }
        if let Some(index) = STANDARD_SEPARATORS.iter().position(|s| s == separator) {
            self.selection = index;
        } else {
            self.custom = Some(separator.clone());
            self.selection = STANDARD_SEPARATORS.len();
        }
        Ok(())
    }

    /// Select by combo index; out-of-range indices are ignored
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.len() {
            self.selection = index;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> &LineSeparator {
        match STANDARD_SEPARATORS.get(self.selection) {
            Some(separator) => separator,
            None => self.custom.as_ref().unwrap_or(&STANDARD_SEPARATORS[0]),
        }
    }

    pub fn index(&self) -> usize {
        self.selection
    }

    /// Number of selectable entries
    pub fn len(&self) -> usize {
        STANDARD_SEPARATORS.len() + usize::from(self.custom.is_some())
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn labels(&self) -> Vec<String> {
        STANDARD_SEPARATORS
            .iter()
            .chain(self.custom.iter())
            .map(LineSeparator::escaped)
            .collect()
    }
}
