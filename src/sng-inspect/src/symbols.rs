//! Symbol resolution
//!
//! The decoder needs a handful of global symbols (`main_loop`,
//! `resolvedConfigurablePaths`). Where they come from is up to the caller;
//! [`SymbolTable`] covers the common case of an `nm` listing of the daemon
//! binary plus the load bias of a position-independent executable.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Resolves symbol names to target addresses
pub trait SymbolResolver {
    fn resolve(&self, name: &str) -> Option<usize>;
}

/// Symbol name to address map
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, usize>,
    load_bias: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, address: usize) {
        self.symbols.insert(name.into(), address);
    }

    /// Offset added to every listed address (PIE load base)
    pub fn with_load_bias(mut self, load_bias: usize) -> Self {
        self.load_bias = load_bias;
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Parse `nm` output (`ADDRESS TYPE NAME` per line)
    ///
    /// Undefined symbols (no address column) are skipped. Versioned names
    /// such as `foo@@GLIB_2.0` are stored under their bare name too.
    pub fn parse_nm(listing: &str) -> Result<Self> {
        let mut table = SymbolTable::new();

        for (idx, line) in listing.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [] => continue,
                [_kind, _name] => continue, // undefined
                [address, _kind, name, ..] => {
                    let address = usize::from_str_radix(address, 16).map_err(|e| {
                        Error::SymbolTable {
                            line: idx + 1,
                            reason: format!("bad address {:?}: {}", address, e),
                        }
                    })?;

                    if let Some((bare, _version)) = name.split_once('@') {
                        table.symbols.entry(bare.to_string()).or_insert(address);
                    }
                    table.insert(*name, address);
                }
                _ => {
                    return Err(Error::SymbolTable {
                        line: idx + 1,
                        reason: format!("unrecognized line {:?}", line),
                    })
                }
            }
        }

        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let listing = std::fs::read_to_string(path)?;
        let table = Self::parse_nm(&listing)?;
        tracing::debug!(path = %path.display(), symbols = table.len(), "loaded symbol table");
        Ok(table)
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, name: &str) -> Option<usize> {
        self.symbols.get(name).map(|addr| addr + self.load_bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
0000000000045a20 B main_loop
0000000000045a00 D resolvedConfigurablePaths
                 U g_ptr_array_new@GLIB_2.0
0000000000012340 T main
";

    #[test]
    fn test_parse_nm_listing() {
        let table = SymbolTable::parse_nm(LISTING).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.resolve("main_loop"), Some(0x45a20));
        assert_eq!(table.resolve("resolvedConfigurablePaths"), Some(0x45a00));
        assert_eq!(table.resolve("g_ptr_array_new"), None);
    }

    #[test]
    fn test_load_bias_applies_to_every_symbol() {
        let table = SymbolTable::parse_nm(LISTING)
            .unwrap()
            .with_load_bias(0x5555_5555_0000);

        assert_eq!(table.resolve("main"), Some(0x5555_5556_2340));
    }

    #[test]
    fn test_versioned_symbols_resolve_by_bare_name() {
        let table = SymbolTable::parse_nm("0000000000001000 D log_stderr@@LIBSYSLOG_NG\n").unwrap();

        assert_eq!(table.resolve("log_stderr"), Some(0x1000));
        assert_eq!(table.resolve("log_stderr@@LIBSYSLOG_NG"), Some(0x1000));
    }

    #[test]
    fn test_bad_address_reports_line() {
        let err = SymbolTable::parse_nm("0000000000001000 T ok\nzzzz T broken\n").unwrap_err();
        assert!(matches!(err, Error::SymbolTable { line: 2, .. }));
    }
}
