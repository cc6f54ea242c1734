use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol already defined: {0}")]
    AlreadyDefined(String),
}

/// A named address.
///
/// `defined` is false while the name has only been referenced. That is fine
/// for assembler labels until the sizing pass ends; compiler variables are
/// defined the moment they are first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: u16,
    pub defined: bool,
}

/// Name-to-address table used by both stages.
///
/// The compiler keeps variables (zero-page cells) in one, the assembler keeps
/// labels (program addresses) in another. Tables are never shared between
/// runs; every invocation starts from an empty one.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    #[tracing::instrument]
    pub fn new() -> SymbolTable {
        SymbolTable {
            symbols: Vec::new(),
        }
    }

    pub fn find_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    fn find_symbol_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|symbol| symbol.name == name)
    }

    /// Address of a defined symbol.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.find_symbol(name)
            .filter(|symbol| symbol.defined)
            .map(|symbol| symbol.address)
    }

    /// Bind a name to an address. Referenced-but-undefined names are
    /// completed, a second definition is an error.
    #[tracing::instrument]
    pub fn define(&mut self, name: &str, address: u16) -> Result<(), SymbolError> {
        match self.find_symbol_mut(name) {
            Some(symbol) if symbol.defined => Err(SymbolError::AlreadyDefined(name.to_string())),
            Some(symbol) => {
                symbol.address = address;
                symbol.defined = true;
                Ok(())
            }
            None => {
                self.symbols.push(Symbol {
                    name: name.to_string(),
                    address,
                    defined: true,
                });
                Ok(())
            }
        }
    }

    /// Record a use of a name that may not be defined yet.
    #[tracing::instrument]
    pub fn reference(&mut self, name: &str) {
        if self.find_symbol(name).is_none() {
            self.symbols.push(Symbol {
                name: name.to_string(),
                address: 0,
                defined: false,
            });
        }
    }

    /// Names that were referenced but never defined.
    pub fn undefined(&self) -> impl Iterator<Item = &str> {
        self.symbols
            .iter()
            .filter(|symbol| !symbol.defined)
            .map(|symbol| symbol.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            if symbol.defined {
                writeln!(f, "{} = ${:04X}", symbol.name, symbol.address)?;
            } else {
                writeln!(f, "{} = ?", symbol.name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut table = SymbolTable::new();
        table.define("start", 0x0800).unwrap();
        assert_eq!(table.lookup("start"), Some(0x0800));
        assert_eq!(table.lookup("end"), None);
    }

    #[test]
    fn duplicate_definition() {
        let mut table = SymbolTable::new();
        table.define("loop", 0x0800).unwrap();
        assert_eq!(
            table.define("loop", 0x0900),
            Err(SymbolError::AlreadyDefined("loop".to_string()))
        );
    }

    #[test]
    fn forward_reference() {
        let mut table = SymbolTable::new();
        table.reference("end");
        assert_eq!(table.lookup("end"), None);
        assert_eq!(table.undefined().collect::<Vec<_>>(), vec!["end"]);

        table.define("end", 0x0815).unwrap();
        assert_eq!(table.lookup("end"), Some(0x0815));
        assert_eq!(table.undefined().count(), 0);
    }

    #[test]
    fn reference_after_define_is_noop() {
        let mut table = SymbolTable::new();
        table.define("loop", 0x0803).unwrap();
        table.reference("loop");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("loop"), Some(0x0803));
    }
}
