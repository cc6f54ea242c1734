use thiserror::Error;

use crate::layout::MemoryLayout;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZeroPageError {
    #[error("zero page exhausted: {capacity} cells hold {vars} variables and {scratch} temporaries")]
    Exhausted {
        capacity: u16,
        vars: u16,
        scratch: u16,
    },
}

/// Zero-page cells for the compiler, split in two regions: variables grow up
/// from the bottom of the window and live for the whole compilation,
/// expression temporaries grow down from the top in stack order. A variable
/// and a live temporary can therefore never share a cell; running out of
/// space is an error instead.
#[derive(Debug)]
pub struct ZeroPage {
    start: u16,
    end: u16,
    vars: u16,
    scratch: u16,
}

/// Snapshot of the scratch region, restored with [`ZeroPage::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchMark(u16);

impl ZeroPage {
    pub fn new(layout: &MemoryLayout) -> ZeroPage {
        ZeroPage {
            start: layout.zero_page_start as u16,
            end: layout.zero_page_end as u16,
            vars: 0,
            scratch: 0,
        }
    }

    fn capacity(&self) -> u16 {
        if self.start <= self.end {
            self.end - self.start + 1
        } else {
            0
        }
    }

    fn free(&self) -> u16 {
        self.capacity() - self.vars - self.scratch
    }

    fn exhausted(&self) -> ZeroPageError {
        ZeroPageError::Exhausted {
            capacity: self.capacity(),
            vars: self.vars,
            scratch: self.scratch,
        }
    }

    /// A permanent cell for a named variable.
    pub fn alloc_var(&mut self) -> Result<u8, ZeroPageError> {
        if self.free() == 0 {
            return Err(self.exhausted());
        }
        let address = self.start + self.vars;
        self.vars += 1;
        Ok(address as u8)
    }

    /// A temporary cell, handed back in stack order via `release`.
    pub fn alloc_scratch(&mut self) -> Result<u8, ZeroPageError> {
        if self.free() == 0 {
            return Err(self.exhausted());
        }
        let address = self.end - self.scratch;
        self.scratch += 1;
        Ok(address as u8)
    }

    pub fn mark(&self) -> ScratchMark {
        ScratchMark(self.scratch)
    }

    /// Drop every temporary taken since `mark`.
    pub fn release(&mut self, mark: ScratchMark) {
        debug_assert!(mark.0 <= self.scratch);
        self.scratch = mark.0;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn zero_page() -> ZeroPage {
        ZeroPage::new(&MemoryLayout::default())
    }

    #[test]
    fn variables_grow_up() {
        let mut zp = zero_page();
        assert_eq!(zp.alloc_var(), Ok(0x80));
        assert_eq!(zp.alloc_var(), Ok(0x81));
        assert_eq!(zp.alloc_var(), Ok(0x82));
    }

    #[test]
    fn scratch_grows_down() {
        let mut zp = zero_page();
        assert_eq!(zp.alloc_scratch(), Ok(0xFF));
        assert_eq!(zp.alloc_scratch(), Ok(0xFE));
    }

    #[test]
    fn release_restores_the_mark() {
        let mut zp = zero_page();
        let outer = zp.mark();
        assert_eq!(zp.alloc_scratch(), Ok(0xFF));
        let inner = zp.mark();
        assert_eq!(zp.alloc_scratch(), Ok(0xFE));
        zp.release(inner);
        assert_eq!(zp.alloc_scratch(), Ok(0xFE));
        zp.release(outer);
        assert_eq!(zp.alloc_scratch(), Ok(0xFF));
    }

    #[test]
    fn regions_never_overlap() {
        let mut zp = zero_page();
        for expected in 0..64 {
            assert_eq!(zp.alloc_var(), Ok(0x80 + expected));
        }
        for expected in 0..64 {
            assert_eq!(zp.alloc_scratch(), Ok(0xFF - expected));
        }
        assert!(zp.alloc_var().is_err());
        assert!(zp.alloc_scratch().is_err());
    }

    #[test]
    fn exhaustion_reports_the_split() {
        let mut zp = ZeroPage::new(&MemoryLayout {
            zero_page_start: 0xF0,
            zero_page_end: 0xF1,
            ..MemoryLayout::default()
        });
        zp.alloc_var().unwrap();
        zp.alloc_scratch().unwrap();
        assert_eq!(
            zp.alloc_var(),
            Err(ZeroPageError::Exhausted {
                capacity: 2,
                vars: 1,
                scratch: 1,
            })
        );
    }
}
