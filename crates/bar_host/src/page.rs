//! Hosting-page navigation contracts.

use std::{cell::Cell, rc::Rc};

/// Host service acting on the page the bar is embedded in.
pub trait PageService {
    /// Reloads the hosting page.
    fn reload(&self) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Page service for targets without a hosting page.
pub struct NoopPageService;

impl PageService for NoopPageService {
    fn reload(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
/// Page service counting reload requests.
pub struct MemoryPageService {
    reloads: Rc<Cell<usize>>,
}

impl MemoryPageService {
    /// Number of reloads requested so far.
    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }
}

impl PageService for MemoryPageService {
    fn reload(&self) -> Result<(), String> {
        self.reloads.set(self.reloads.get() + 1);
        Ok(())
    }
}
