//! Aggregate margin from the margin pool.
//!
//! The pool aggregates per-position collateral elsewhere; this core only reads one
//! figure and adds it to its own reserves when computing the ratio. It never writes it.

use crate::types::Reserve;
use std::cell::Cell;
use std::rc::Rc;

pub trait MarginPool {
    fn aggregate_margin(&self) -> Reserve;
}

#[derive(Debug, Clone, Default)]
pub struct MockMarginPool {
    margin: Rc<Cell<u128>>,
}

impl MockMarginPool {
    pub fn new(margin: Reserve) -> Self {
        Self {
            margin: Rc::new(Cell::new(margin.value())),
        }
    }

    pub fn set_margin(&self, margin: Reserve) {
        self.margin.set(margin.value());
    }
}

impl MarginPool for MockMarginPool {
    fn aggregate_margin(&self) -> Reserve {
        Reserve::new(self.margin.get())
    }
}
