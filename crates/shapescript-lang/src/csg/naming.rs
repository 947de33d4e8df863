use crate::csg::BooleanOp;

/// Per-operation running counters behind generated result names
/// (`base_U1`, `base_D2`, ...). Owned by one engine, reset at run start.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamingCounters {
    union: u32,
    difference: u32,
    intersection: u32,
    xor: u32,
}

impl NamingCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the counter for `op` and return the new value.
    pub fn next(&mut self, op: BooleanOp) -> u32 {
        let slot = match op {
            BooleanOp::Union        => &mut self.union,
            BooleanOp::Difference   => &mut self.difference,
            BooleanOp::Intersection => &mut self.intersection,
            BooleanOp::Xor          => &mut self.xor,
        };
        *slot += 1;
        *slot
    }

    /// `<first>_<symbol><n>`
    pub fn result_name(&mut self, op: BooleanOp, first: &str) -> String {
        let n = self.next(op);
        format!("{first}_{}{n}", op.symbol())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
