//! Operator entry type.

/// Concrete implementation of every operator port.
#[derive(Debug, Clone, Copy, Default)]
pub struct Operator;
