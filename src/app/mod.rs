// Application layer: concrete report pipelines and one-shot job actions.

pub mod actions;
pub mod pipelines;
