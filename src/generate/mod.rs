pub(crate) mod combination;
pub(crate) mod sampler;
