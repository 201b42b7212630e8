pub(crate) mod hook;
pub(crate) mod load;
pub(crate) mod model;
