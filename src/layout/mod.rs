pub(crate) mod fit;
pub(crate) mod mask;
