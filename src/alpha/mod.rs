pub(crate) mod legacy;
pub(crate) mod opacity_map;
pub(crate) mod rle;
