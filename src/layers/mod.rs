pub(crate) mod blend;
pub(crate) mod display;
pub(crate) mod flags;
pub(crate) mod io;
pub(crate) mod paint;
pub(crate) mod set;
