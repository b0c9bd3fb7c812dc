pub(crate) mod activity;
pub(crate) mod limits;
pub(crate) mod migrate;
pub(crate) mod shared;
pub(crate) mod sync;
pub(crate) mod top;

pub(crate) use shared::OutputFormat;
