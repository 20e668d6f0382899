pub mod compare;
pub(crate) mod raw_buf;
