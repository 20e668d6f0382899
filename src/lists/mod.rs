pub mod forward_list;
pub mod list;
