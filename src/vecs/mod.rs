pub mod array;
pub mod deque;
pub mod ring_buffer;
pub mod small_vec;
pub mod stable_vec;
