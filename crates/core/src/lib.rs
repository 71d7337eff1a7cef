pub mod collection;
pub mod imaging;
pub mod pipeline;
pub mod shared;
