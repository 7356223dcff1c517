pub mod edit;
pub mod item;
pub mod list;
