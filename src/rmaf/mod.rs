pub mod counting;
pub mod evaluate;
pub mod mutation;
pub mod reads;
pub mod table;
