pub mod completion;
pub mod entities;
pub mod facades;
