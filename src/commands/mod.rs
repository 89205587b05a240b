pub mod classify;
pub mod inventory;
pub mod split;
