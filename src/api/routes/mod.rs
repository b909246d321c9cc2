pub mod explain;
pub mod health;
pub mod history;
pub mod predict;
