pub mod clear;
pub mod docs;
pub mod health;
pub mod seed;
