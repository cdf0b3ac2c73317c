pub mod answer;
pub mod compiler;
pub mod controller;
pub mod drill;
pub mod result;
