//! Patterns sub-module: observable and lazy_object.

pub mod lazy_object;
pub mod observable;
