#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod bot;
pub mod interaction;
pub mod source;

mod custom_id;
mod game;
mod render;

pub use bot::Bot;
pub use model;
