mod common;

mod builder;
mod derived;
mod keyed;
mod partial_value;
