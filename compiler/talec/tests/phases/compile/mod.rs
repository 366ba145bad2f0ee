//! Compile-phase tests.

mod assets;
mod editing;
mod include;
mod locations;
mod precedence;
