//! Generates data for the morph transducer

pub mod basis;
