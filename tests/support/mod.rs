#![allow(dead_code)]

pub mod members;
