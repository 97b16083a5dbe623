//! Hardware driver implementations
//!
//! This crate provides the TB6612 motor channel driver on top of the
//! `embedded-hal` traits and the logic in tb6612-core:
//!
//! - [`motor::MotorChannel`]: one bridge channel with exclusive ownership
//! - [`motor::SharedMotorChannel`]: the same channel commanded from several tasks

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod motor;
