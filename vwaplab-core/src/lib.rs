//! VwapLab Core — engine, domain types, sequence builder, slippage objective, backtest simulator.
//!
//! This crate contains the heart of the VWAP execution engine:
//! - Domain types (minute bars, sessions, features, session records)
//! - Session VWAP benchmark
//! - Sliding-window sequence builder producing dense training sets
//! - Scale-tolerant slippage objective with analytic gradients
//! - Scheduler traits plus uniform and trainable linear reference models
//! - Rolling-window backtest simulator with silent-skip session policy

pub mod domain;
pub mod loss;
pub mod scheduler;
pub mod sequences;
pub mod simulator;
pub mod vwap;
pub mod window;
