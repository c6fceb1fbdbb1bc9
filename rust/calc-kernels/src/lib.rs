//! Stateless numeric kernels shared by the evaluator and the program
//! interpreter: matrix reduction, statistics, combinatorics, plot sampling,
//! root/extremum search, integration, and an inverse-normal approximation.
//! None of these hold state; every fallible one returns `CalcResult`.

pub mod calculus;
pub mod combinatorics;
pub mod extremum;
pub mod integrate;
pub mod matrix;
pub mod norm;
pub mod plot;
pub mod roots;
pub mod stats;
