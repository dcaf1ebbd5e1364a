//! Fixed pattern queries over the paper graph
//!
//! | Query | Parameters      | Row                               |
//! |-------|-----------------|-----------------------------------|
//! | Q1    | paper title     | `title,(author,...),reviewer`     |
//! | Q2    | conference name | `name,(title,...)`                |
//! | Q3    | author surname  | `surname,(title,...)`             |
//! | Q4    | journal, volume | `title,author,reviewer` per match |

pub mod evaluator;
pub mod result;

pub use evaluator::{PatternQuery, QueryEvaluator};
pub use result::{Field, QueryKind, QueryOutcome, ResultRow};
