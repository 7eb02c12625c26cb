pub mod channel;
pub mod generator;
pub mod partition;
pub mod pipeline;
pub mod worker;
pub mod writer;

pub use crate::domain::model::{Batch, BrokenModules, PackageName, ResolvedPackage, RunSummary};
pub use crate::domain::ports::{ConfigProvider, InputProvider, OnContractViolation};
pub use crate::utils::error::Result;
