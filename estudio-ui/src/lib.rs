pub mod controller;
pub mod investor;
pub mod registry;
pub mod remote;
pub mod view;

pub use controller::{CicloInfo, PostRecomputeHook, Simulador};
pub use registry::{FieldKind, FieldRegistry, campos};
pub use remote::{ApiClient, ApiError};
